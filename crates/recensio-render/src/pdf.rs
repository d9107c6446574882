//! PDF generation through the wkhtmltopdf binary.

use std::path::Path;
use std::process::Command;

use recensio_common::{RecensioError, Result};
use tracing::info;

const WKHTMLTOPDF: &str = "wkhtmltopdf";

/// Convert the rendered HTML file to a PDF.
///
/// Requires `wkhtmltopdf` on PATH; chart images are loaded from local
/// file:// URIs, so local file access is enabled. The HTML input is
/// left in place as a debugging artifact either way.
pub fn write_pdf(html_path: &Path, pdf_path: &Path) -> Result<()> {
    let output = Command::new(WKHTMLTOPDF)
        .arg("--page-size")
        .arg("A4")
        .arg("--margin-top")
        .arg("20mm")
        .arg("--margin-right")
        .arg("20mm")
        .arg("--margin-bottom")
        .arg("20mm")
        .arg("--margin-left")
        .arg("20mm")
        .arg("--encoding")
        .arg("utf-8")
        .arg("--enable-local-file-access")
        .arg("--print-media-type")
        .arg("--quiet")
        .arg(html_path)
        .arg(pdf_path)
        .output();

    let output = match output {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecensioError::Render(format!(
                "{WKHTMLTOPDF} not found on PATH; install it (https://wkhtmltopdf.org) \
                 or inspect the HTML report at {}",
                html_path.display()
            )));
        }
        Err(e) => {
            return Err(RecensioError::Render(format!(
                "could not launch {WKHTMLTOPDF}: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RecensioError::Render(format!(
            "{WKHTMLTOPDF} failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    info!(pdf = %pdf_path.display(), "PDF written");
    Ok(())
}
