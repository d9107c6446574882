//! recensio-render — digest artifacts: charts, HTML, and PDF.
//!
//! Chart emission is best-effort (a failed artifact is logged and left
//! out of the report); the HTML file is always written so layout can be
//! debugged even when the PDF step fails; PDF generation requires
//! wkhtmltopdf on PATH and fails the step with guidance when absent.

pub mod charts;
pub mod html;
pub mod pdf;
pub mod stats;

pub use charts::{render_charts, ChartSet, PaperCharts};
pub use html::render_html;
pub use pdf::write_pdf;
pub use stats::{digest_statistics, DigestStatistics};

/// Artifact key for one paper's charts: 1-based index plus the DOI
/// with path-hostile characters flattened. DOI-less papers fall back
/// to a positional id.
pub fn artifact_id(index: usize, doi: &str) -> String {
    if doi.is_empty() {
        return format!("{index}_paper_{index}");
    }
    format!("{index}_{}", doi.replace(['/', '.'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_id_flattens_doi() {
        assert_eq!(artifact_id(3, "10.1145/3549519"), "3_10_1145_3549519");
    }

    #[test]
    fn test_artifact_id_without_doi_is_positional() {
        assert_eq!(artifact_id(2, ""), "2_paper_2");
    }
}
