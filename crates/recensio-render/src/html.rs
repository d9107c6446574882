//! HTML report rendering via minijinja.

use std::path::Path;

use chrono::Local;
use minijinja::Environment;
use recensio_common::{RecensioError, Result};
use recensio_llm::{DigestDocument, EnhancedPaper, Synthesis};
use serde::Serialize;
use tracing::info;

use crate::charts::ChartSet;
use crate::stats::{digest_statistics, DigestStatistics};
use crate::artifact_id;

const DIGEST_TEMPLATE: &str = include_str!("../templates/digest.html");

const REPORT_TITLE: &str = "Research Digest";

#[derive(Serialize)]
struct PaperView<'a> {
    index: usize,
    #[serde(flatten)]
    paper: &'a EnhancedPaper,
    methodology_diagram:   String,
    results_visualization: String,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    title:              &'a str,
    date:               String,
    paper_count:        usize,
    date_range:         &'a str,
    papers:             Vec<PaperView<'a>>,
    synthesis:          &'a Synthesis,
    stats:              DigestStatistics,
    domain_chart:       String,
    timeline_chart:     String,
}

/// Absolute file:// URI, the form wkhtmltopdf accepts for local
/// resources. Empty when the artifact is missing.
fn file_uri(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Render the digest into a standalone HTML document.
pub fn render_html(digest: &DigestDocument, charts: &ChartSet) -> Result<String> {
    let papers: Vec<PaperView> = digest
        .papers
        .iter()
        .enumerate()
        .map(|(i, paper)| {
            let id = artifact_id(i + 1, &paper.paper.doi);
            let paper_charts = charts.per_paper.get(&id);
            PaperView {
                index: i + 1,
                paper,
                methodology_diagram: file_uri(
                    paper_charts.and_then(|c| c.methodology.as_deref()),
                ),
                results_visualization: file_uri(
                    paper_charts.and_then(|c| c.results.as_deref()),
                ),
            }
        })
        .collect();

    let data = TemplateData {
        title: REPORT_TITLE,
        date: Local::now().format("%B %d, %Y").to_string(),
        paper_count: digest.metadata.paper_count,
        date_range: &digest.metadata.date_range,
        papers,
        synthesis: &digest.synthesis,
        stats: digest_statistics(&digest.papers),
        domain_chart: file_uri(charts.domain_distribution.as_deref()),
        timeline_chart: file_uri(charts.timeline.as_deref()),
    };

    let mut env = Environment::new();
    env.add_template("digest.html", DIGEST_TEMPLATE)
        .map_err(|e| RecensioError::Render(format!("template error: {e}")))?;
    let html = env
        .get_template("digest.html")
        .map_err(|e| RecensioError::Render(format!("template error: {e}")))?
        .render(&data)
        .map_err(|e| RecensioError::Render(format!("render error: {e}")))?;

    info!(papers = digest.papers.len(), bytes = html.len(), "HTML report rendered");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recensio_common::Paper;
    use recensio_llm::{DigestMetadata, PaperAnalysis};

    fn digest() -> DigestDocument {
        let paper = Paper {
            title: "Adaptive Difficulty in VR Games".to_string(),
            authors: "A. One, B. Two".to_string(),
            abstract_text: "We study adaptation.".to_string(),
            url: "https://dl.acm.org/doi/10.1145/99".to_string(),
            doi: "10.1145/99".to_string(),
            year: 2024,
            month: Some(7),
            published: None,
            venue: "CHI PLAY".to_string(),
            citations: 0,
            research_domain: "Virtual Reality".to_string(),
        };
        let mut synthesis = Synthesis::default();
        synthesis.executive_summary = "A busy month for VR research.".to_string();
        synthesis.key_themes = vec!["Adaptation".to_string(), "Presence".to_string()];
        DigestDocument {
            metadata: DigestMetadata {
                paper_count: 1,
                total_participants: 48,
                date_range: "2024 - 2024".to_string(),
            },
            papers: vec![EnhancedPaper {
                analysis: PaperAnalysis::fallback(&paper.title),
                paper,
            }],
            synthesis,
        }
    }

    #[test]
    fn test_html_contains_paper_and_synthesis_content() {
        let html = render_html(&digest(), &ChartSet::default()).unwrap();
        assert!(html.contains("Adaptive Difficulty in VR Games"));
        assert!(html.contains("A busy month for VR research."));
        assert!(html.contains("Adaptation"));
        assert!(html.contains("CHI PLAY"));
        assert!(html.contains("Research Digest"));
    }

    #[test]
    fn test_missing_charts_render_without_img_tags() {
        let html = render_html(&digest(), &ChartSet::default()).unwrap();
        // No artifact paths means no image elements.
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_present_charts_become_file_uris() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("1_10_1145_99_methodology.svg");
        std::fs::write(&svg, "<svg/>").unwrap();

        let mut charts = ChartSet::default();
        charts.per_paper.insert(
            "1_10_1145_99".to_string(),
            crate::charts::PaperCharts {
                methodology: Some(svg),
                results: None,
            },
        );
        let html = render_html(&digest(), &charts).unwrap();
        assert!(html.contains("file://"));
        assert!(html.contains("_methodology.svg"));
    }
}
