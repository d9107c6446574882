//! Self-contained SVG chart artifacts.
//!
//! Two per-paper artifacts (a methodology overview and a findings
//! chart) plus two digest-wide ones (domain distribution, publication
//! timeline). Emission is best-effort: a write failure drops that
//! artifact with a warning and the report renders without it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use recensio_llm::{DigestDocument, EnhancedPaper, Finding};
use tracing::{debug, info, warn};

use crate::artifact_id;

const BAR_FILL: &str = "#667eea";
const BOX_FILLS: [&str; 4] = ["#667eea", "#764ba2", "#f093fb", "#4caf50"];

#[derive(Debug, Clone, Default)]
pub struct PaperCharts {
    pub methodology: Option<PathBuf>,
    pub results:     Option<PathBuf>,
}

/// Chart artifact paths keyed by paper artifact id.
#[derive(Debug, Clone, Default)]
pub struct ChartSet {
    pub per_paper:           BTreeMap<String, PaperCharts>,
    pub domain_distribution: Option<PathBuf>,
    pub timeline:            Option<PathBuf>,
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}…")
}

/// Horizontal bar chart over label/value pairs.
fn bar_chart_svg(title: &str, rows: &[(String, u64)]) -> String {
    let width = 640u32;
    let bar_height = 22u32;
    let gap = 10u32;
    let top = 50u32;
    let label_width = 220u32;
    let height = top + rows.len() as u32 * (bar_height + gap) + 20;
    let max_value = rows.iter().map(|(_, v)| *v).max().unwrap_or(1).max(1);

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" font-family=\"Helvetica, Arial, sans-serif\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n\
         <text x=\"{}\" y=\"28\" text-anchor=\"middle\" font-size=\"16\" \
         font-weight=\"bold\" fill=\"#333\">{}</text>\n",
        width / 2,
        escape_xml(title),
    );

    for (i, (label, value)) in rows.iter().enumerate() {
        let y = top + i as u32 * (bar_height + gap);
        let bar_max = width - label_width - 60;
        let bar = ((*value as f64 / max_value as f64) * bar_max as f64) as u32;
        svg.push_str(&format!(
            "<text x=\"{x}\" y=\"{ty}\" text-anchor=\"end\" font-size=\"11\" \
             fill=\"#333\">{label}</text>\n\
             <rect x=\"{bx}\" y=\"{y}\" width=\"{bar}\" height=\"{bar_height}\" \
             fill=\"{BAR_FILL}\" rx=\"3\"/>\n\
             <text x=\"{vx}\" y=\"{ty}\" font-size=\"11\" fill=\"#333\">{value}</text>\n",
            x = label_width - 8,
            ty = y + bar_height / 2 + 4,
            label = escape_xml(&truncate(label, 32)),
            bx = label_width,
            vx = label_width + bar + 6,
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Block overview of the study methodology.
fn methodology_svg(paper: &EnhancedPaper) -> String {
    let m = &paper.analysis.methodology;
    let boxes = [
        ("Participants", m.sample_size.as_str()),
        ("Design", m.design.as_str()),
        ("Materials", m.materials.as_str()),
        ("Analysis", m.analysis.as_str()),
    ];

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"640\" height=\"220\" \
         viewBox=\"0 0 640 220\" font-family=\"Helvetica, Arial, sans-serif\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n\
         <text x=\"320\" y=\"28\" text-anchor=\"middle\" font-size=\"15\" \
         font-weight=\"bold\" fill=\"#333\">Methodological Framework: {}</text>\n",
        escape_xml(&truncate(&paper.paper.title, 60)),
    );

    for (i, (heading, body)) in boxes.iter().enumerate() {
        let x = 20 + i as u32 * 152;
        svg.push_str(&format!(
            "<rect x=\"{x}\" y=\"60\" width=\"140\" height=\"110\" rx=\"8\" \
             fill=\"{fill}\" fill-opacity=\"0.25\" stroke=\"{fill}\" stroke-width=\"2\"/>\n\
             <text x=\"{cx}\" y=\"86\" text-anchor=\"middle\" font-size=\"12\" \
             font-weight=\"bold\" fill=\"#333\">{heading}</text>\n\
             <text x=\"{cx}\" y=\"110\" text-anchor=\"middle\" font-size=\"10\" \
             fill=\"#333\">{body}</text>\n",
            fill = BOX_FILLS[i % BOX_FILLS.len()],
            cx = x + 70,
            heading = escape_xml(heading),
            body = escape_xml(&truncate(body, 24)),
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Significance-level proxy for plotting a finding without a parser
/// for every statistic notation.
fn finding_weight(finding: &Finding) -> u64 {
    let stat = finding.statistic.replace("0.0", ".0");
    if stat.contains("p<.001") {
        95
    } else if stat.contains("p<.01") {
        85
    } else if stat.contains("p<.05") {
        75
    } else if stat.contains("p<") || stat.contains("p=") {
        60
    } else {
        50
    }
}

fn results_svg(paper: &EnhancedPaper) -> String {
    let rows: Vec<(String, u64)> = paper
        .analysis
        .findings
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let label = if f.statistic.is_empty() {
                format!("Finding {}", i + 1)
            } else {
                format!("Finding {} ({})", i + 1, f.statistic)
            };
            (label, finding_weight(f))
        })
        .collect();
    bar_chart_svg("Reported Findings (significance proxy)", &rows)
}

fn write_artifact(path: &Path, svg: &str) -> Option<PathBuf> {
    match std::fs::write(path, svg) {
        Ok(()) => {
            debug!(path = %path.display(), "chart written");
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "chart write failed, artifact skipped");
            None
        }
    }
}

/// Emit every chart artifact for the digest under `out_dir`.
pub fn render_charts(digest: &DigestDocument, out_dir: &Path) -> ChartSet {
    let mut set = ChartSet::default();

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        warn!(dir = %out_dir.display(), error = %e, "cannot create chart directory, skipping charts");
        return set;
    }

    for (i, paper) in digest.papers.iter().enumerate() {
        let id = artifact_id(i + 1, &paper.paper.doi);
        let charts = PaperCharts {
            methodology: write_artifact(
                &out_dir.join(format!("{id}_methodology.svg")),
                &methodology_svg(paper),
            ),
            results: write_artifact(
                &out_dir.join(format!("{id}_results.svg")),
                &results_svg(paper),
            ),
        };
        set.per_paper.insert(id, charts);
    }

    let mut domains: BTreeMap<String, u64> = BTreeMap::new();
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for paper in &digest.papers {
        *domains.entry(paper.paper.research_domain.clone()).or_insert(0) += 1;
        let key = match paper.paper.month {
            Some(m) => format!("{}-{m:02}", paper.paper.year),
            None => paper.paper.year.to_string(),
        };
        *months.entry(key).or_insert(0) += 1;
    }

    let domain_rows: Vec<(String, u64)> = domains.into_iter().collect();
    set.domain_distribution = write_artifact(
        &out_dir.join("domain_distribution.svg"),
        &bar_chart_svg("Papers per Research Domain", &domain_rows),
    );

    let month_rows: Vec<(String, u64)> = months.into_iter().collect();
    set.timeline = write_artifact(
        &out_dir.join("timeline.svg"),
        &bar_chart_svg("Publication Timeline", &month_rows),
    );

    info!(
        papers = set.per_paper.len(),
        dir = %out_dir.display(),
        "chart artifacts emitted"
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use recensio_common::Paper;
    use recensio_llm::{DigestMetadata, PaperAnalysis, Synthesis};

    fn digest_with(papers: Vec<EnhancedPaper>) -> DigestDocument {
        DigestDocument {
            metadata: DigestMetadata {
                paper_count: papers.len(),
                total_participants: 0,
                date_range: "2024 - 2024".to_string(),
            },
            papers,
            synthesis: Synthesis::default(),
        }
    }

    fn enhanced(doi: &str, domain: &str) -> EnhancedPaper {
        EnhancedPaper {
            paper: Paper {
                title: "A <Tricky> Title & Co.".to_string(),
                authors: String::new(),
                abstract_text: String::new(),
                url: String::new(),
                doi: doi.to_string(),
                year: 2024,
                month: Some(6),
                published: None,
                venue: "CHI".to_string(),
                citations: 0,
                research_domain: domain.to_string(),
            },
            analysis: PaperAnalysis::fallback("A <Tricky> Title & Co."),
        }
    }

    #[test]
    fn test_charts_written_and_keyed_by_artifact_id() {
        let dir = tempfile::tempdir().unwrap();
        let digest = digest_with(vec![
            enhanced("10.1145/1", "Virtual Reality"),
            enhanced("", "Virtual Reality"),
        ]);

        let set = render_charts(&digest, dir.path());
        assert_eq!(set.per_paper.len(), 2);
        let first = &set.per_paper["1_10_1145_1"];
        assert!(first.methodology.as_ref().unwrap().exists());
        assert!(first.results.as_ref().unwrap().exists());
        assert!(set.per_paper.contains_key("2_paper_2"));
        assert!(set.domain_distribution.unwrap().exists());
        assert!(set.timeline.unwrap().exists());
    }

    #[test]
    fn test_svg_escapes_markup_in_titles() {
        let svg = methodology_svg(&enhanced("10.1145/1", "HCI Research"));
        assert!(!svg.contains("<Tricky>"));
        assert!(svg.contains("&lt;Tricky&gt;"));
    }

    #[test]
    fn test_finding_weight_significance_ladder() {
        let f = |s: &str| Finding { text: String::new(), statistic: s.to_string() };
        assert_eq!(finding_weight(&f("p<.001, η²=0.37")), 95);
        assert_eq!(finding_weight(&f("p<0.01")), 85);
        assert_eq!(finding_weight(&f("p<.05")), 75);
        assert_eq!(finding_weight(&f("p=.21")), 60);
        assert_eq!(finding_weight(&f("")), 50);
    }

    #[test]
    fn test_unwritable_directory_yields_empty_set() {
        let digest = digest_with(vec![enhanced("10.1145/1", "HCI Research")]);
        let set = render_charts(&digest, Path::new("/proc/nonexistent/charts"));
        assert!(set.per_paper.is_empty());
        assert!(set.domain_distribution.is_none());
    }
}
