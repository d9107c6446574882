//! Structured analysis content attached to papers by the summarizer.
//!
//! Every field carries a serde default so a partially filled model
//! response still decodes; the deterministic fallbacks are used when a
//! response cannot be decoded at all.

use recensio_common::Paper;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Methodology {
    #[serde(default)]
    pub design:      String,
    #[serde(default)]
    pub sample_size: String,
    #[serde(default)]
    pub materials:   String,
    #[serde(default)]
    pub analysis:    String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub text:      String,
    /// Reported statistic for the finding, e.g. "p<.001, η²=0.37".
    #[serde(default)]
    pub statistic: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperAnalysis {
    #[serde(default)]
    pub research_question:        String,
    #[serde(default)]
    pub motivation:               String,
    #[serde(default)]
    pub significance:             Vec<String>,
    #[serde(default)]
    pub methodology:              Methodology,
    #[serde(default)]
    pub findings:                 Vec<Finding>,
    #[serde(default)]
    pub strengths:                Vec<String>,
    #[serde(default)]
    pub limitations:              Vec<String>,
    #[serde(default)]
    pub theoretical_contribution: String,
    #[serde(default)]
    pub applications:             Vec<String>,
    #[serde(default)]
    pub future_work:              Vec<String>,
    #[serde(default)]
    pub connections:              String,
}

impl PaperAnalysis {
    /// Placeholder analysis used when the model call fails or returns
    /// undecodable content. Same shape as a real analysis so the
    /// renderer never special-cases it.
    pub fn fallback(title: &str) -> Self {
        let unknown = if title.is_empty() { "Unknown" } else { title };
        Self {
            research_question: format!("Research question not available for: {unknown}"),
            motivation: "Motivation details not available.".to_string(),
            significance: vec!["Significance analysis pending".to_string()],
            methodology: Methodology {
                design:      "Not specified".to_string(),
                sample_size: "Not specified".to_string(),
                materials:   "Not specified".to_string(),
                analysis:    "Not specified".to_string(),
            },
            findings: vec![Finding {
                text:      "Findings not available".to_string(),
                statistic: String::new(),
            }],
            strengths: vec!["Analysis pending".to_string()],
            limitations: vec!["Analysis pending".to_string()],
            theoretical_contribution: "Theoretical contribution analysis pending.".to_string(),
            applications: vec!["Applications analysis pending".to_string()],
            future_work: vec!["Future work analysis pending".to_string()],
            connections: "Connections analysis pending.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Synthesis {
    #[serde(default)]
    pub executive_summary:  String,
    #[serde(default)]
    pub key_themes:         Vec<String>,
    #[serde(default)]
    pub methodology_trends: String,
    #[serde(default)]
    pub convergence:        String,
    #[serde(default)]
    pub contradictions:     String,
    #[serde(default)]
    pub research_gaps:      Vec<String>,
}

impl Synthesis {
    pub fn fallback() -> Self {
        Self {
            executive_summary: "Cross-paper synthesis not available.".to_string(),
            ..Self::default()
        }
    }
}

/// A paper with its analysis merged in, serialized flat so the render
/// template sees one record per paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedPaper {
    #[serde(flatten)]
    pub paper:    Paper,
    #[serde(flatten)]
    pub analysis: PaperAnalysis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestMetadata {
    pub paper_count:        usize,
    /// Sum of the `N=` sample sizes reported across analyses.
    pub total_participants: u64,
    /// "minYear - maxYear" across the batch.
    pub date_range:         String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_analysis_keeps_full_shape() {
        let fb = PaperAnalysis::fallback("Study of Things");
        assert!(fb.research_question.contains("Study of Things"));
        assert_eq!(fb.methodology.design, "Not specified");
        assert_eq!(fb.findings.len(), 1);
        assert!(!fb.strengths.is_empty());
        assert!(!fb.limitations.is_empty());
    }

    #[test]
    fn test_partial_model_response_decodes() {
        let json = r#"{"research_question": "Why?", "findings": [{"text": "It works"}]}"#;
        let analysis: PaperAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.research_question, "Why?");
        assert_eq!(analysis.findings[0].statistic, "");
        assert!(analysis.significance.is_empty());
    }

    #[test]
    fn test_enhanced_paper_serializes_flat() {
        let paper = Paper {
            title: "T".to_string(),
            authors: "A".to_string(),
            abstract_text: "Abs".to_string(),
            url: String::new(),
            doi: "10.1145/1".to_string(),
            year: 2024,
            month: Some(5),
            published: None,
            venue: "V".to_string(),
            citations: 0,
            research_domain: "HCI Research".to_string(),
        };
        let enhanced = EnhancedPaper {
            paper,
            analysis: PaperAnalysis::fallback("T"),
        };
        let value = serde_json::to_value(&enhanced).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["abstract"], "Abs");
        assert!(value["research_question"].is_string());
        assert!(value.get("paper").is_none());
    }
}
