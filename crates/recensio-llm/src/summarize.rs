//! Digest summarization: per-paper analysis plus cross-paper synthesis.

use recensio_common::Paper;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::analysis::{DigestMetadata, EnhancedPaper, PaperAnalysis, Synthesis};
use crate::backend::{LlmBackend, LlmRequest, Message};

const ANALYST_SYSTEM_PROMPT: &str = "You are an expert academic researcher creating \
    professor-level research summaries. Provide detailed, critical analysis with \
    specific methodological and statistical details.";

const SYNTHESIS_SYSTEM_PROMPT: &str = "You are an expert at synthesizing academic \
    research and identifying trends and gaps.";

/// The fully enriched digest handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestDocument {
    pub papers:    Vec<EnhancedPaper>,
    pub synthesis: Synthesis,
    pub metadata:  DigestMetadata,
}

fn analysis_prompt(paper: &Paper) -> String {
    format!(
        "Analyze this paper for a professor-level research digest.\n\n\
         Paper Title: {title}\n\
         Authors: {authors}\n\
         Abstract: {abstract_text}\n\
         DOI: {doi}\n\
         Venue: {venue}\n\
         Year: {year}\n\n\
         Cover: the research question (and why it matters), motivation and context, \
         genuine contributions, methodology details (design, sample size as N=?, \
         materials, analysis approach), key findings with quantitative results where \
         available, strengths, limitations, theoretical contribution, practical \
         applications, future research directions, and connections to related work. \
         Be specific; write at peer-review level; acknowledge when the abstract does \
         not contain the information.\n\n\
         Return valid JSON with exactly these keys:\n\
         {{\"research_question\": \"\", \"motivation\": \"\", \"significance\": [], \
         \"methodology\": {{\"design\": \"\", \"sample_size\": \"\", \"materials\": \"\", \
         \"analysis\": \"\"}}, \"findings\": [{{\"text\": \"\", \"statistic\": \"\"}}], \
         \"strengths\": [], \"limitations\": [], \"theoretical_contribution\": \"\", \
         \"applications\": [], \"future_work\": [], \"connections\": \"\"}}",
        title = paper.title,
        authors = paper.authors,
        abstract_text = paper.abstract_text,
        doi = paper.doi,
        venue = paper.venue,
        year = paper.year,
    )
}

fn synthesis_prompt(papers: &[EnhancedPaper]) -> String {
    let titles: Vec<String> = papers.iter().map(|p| format!("- {}", p.paper.title)).collect();
    format!(
        "You are creating an executive summary for a research digest containing \
         these {count} papers:\n\n{titles}\n\n\
         Synthesize: an overview of the key themes, common threads across \
         methodological approaches and research domains, methodological trends, \
         findings that converge across papers, contradictions, and open research \
         gaps worth following up.\n\n\
         Return valid JSON with exactly these keys:\n\
         {{\"executive_summary\": \"\", \"key_themes\": [], \"methodology_trends\": \"\", \
         \"convergence\": \"\", \"contradictions\": \"\", \"research_gaps\": []}}",
        count = papers.len(),
        titles = titles.join("\n"),
    )
}

async fn analyze_paper(backend: &dyn LlmBackend, paper: &Paper) -> PaperAnalysis {
    let req = LlmRequest::json(
        vec![
            Message::system(ANALYST_SYSTEM_PROMPT),
            Message::user(analysis_prompt(paper)),
        ],
        0.3,
    );
    match backend.complete(req).await {
        Ok(resp) => match serde_json::from_str(&resp.content) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(title = %paper.title, error = %e, "undecodable analysis, using fallback");
                PaperAnalysis::fallback(&paper.title)
            }
        },
        Err(e) => {
            warn!(title = %paper.title, error = %e, "analysis request failed, using fallback");
            PaperAnalysis::fallback(&paper.title)
        }
    }
}

async fn synthesize(backend: &dyn LlmBackend, papers: &[EnhancedPaper]) -> Synthesis {
    let req = LlmRequest::json(
        vec![
            Message::system(SYNTHESIS_SYSTEM_PROMPT),
            Message::user(synthesis_prompt(papers)),
        ],
        0.4,
    );
    match backend.complete(req).await {
        Ok(resp) => match serde_json::from_str(&resp.content) {
            Ok(synthesis) => synthesis,
            Err(e) => {
                warn!(error = %e, "undecodable synthesis, using fallback");
                Synthesis::fallback()
            }
        },
        Err(e) => {
            warn!(error = %e, "synthesis request failed, using fallback");
            Synthesis::fallback()
        }
    }
}

/// Pull a participant count out of an `N=…` sample-size string.
/// "N=120 undergraduates" yields 120; anything without a parseable
/// `N=` digits run yields 0.
pub fn parse_sample_size(sample_size: &str) -> u64 {
    let Some(pos) = sample_size.find("N=") else {
        return 0;
    };
    let digits: String = sample_size[pos + 2..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn year_span(papers: &[Paper]) -> String {
    let min = papers.iter().map(|p| p.year).min().unwrap_or(0);
    let max = papers.iter().map(|p| p.year).max().unwrap_or(0);
    format!("{min} - {max}")
}

/// Enrich every paper with a model analysis, then synthesize across
/// them. Per-paper failures degrade to fallback content; the digest is
/// always produced.
#[instrument(skip(backend, papers))]
pub async fn summarize_all(backend: &dyn LlmBackend, papers: Vec<Paper>) -> DigestDocument {
    info!(n = papers.len(), model = backend.model_id(), "analyzing papers");

    let date_range = year_span(&papers);
    let mut enhanced = Vec::with_capacity(papers.len());
    for (i, paper) in papers.into_iter().enumerate() {
        info!(idx = i + 1, title = %paper.title, "analyzing paper");
        let analysis = analyze_paper(backend, &paper).await;
        enhanced.push(EnhancedPaper { paper, analysis });
    }

    info!("creating cross-paper synthesis");
    let synthesis = synthesize(backend, &enhanced).await;

    let total_participants = enhanced
        .iter()
        .map(|p| parse_sample_size(&p.analysis.methodology.sample_size))
        .sum();

    DigestDocument {
        metadata: DigestMetadata {
            paper_count: enhanced.len(),
            total_participants,
            date_range,
        },
        papers: enhanced,
        synthesis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LlmError, LlmResponse};
    use async_trait::async_trait;

    struct CannedBackend {
        reply: String,
        fail:  bool,
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
            if self.fail {
                return Err(LlmError::ApiError { status: 500, message: "down".to_string() });
            }
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: "canned".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            })
        }

        fn model_id(&self) -> &str {
            "canned"
        }
    }

    fn paper(title: &str, year: i32) -> Paper {
        Paper {
            title: title.to_string(),
            authors: "A. Author".to_string(),
            abstract_text: "An abstract.".to_string(),
            url: String::new(),
            doi: String::new(),
            year,
            month: Some(1),
            published: None,
            venue: "ACM Publication".to_string(),
            citations: 0,
            research_domain: "HCI Research".to_string(),
        }
    }

    #[test]
    fn test_parse_sample_size() {
        assert_eq!(parse_sample_size("N=120"), 120);
        assert_eq!(parse_sample_size("N=42 undergraduates"), 42);
        assert_eq!(parse_sample_size("approx. N=30 per group"), 30);
        assert_eq!(parse_sample_size("Not specified"), 0);
        assert_eq!(parse_sample_size("N=unknown"), 0);
        assert_eq!(parse_sample_size(""), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_yields_fallback_digest() {
        let backend = CannedBackend { reply: String::new(), fail: true };
        let digest = summarize_all(&backend, vec![paper("P1", 2023), paper("P2", 2024)]).await;

        assert_eq!(digest.metadata.paper_count, 2);
        assert_eq!(digest.metadata.total_participants, 0);
        assert_eq!(digest.metadata.date_range, "2023 - 2024");
        assert!(digest.papers[0].analysis.research_question.contains("P1"));
        assert_eq!(digest.synthesis.executive_summary, "Cross-paper synthesis not available.");
    }

    #[tokio::test]
    async fn test_participants_summed_from_analyses() {
        let reply = serde_json::json!({
            "research_question": "Q",
            "methodology": {"sample_size": "N=25 adults"},
            "executive_summary": "S",
        })
        .to_string();
        let backend = CannedBackend { reply, fail: false };
        let digest = summarize_all(&backend, vec![paper("P1", 2024), paper("P2", 2024)]).await;

        assert_eq!(digest.metadata.total_participants, 50);
        assert_eq!(digest.papers[0].analysis.research_question, "Q");
        assert_eq!(digest.synthesis.executive_summary, "S");
    }

    #[tokio::test]
    async fn test_undecodable_content_yields_fallback_analysis() {
        let backend = CannedBackend { reply: "not json".to_string(), fail: false };
        let digest = summarize_all(&backend, vec![paper("Odd One", 2024)]).await;
        assert!(digest.papers[0]
            .analysis
            .research_question
            .contains("Odd One"));
    }
}
