//! Aggregate statistics shown in the report header.

use std::collections::BTreeMap;

use recensio_llm::{summarize::parse_sample_size, EnhancedPaper};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DigestStatistics {
    pub total_participants: u64,
    pub avg_citations:      u32,
    pub year_range:         String,
    pub venue_distribution: BTreeMap<String, usize>,
}

pub fn digest_statistics(papers: &[EnhancedPaper]) -> DigestStatistics {
    let mut stats = DigestStatistics::default();

    for paper in papers {
        stats.total_participants += parse_sample_size(&paper.analysis.methodology.sample_size);
        *stats
            .venue_distribution
            .entry(paper.paper.venue.clone())
            .or_insert(0) += 1;
    }

    let cited: Vec<u32> = papers
        .iter()
        .map(|p| p.paper.citations)
        .filter(|&c| c > 0)
        .collect();
    if !cited.is_empty() {
        stats.avg_citations = cited.iter().sum::<u32>() / cited.len() as u32;
    }

    let years: Vec<i32> = papers.iter().map(|p| p.paper.year).collect();
    if let (Some(min), Some(max)) = (years.iter().min(), years.iter().max()) {
        stats.year_range = format!("{min} - {max}");
    }

    stats
}
