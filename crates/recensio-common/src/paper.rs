//! Canonical paper record produced by feed normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One RSS feed scoped to a research domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// A paper as it flows through the digest pipeline.
///
/// Constructed fresh on every run from upstream feed entries; never
/// persisted as an entity. Only derived facts (identifier, title,
/// venue, year) land in the history ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub authors: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
    /// Empty when the feed entry's link carries no DOI path segment.
    pub doi: String,
    pub year: i32,
    /// 1-12; many records only carry year granularity.
    pub month: Option<u32>,
    pub published: Option<NaiveDate>,
    pub venue: String,
    pub citations: u32,
    pub research_domain: String,
}

impl Paper {
    /// Deduplication / ledger identity: DOI when present, else the
    /// normalized title.
    pub fn identifier(&self) -> String {
        if self.doi.is_empty() {
            self.title.trim().to_lowercase()
        } else {
            self.doi.clone()
        }
    }

    /// Single comparable recency value. Records with a missing month
    /// count as January; a zero year yields ordinal zero so malformed
    /// records sink to the bottom of a descending sort.
    pub fn recency_ordinal(&self) -> i64 {
        if self.year <= 0 {
            return 0;
        }
        self.year as i64 * 12 + self.month.unwrap_or(1) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(doi: &str, title: &str) -> Paper {
        Paper {
            title: title.to_string(),
            authors: String::new(),
            abstract_text: String::new(),
            url: String::new(),
            doi: doi.to_string(),
            year: 2024,
            month: Some(6),
            published: None,
            venue: String::new(),
            citations: 0,
            research_domain: String::new(),
        }
    }

    #[test]
    fn test_identifier_prefers_doi() {
        let p = paper("10.1145/3549519", "Some Title");
        assert_eq!(p.identifier(), "10.1145/3549519");
    }

    #[test]
    fn test_identifier_falls_back_to_normalized_title() {
        let p = paper("", "  Some Title ");
        assert_eq!(p.identifier(), "some title");
    }

    #[test]
    fn test_recency_ordinal_missing_month_counts_as_january() {
        let mut p = paper("", "t");
        p.month = None;
        assert_eq!(p.recency_ordinal(), 2024 * 12 + 1);
    }

    #[test]
    fn test_recency_ordinal_zero_year_sinks() {
        let mut p = paper("", "t");
        p.year = 0;
        p.month = Some(12);
        assert_eq!(p.recency_ordinal(), 0);
    }
}
