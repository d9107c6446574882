//! Multi-domain feed aggregation.
//!
//! Fetches every configured domain feed independently, normalizes and
//! range-filters the entries, then merges: deduplicate (DOI first,
//! lowercased title as fallback), sort newest-first, and tally
//! per-domain / per-month counts for observability. One failing source
//! never aborts the others.
//!
//! The entries → papers path (`collect_papers`) is pure so the merge,
//! dedup, and ordering rules are testable without a network.

use std::collections::{BTreeMap, HashSet};

use recensio_common::{FeedSource, Paper};
use tracing::{debug, info, instrument, warn};

use crate::daterange::DateRange;
use crate::entry::{parse_feed_entries, RawEntry};
use crate::normalize::{normalize_entry, SkipReason};

/// Result of an aggregation pass, counts included.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// Unique papers, newest first.
    pub papers: Vec<Paper>,
    /// Accepted papers per research domain.
    pub domain_counts: BTreeMap<String, usize>,
    /// Accepted papers per "YYYY-MM" key (month-resolved records only).
    pub date_counts: BTreeMap<String, usize>,
    /// Records dropped for having no resolvable date at all.
    pub skipped_no_date: usize,
    /// Records dropped by the range filter.
    pub skipped_out_of_range: usize,
    /// Per-source fetch/parse failures (source continued without them).
    pub errors: Vec<String>,
}

/// Normalize, filter, dedup, and sort pre-fetched entry batches.
///
/// `max_per_feed` bounds the accepted (post-filter) count per domain,
/// matching the upstream cap on how many records one domain may
/// contribute to a digest.
pub fn collect_papers(
    batches: Vec<(String, Vec<RawEntry>)>,
    range: &DateRange,
    max_per_feed: usize,
) -> AggregateOutcome {
    let mut outcome = AggregateOutcome::default();
    let mut merged: Vec<Paper> = Vec::new();

    for (domain, entries) in batches {
        let mut accepted = 0usize;

        for entry in &entries {
            if accepted >= max_per_feed {
                break;
            }
            match normalize_entry(entry, &domain, range) {
                Ok(paper) => {
                    debug!(domain = %domain, title = %paper.title, year = paper.year, "paper accepted");
                    if let Some(month) = paper.month {
                        *outcome
                            .date_counts
                            .entry(format!("{}-{month:02}", paper.year))
                            .or_insert(0) += 1;
                    }
                    merged.push(paper);
                    accepted += 1;
                }
                Err(SkipReason::NoResolvableDate) => {
                    warn!(domain = %domain, title = ?entry.title, "no date found, record excluded");
                    outcome.skipped_no_date += 1;
                }
                Err(SkipReason::OutOfRange) => {
                    debug!(domain = %domain, title = ?entry.title, "outside date range");
                    outcome.skipped_out_of_range += 1;
                }
            }
        }

        info!(domain = %domain, n = accepted, "domain processed");
        outcome.domain_counts.insert(domain, accepted);
    }

    let before = merged.len();
    let mut unique = dedup_papers(merged);
    info!(before, after = unique.len(), "deduplication complete");

    // Newest first; malformed ordinals (zero) sink to the bottom.
    unique.sort_by(|a, b| b.recency_ordinal().cmp(&a.recency_ordinal()));
    outcome.papers = unique;
    outcome
}

/// First occurrence wins: by DOI when present, else by
/// lowercased-trimmed title. Entries with an empty DOI and an empty
/// title are kept (nothing to key on).
fn dedup_papers(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen_dois: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for paper in papers {
        if !paper.doi.is_empty() {
            if seen_dois.insert(paper.doi.clone()) {
                unique.push(paper);
            } else {
                debug!(doi = %paper.doi, "duplicate DOI dropped");
            }
            continue;
        }
        let title_key = paper.title.trim().to_lowercase();
        if title_key.is_empty() || seen_titles.insert(title_key) {
            unique.push(paper);
        } else {
            debug!(title = %paper.title, "duplicate title dropped");
        }
    }
    unique
}

/// Fetch all domain feeds and aggregate them.
///
/// Each source is fetched and parsed independently; a failure is
/// recorded in `outcome.errors` and that source contributes zero
/// records.
#[instrument(skip(client, feeds, range))]
pub async fn fetch_all_feeds(
    client: &reqwest::Client,
    feeds: &[FeedSource],
    range: &DateRange,
    max_per_feed: usize,
) -> AggregateOutcome {
    info!(
        domains = feeds.len(),
        date_range = %range.describe(),
        "fetching research domain feeds"
    );

    let mut batches: Vec<(String, Vec<RawEntry>)> = Vec::new();
    let mut errors = Vec::new();

    for (idx, feed) in feeds.iter().enumerate() {
        info!(domain = %feed.name, "[{}/{}] fetching", idx + 1, feeds.len());
        match fetch_one_feed(client, feed).await {
            Ok(entries) => {
                debug!(domain = %feed.name, n = entries.len(), "feed entries parsed");
                batches.push((feed.name.clone(), entries));
            }
            Err(e) => {
                let msg = format!("could not fetch {}: {e}", feed.name);
                warn!("{msg}");
                errors.push(msg);
                batches.push((feed.name.clone(), Vec::new()));
            }
        }
    }

    let mut outcome = collect_papers(batches, range, max_per_feed);
    outcome.errors = errors;

    info!(
        unique = outcome.papers.len(),
        no_date = outcome.skipped_no_date,
        out_of_range = outcome.skipped_out_of_range,
        source_errors = outcome.errors.len(),
        "aggregation complete"
    );
    outcome
}

async fn fetch_one_feed(
    client: &reqwest::Client,
    feed: &FeedSource,
) -> anyhow::Result<Vec<RawEntry>> {
    let resp = client.get(&feed.url).send().await?;
    if !resp.status().is_success() {
        anyhow::bail!("HTTP {}", resp.status());
    }
    let body = resp.text().await?;
    Ok(parse_feed_entries(&body)?)
}
