//! Raw feed entry → canonical `Paper` normalization.
//!
//! Field names vary across upstream feeds, so extraction runs as
//! ordered strategy lists with first-success-wins semantics: date
//! fields are probed most-precise-first (cover date before the generic
//! published/updated stamps), and author extraction tries the plain
//! author string, then `dc:creator`, then a joined creator list.

use chrono::NaiveDate;
use recensio_common::Paper;
use tracing::debug;

use crate::dateparse::{crude_year_month, parse_flexible};
use crate::daterange::DateRange;
use crate::entry::RawEntry;

const DEFAULT_TITLE: &str = "Unknown Title";
const DEFAULT_ABSTRACT: &str = "No abstract available";
const DEFAULT_AUTHORS: &str = "Authors not listed in RSS feed";
const DEFAULT_VENUE: &str = "ACM Publication";

/// Why a record was dropped instead of becoming a `Paper`. Typed so
/// tests (and the aggregator's counters) can tell the cases apart
/// instead of inferring from log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No date field yielded even a crude year.
    NoResolvableDate,
    /// A date was resolved but falls outside the configured range.
    OutOfRange,
}

/// Date signals resolved from an entry, before range filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDate {
    pub published: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Which field produced the signal, for diagnostics.
    pub source_field: Option<&'static str>,
}

/// Candidate date fields in priority order: publication-specific cover
/// dates first, generic feed timestamps last. The first field that
/// yields either a full parse or a crude year wins; later, cruder
/// fields must not override an earlier precise one.
fn date_candidates(entry: &RawEntry) -> [(&'static str, Option<&String>); 6] {
    [
        ("prism:coverDate", entry.prism_coverdate.as_ref()),
        ("prism:publicationDate", entry.prism_publicationdate.as_ref()),
        ("published", entry.published.as_ref()),
        ("updated", entry.updated.as_ref()),
        ("dc:date", entry.dc_date.as_ref()),
        ("pubDate", entry.pub_date.as_ref()),
    ]
}

/// Probe the entry's date fields in priority order.
pub fn resolve_entry_date(entry: &RawEntry) -> ResolvedDate {
    for (field, value) in date_candidates(entry) {
        let Some(text) = value else { continue };

        if let Some(date) = parse_flexible(text) {
            use chrono::Datelike;
            debug!(field, %date, "date resolved from feed field");
            return ResolvedDate {
                published: Some(date),
                year: Some(date.year()),
                month: Some(date.month()),
                source_field: Some(field),
            };
        }

        let (year, month) = crude_year_month(text);
        if year.is_some() {
            debug!(field, ?year, ?month, "crude year/month extracted from feed field");
            return ResolvedDate {
                published: None,
                year,
                month,
                source_field: Some(field),
            };
        }
    }
    ResolvedDate::default()
}

/// Extract a DOI from the entry link when it embeds a `doi/` path
/// segment; query strings are stripped. Empty when absent.
pub fn extract_doi(link: &str) -> String {
    if !link.contains("doi") {
        return String::new();
    }
    match link.rsplit_once("doi/") {
        Some((_, tail)) => tail.split('?').next().unwrap_or("").to_string(),
        None => String::new(),
    }
}

fn extract_authors(entry: &RawEntry) -> String {
    // Repeated author/creator elements collect into `authors`; when
    // more than one name was listed, the joined list is the real
    // byline and the single-value slots only hold its first entry.
    let listed: Vec<&str> = entry
        .authors
        .iter()
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    if listed.len() > 1 {
        return listed.join(", ");
    }
    if let Some(a) = entry.author.as_deref().filter(|s| !s.is_empty()) {
        return a.to_string();
    }
    if let Some(a) = entry.dc_creator.as_deref().filter(|s| !s.is_empty()) {
        return a.to_string();
    }
    if let Some(a) = listed.first() {
        return a.to_string();
    }
    DEFAULT_AUTHORS.to_string()
}

/// Normalize one entry against the configured range.
///
/// The range filter runs on the resolved date signals before any
/// display defaulting: a record with no resolvable date is skipped
/// here, never given an invented year to pass the filter. Only after
/// acceptance is a still-unknown year defaulted to the range's start
/// year for display.
pub fn normalize_entry(
    entry: &RawEntry,
    domain: &str,
    range: &DateRange,
) -> Result<Paper, SkipReason> {
    let resolved = resolve_entry_date(entry);

    if resolved.published.is_none() && resolved.year.is_none() {
        return Err(SkipReason::NoResolvableDate);
    }
    if !range.contains(resolved.published, resolved.year, resolved.month) {
        return Err(SkipReason::OutOfRange);
    }

    let link = entry.link.clone().unwrap_or_default();

    Ok(Paper {
        title: entry
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        authors: extract_authors(entry),
        abstract_text: entry
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ABSTRACT.to_string()),
        doi: extract_doi(&link),
        url: link,
        // Accepted records keep their resolved year; the start-year
        // default is display-only and unreachable on the filtered path,
        // but callers that skip pre-filtering rely on it.
        year: resolved.year.unwrap_or(range.start_year),
        month: resolved.month,
        published: resolved.published,
        venue: entry
            .prism_publicationname
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VENUE.to_string()),
        citations: 0,
        research_domain: domain.to_string(),
    })
}
