//! recensio-feeds — RSS aggregation core for the research digest.
//!
//! The modules here carry the design-critical logic of the system:
//! tolerant date parsing, the month-granular range filter, the raw
//! entry → `Paper` normalizer, and the multi-domain aggregator with
//! DOI/title deduplication. Everything network-facing is isolated in
//! `aggregate::fetch_all_feeds`; the rest is pure and unit-tested.

pub mod aggregate;
pub mod dateparse;
pub mod daterange;
pub mod entry;
pub mod normalize;
pub mod sources;

pub use aggregate::{collect_papers, fetch_all_feeds, AggregateOutcome};
pub use daterange::DateRange;
pub use entry::RawEntry;
pub use normalize::{normalize_entry, SkipReason};
