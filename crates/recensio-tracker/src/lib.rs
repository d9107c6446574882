//! recensio-tracker — persistent ledger of previously processed papers.
//!
//! The ledger is a JSON object mapping identifier (DOI, or normalized
//! title when the DOI is absent) to the facts recorded when a paper
//! was first accepted. It is loaded once per tracking pass, mutated in
//! memory, and rewritten atomically; a missing or corrupt file is
//! treated as an empty ledger, never as a fatal error. Concurrent runs
//! against the same ledger file are not supported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use recensio_common::{Paper, RecensioError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One persisted ledger row. Never mutated after the first write;
/// only `reset` removes entries, and it removes all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    /// Day the paper was first accepted, YYYY-MM-DD.
    pub processed_date: String,
    pub doi: String,
    pub venue: String,
    pub year: i32,
}

/// Ledger stats for the `stats` CLI surface.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStats {
    pub total_processed: usize,
    pub by_year: BTreeMap<i32, usize>,
}

pub struct PaperTracker {
    path: PathBuf,
}

impl PaperTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop papers already in the ledger and durably record the rest.
    ///
    /// Relative order of the survivors is preserved. With a `limit`,
    /// staging stops once that many new papers are collected; papers
    /// beyond it are neither returned nor recorded, so they stay
    /// unknown and resurface on the next run. The ledger only ever
    /// holds papers that made a digest. The whole ledger is rewritten
    /// atomically after the batch, so a crash mid-run never leaves a
    /// partially committed file.
    pub fn filter_new(&self, papers: &[Paper], limit: Option<usize>) -> Result<Vec<Paper>> {
        let mut history = self.load();
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

        let mut fresh = Vec::new();
        for paper in papers {
            if limit.is_some_and(|max| fresh.len() >= max) {
                break;
            }
            let identifier = paper.identifier();
            if history.contains_key(&identifier) {
                debug!(title = %paper.title, "already processed, skipping");
                continue;
            }
            history.insert(
                identifier,
                HistoryEntry {
                    title: paper.title.clone(),
                    processed_date: today.clone(),
                    doi: paper.doi.clone(),
                    venue: paper.venue.clone(),
                    year: paper.year,
                },
            );
            fresh.push(paper.clone());
        }

        self.persist(&history)?;
        info!(
            input = papers.len(),
            new = fresh.len(),
            ledger = history.len(),
            "history filter complete"
        );
        Ok(fresh)
    }

    /// Ledger size plus a year-wise breakdown.
    pub fn stats(&self) -> TrackerStats {
        let history = self.load();
        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        for entry in history.values() {
            *by_year.entry(entry.year).or_insert(0) += 1;
        }
        TrackerStats {
            total_processed: history.len(),
            by_year,
        }
    }

    /// Destructively clear the ledger. Explicit action only; normal
    /// pipeline runs never call this.
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| RecensioError::Pipeline(format!("could not reset history: {e}")))?;
        }
        info!(path = %self.path.display(), "history ledger reset");
        Ok(())
    }

    /// Missing file or undecodable JSON both mean "empty ledger"; the
    /// run then reprocesses everything rather than crashing.
    fn load(&self) -> BTreeMap<String, HistoryEntry> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ledger unreadable, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, history: &BTreeMap<String, HistoryEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RecensioError::Pipeline(format!("could not create ledger directory: {e}"))
                })?;
            }
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| RecensioError::Pipeline(format!("could not stage ledger write: {e}")))?;
        serde_json::to_writer_pretty(&tmp, history)?;
        tmp.persist(&self.path)
            .map_err(|e| RecensioError::Pipeline(format!("could not persist ledger: {e}")))?;
        Ok(())
    }
}
