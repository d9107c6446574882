//! The digest pipeline: aggregate → track → summarize → visualize → render.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use recensio_feeds::{fetch_all_feeds, DateRange};
use recensio_llm::{summarize_all, OpenAiBackend};
use recensio_render::{render_charts, render_html, write_pdf};
use recensio_tracker::PaperTracker;
use tracing::{info, warn};

use crate::config::Config;
use crate::RunArgs;

const SAMPLE_MAX_PAPERS: usize = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub enum RunOutcome {
    Completed { pdf: PathBuf },
    /// Nothing in range, or nothing new since the last run.
    NothingToDo,
}

fn build_range(config: &Config, args: &RunArgs) -> anyhow::Result<DateRange> {
    let range = DateRange {
        start_year:  args.start_year.unwrap_or(config.digest.start_year),
        start_month: args.start_month,
        end_year:    args.end_year,
        end_month:   args.end_month,
    };
    if let Err(msg) = range.validate() {
        anyhow::bail!("invalid date range: {msg}");
    }
    Ok(range)
}

fn api_key() -> anyhow::Result<String> {
    for var in ["RECENSIO_OPENAI_API_KEY", "OPENAI_API_KEY"] {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                return Ok(key);
            }
        }
    }
    anyhow::bail!(
        "no OpenAI API key found; set OPENAI_API_KEY (or RECENSIO_OPENAI_API_KEY) \
         before running a digest"
    )
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "intermediate artifact written");
    Ok(())
}

pub async fn run(config: &Config, args: &RunArgs) -> anyhow::Result<RunOutcome> {
    // Everything that can fail from bad input fails here, before any
    // network traffic.
    let range = build_range(config, args)?;
    let key = api_key()?;

    let max_papers = if args.sample {
        SAMPLE_MAX_PAPERS
    } else {
        args.max_papers.unwrap_or(config.digest.max_papers)
    };
    let max_per_feed = args.max_per_feed.unwrap_or(config.digest.max_per_feed);

    let data_dir = Path::new(&config.paths.data_dir);
    let output_dir = Path::new(&config.paths.output_dir);
    let charts_dir = output_dir.join("visualizations");
    std::fs::create_dir_all(data_dir).context("creating data directory")?;
    std::fs::create_dir_all(&charts_dir).context("creating output directory")?;

    info!(
        date_range = %range.describe(),
        max_papers,
        max_per_feed,
        sample = args.sample,
        "starting digest run"
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("recensio/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let feeds = config.feed_sources();
    let outcome = fetch_all_feeds(&client, &feeds, &range, max_per_feed).await;
    write_json(&data_dir.join("raw_papers.json"), &outcome.papers)?;

    if outcome.papers.is_empty() {
        if !outcome.errors.is_empty() {
            warn!(errors = outcome.errors.len(), "all sources empty or failing");
        }
        info!("no papers in the configured date range, nothing to do");
        return Ok(RunOutcome::NothingToDo);
    }

    // The cap is applied while staging so the ledger only records the
    // papers that actually make this digest; the overflow stays
    // unknown and surfaces on a later run.
    let tracker = PaperTracker::new(&config.paths.history);
    let selected = tracker.filter_new(&outcome.papers, Some(max_papers))?;
    if selected.is_empty() {
        info!("no new papers since the last run, nothing to do");
        return Ok(RunOutcome::NothingToDo);
    }

    let backend = OpenAiBackend::new(key, &config.llm.model);
    let digest = summarize_all(&backend, selected).await;
    write_json(&data_dir.join("enhanced_papers.json"), &digest)?;

    let charts = render_charts(&digest, &charts_dir);

    let html = render_html(&digest, &charts)?;
    let html_path = output_dir.join("research_digest.html");
    std::fs::write(&html_path, &html)
        .with_context(|| format!("writing {}", html_path.display()))?;
    info!(path = %html_path.display(), "HTML report written");

    let pdf_path = output_dir.join("research_digest.pdf");
    write_pdf(&html_path, &pdf_path)?;

    info!(
        papers = digest.metadata.paper_count,
        pdf = %pdf_path.display(),
        "digest complete"
    );
    Ok(RunOutcome::Completed { pdf: pdf_path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            max_papers: None,
            max_per_feed: None,
            start_year: None,
            start_month: None,
            end_year: None,
            end_month: None,
            sample: false,
        }
    }

    #[test]
    fn test_range_defaults_come_from_config() {
        let config = Config::default();
        let range = build_range(&config, &args()).unwrap();
        assert_eq!(range.start_year, 2022);
        assert_eq!(range.start_month, None);
    }

    #[test]
    fn test_cli_range_overrides_config() {
        let config = Config::default();
        let mut a = args();
        a.start_year = Some(2024);
        a.start_month = Some(10);
        let range = build_range(&config, &a).unwrap();
        assert_eq!(range.start_year, 2024);
        assert_eq!(range.start_month, Some(10));
    }

    #[test]
    fn test_invalid_range_rejected_before_running() {
        let config = Config::default();
        let mut a = args();
        a.start_month = Some(13);
        assert!(build_range(&config, &a).is_err());

        let mut b = args();
        b.end_month = Some(5);
        let err = build_range(&config, &b).unwrap_err();
        assert!(err.to_string().contains("end month"));
    }
}
