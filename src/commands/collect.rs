use super::{GlobalArgs, Host};
use crate::Result;
use crate::collect::{RetryPolicy, SchedulerSettings, SearchClient, WindowScheduler, load_token, plan_windows};
use crate::config::Config;
use crate::dataset::{DatasetPaths, DatasetWriter, RAW_DATASET};
use camino::Utf8PathBuf;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::io::Write;

const LOG_TARGET: &str = "     collect";

#[derive(Parser, Debug, Clone, Default)]
pub struct CollectArgs {
    /// Number of unique repositories to collect
    #[arg(long, value_name = "N")]
    pub target_rows: Option<usize>,

    /// First creation date to search (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Last creation date to search (YYYY-MM-DD, default is today)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Directory to write the raw dataset to (default is the configured `data_dir`)
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<Utf8PathBuf>,
}

impl CollectArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(target_rows) = self.target_rows {
            config.target_rows = target_rows;
        }

        if let Some(start_date) = self.start_date {
            config.start_date = start_date;
        }

        if let Some(end_date) = self.end_date {
            config.end_date = Some(end_date);
        }

        if let Some(dir) = &self.output_dir {
            config.data_dir.clone_from(dir);
        }
    }
}

pub async fn collect_repos<H: Host>(host: &mut H, global: &GlobalArgs, args: &CollectArgs) -> Result<()> {
    let mut config = global.setup()?;
    args.apply(&mut config);
    config.validate()?;

    let token = load_token(&config.token_env)?;

    let retry = RetryPolicy {
        max_attempts: config.max_attempts,
        backoff_base: config.backoff_base(),
    };
    let client = SearchClient::new(&token, config.api_base_url.as_str(), retry, config.request_timeout())?;

    let end_date = config.end_date_or(Utc::now().date_naive());
    let windows = plan_windows(&config, end_date);
    log::info!(
        target: LOG_TARGET,
        "Searching {}..{end_date} in {} windows{}",
        config.start_date,
        windows.len(),
        if config.random_sampling { " (random sampling)" } else { "" }
    );

    let progress = global.progress_reporter();
    let collection = WindowScheduler::new(&client, SchedulerSettings::from_config(&config), windows)
        .run(&progress)
        .await?;

    let writer = DatasetWriter::new(DatasetPaths::new(&config.data_dir, RAW_DATASET));
    writer.write(&collection.records)?;

    let stats = &collection.stats;
    let mut out = host.output();
    let _ = writeln!(out, "Collected {} unique repositories (target {})", collection.records.len(), config.target_rows);
    let _ = writeln!(
        out,
        "  Windows: {} scheduled, {} processed, {} split",
        stats.windows_scheduled, stats.windows_processed, stats.windows_split
    );
    let _ = writeln!(
        out,
        "  Requests: {} probes, {} pages; {} duplicates skipped",
        stats.probes, stats.pages_fetched, stats.duplicates_skipped
    );
    if stats.exhausted {
        let _ = writeln!(out, "  Search windows ran out before the target was reached");
    }
    let _ = writeln!(out, "Wrote {}", writer.paths().csv);
    let _ = writeln!(out, "Wrote {}", writer.paths().xlsx);

    Ok(())
}
