use super::{DateWindow, Progress, ResultDeduplicator, SearchQuery, SearchSource, month_windows, random_windows};
use crate::Result;
use crate::config::Config;
use crate::dataset::RawRepoRecord;
use chrono::NaiveDate;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use ohno::IntoAppError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const LOG_TARGET: &str = "   scheduler";

/// Page size of the probe that learns a window's total result count
const PROBE_PAGE_SIZE: u32 = 1;

/// The knobs of a collection run
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    pub target_rows: usize,
    pub per_page: u32,
    pub split_threshold: u64,
    pub polite_delay: Duration,
    pub exclude_forks: bool,
    pub include_topics: bool,
}

impl SchedulerSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_rows: config.target_rows,
            per_page: config.per_page,
            split_threshold: config.total_count_split_threshold,
            polite_delay: config.polite_delay(),
            exclude_forks: config.exclude_forks,
            include_topics: config.include_topics,
        }
    }
}

/// Counters describing how a collection run went
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub windows_scheduled: usize,
    pub windows_processed: usize,
    pub windows_split: usize,
    pub probes: usize,
    pub pages_fetched: usize,
    pub duplicates_skipped: usize,
    pub hits_without_id: usize,
    /// The windows ran out before the target was reached
    pub exhausted: bool,
}

/// Unique records gathered by a run, in collection order
#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<RawRepoRecord>,
    pub stats: CollectionStats,
}

#[derive(Debug, Default)]
struct ProgressState {
    collected: AtomicU64,
    window: Mutex<String>,
}

impl ProgressState {
    fn set_window(&self, window: DateWindow) {
        if let Ok(mut label) = self.window.lock() {
            *label = window.to_string();
        }
    }

    fn window_label(&self) -> String {
        self.window.lock().map_or_else(|_| String::new(), |label| label.clone())
    }
}

/// Build the initial window queue for a run ending on `end_date`.
///
/// Walks the range month by month, or, with `random_sampling` on, draws random fixed-width
/// windows from a generator seeded with `random_seed`.
#[must_use]
pub fn plan_windows(config: &Config, end_date: NaiveDate) -> Vec<DateWindow> {
    if end_date < config.start_date {
        log::warn!(target: LOG_TARGET, "Date range {}..{end_date} is empty", config.start_date);
        return Vec::new();
    }

    if config.random_sampling {
        let mut rng = config.random_seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        random_windows(
            config.start_date,
            end_date,
            config.random_sample_size,
            config.random_window_days,
            &mut rng,
        )
    } else {
        month_windows(config.start_date, end_date)
    }
}

/// Collects unique repositories window by window until the target is met.
///
/// Windows are taken from the front of a queue. Each one is probed first; a window
/// reporting more results than the split threshold is bisected and both halves go back on
/// the front of the queue, so it is fully resolved before any later window is touched.
/// Other windows are paged through until an empty page comes back.
#[derive(Debug)]
pub struct WindowScheduler<'a, S> {
    source: &'a S,
    settings: SchedulerSettings,
    dedup: ResultDeduplicator,
    queue: VecDeque<DateWindow>,
}

impl<'a, S: SearchSource> WindowScheduler<'a, S> {
    #[must_use]
    pub fn new(source: &'a S, settings: SchedulerSettings, windows: impl IntoIterator<Item = DateWindow>) -> Self {
        let dedup = ResultDeduplicator::new(settings.include_topics);
        Self {
            source,
            settings,
            dedup,
            queue: windows.into_iter().collect(),
        }
    }

    /// Windows still waiting to be processed, front first
    #[must_use]
    pub fn pending(&self) -> Vec<DateWindow> {
        self.queue.iter().copied().collect()
    }

    /// Run to completion, returning at most `target_rows` unique records
    pub async fn run(mut self, progress: &dyn Progress) -> Result<Collection> {
        let target = self.settings.target_rows;
        let mut records = Vec::new();
        let mut stats = CollectionStats {
            windows_scheduled: self.queue.len(),
            ..CollectionStats::default()
        };

        let state = Arc::new(ProgressState::default());
        progress.set_phase("Collecting");
        {
            let state = Arc::clone(&state);
            let total = target as u64;
            progress.set_determinate(Box::new(move || {
                let collected = state.collected.load(Ordering::Relaxed);
                (total, collected, format!("{collected}/{total} repositories, window {}", state.window_label()))
            }));
        }

        log::info!(target: LOG_TARGET, "Starting collection target={target}, windows={}", self.queue.len());

        while records.len() < target
            && let Some(window) = self.queue.pop_front()
        {
            stats.windows_processed += 1;
            state.set_window(window);

            let query = SearchQuery::new(window, self.settings.exclude_forks);
            let probe = self
                .source
                .search(&query, 1, PROBE_PAGE_SIZE)
                .await
                .into_app_err_with(|| format!("probing window {window}"))?;
            stats.probes += 1;

            if probe.total_count > self.settings.split_threshold
                && let Some((first, second)) = window.split()
            {
                log::info!(
                    target: LOG_TARGET,
                    "Window {window} reports {} results, splitting into {first} and {second}",
                    probe.total_count
                );
                self.queue.push_front(second);
                self.queue.push_front(first);
                stats.windows_split += 1;
                continue;
            }

            log::info!(target: LOG_TARGET, "Paging window {window} ({} results)", probe.total_count);
            self.page_window(&query, &mut records, &mut stats, &state).await?;
        }

        if records.len() < target {
            stats.exhausted = true;
            log::warn!(
                target: LOG_TARGET,
                "Ran out of windows after collecting {} of {target} repositories",
                records.len()
            );
        }

        progress.done();
        log::info!(target: LOG_TARGET, "Collected {} unique repositories", records.len());

        Ok(Collection { records, stats })
    }

    async fn page_window(
        &mut self,
        query: &SearchQuery,
        records: &mut Vec<RawRepoRecord>,
        stats: &mut CollectionStats,
        state: &ProgressState,
    ) -> Result<()> {
        let target = self.settings.target_rows;
        let mut page = 1;

        loop {
            let results = self
                .source
                .search(query, page, self.settings.per_page)
                .await
                .into_app_err_with(|| format!("fetching page {page} of window {}", query.window()))?;
            stats.pages_fetched += 1;

            if results.items.is_empty() {
                return Ok(());
            }

            for hit in &results.items {
                let Some(record) = self.dedup.normalize(hit) else {
                    log::debug!(target: LOG_TARGET, "Skipping search hit without an id");
                    stats.hits_without_id += 1;
                    continue;
                };

                if !self.dedup.admit(hit) {
                    stats.duplicates_skipped += 1;
                    continue;
                }

                records.push(record);
                let _ = state.collected.fetch_add(1, Ordering::Relaxed);

                if records.len() >= target {
                    return Ok(());
                }
            }

            page += 1;
            tokio::time::sleep(self.settings.polite_delay).await;
        }
    }
}
