//! Run configuration
//!
//! The configuration is loaded once at startup and passed explicitly to every component.
//! All keys are optional; missing keys fall back to the defaults in `default_config.toml`.

use crate::Result;
use crate::balance::StarBins;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;
use std::io;

const LOG_TARGET: &str = "      config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "census.toml";

/// Largest page size accepted by the search API
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ascending star-count breakpoints for the balancer
    #[serde(default = "default_star_bins")]
    pub star_bins: Vec<u64>,

    /// Number of unique repositories to collect, and to keep after balancing
    #[serde(default = "default_target_rows")]
    pub target_rows: usize,

    /// Page size for paging through a window (1..=100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Delay between successive pages of the same window
    #[serde(default = "default_polite_delay_seconds")]
    pub polite_delay_seconds: f64,

    /// Attempts per search request on rate limits and server errors
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff
    #[serde(default = "default_backoff_base_seconds")]
    pub backoff_base_seconds: f64,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Windows whose total count exceeds this are bisected
    #[serde(default = "default_total_count_split_threshold")]
    pub total_count_split_threshold: u64,

    #[serde(default = "default_true")]
    pub exclude_forks: bool,

    #[serde(default = "default_true")]
    pub include_topics: bool,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Defaults to the current UTC date when absent
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub random_sampling: bool,

    #[serde(default = "default_random_sample_size")]
    pub random_sample_size: usize,

    #[serde(default = "default_random_window_days")]
    pub random_window_days: u32,

    /// Seed for random window selection; entropy-seeded when absent
    #[serde(default)]
    pub random_seed: Option<u64>,

    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,

    #[serde(default = "default_top_up_seed")]
    pub top_up_seed: u64,

    /// Name of the environment variable carrying the API token
    #[serde(default = "default_token_env", alias = "GITHUB_TOKEN_ENV")]
    pub token_env: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory holding the raw and balanced datasets
    #[serde(default = "default_data_dir")]
    pub data_dir: Utf8PathBuf,
}

fn default_star_bins() -> Vec<u64> {
    vec![10, 100, 500, 5000]
}

const fn default_target_rows() -> usize {
    2000
}

const fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

const fn default_polite_delay_seconds() -> f64 {
    0.5
}

const fn default_max_attempts() -> u32 {
    6
}

const fn default_backoff_base_seconds() -> f64 {
    1.0
}

const fn default_request_timeout_seconds() -> u64 {
    30
}

const fn default_total_count_split_threshold() -> u64 {
    900
}

const fn default_true() -> bool {
    true
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

const fn default_random_sample_size() -> usize {
    50
}

const fn default_random_window_days() -> u32 {
    1
}

const fn default_sample_seed() -> u64 {
    42
}

const fn default_top_up_seed() -> u64 {
    1
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_data_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("data")
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `census.toml` in the working directory is used if present.
    /// Paths ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "no '{DEFAULT_CONFIG_FILE}' found, using default configuration");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config = Self::parse(&final_path, &text)?;
        config.validate()?;

        Ok(config)
    }

    fn parse(path: &Utf8Path, text: &str) -> Result<Self> {
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            serde_json::from_str(text).into_app_err_with(|| format!("parsing configuration file '{path}'"))
        } else {
            toml::from_str(text).into_app_err_with(|| format!("parsing configuration file '{path}'"))
        }
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(app_err!("per_page must be between 1 and {MAX_PER_PAGE}, got {}", self.per_page));
        }

        if self.max_attempts == 0 {
            return Err(app_err!("max_attempts must be at least 1"));
        }

        if self.random_window_days == 0 {
            return Err(app_err!("random_window_days must be at least 1"));
        }

        for (name, value) in [
            ("polite_delay_seconds", self.polite_delay_seconds),
            ("backoff_base_seconds", self.backoff_base_seconds),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(app_err!("{name} must be a non-negative, representable number of seconds, got {value}"));
            }
        }

        let _ = StarBins::new(&self.star_bins)?;

        if let Some(end_date) = self.end_date
            && end_date < self.start_date
        {
            return Err(app_err!("start_date ({}) must not be after end_date ({end_date})", self.start_date));
        }

        Ok(())
    }

    /// The configured end date, or `today` when none is configured
    #[must_use]
    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    #[must_use]
    pub fn polite_delay(&self) -> Duration {
        Duration::from_secs_f64(self.polite_delay_seconds)
    }

    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs_f64(self.backoff_base_seconds)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
