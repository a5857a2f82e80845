//! Command-line interface and orchestration for repo-census
//!
//! This module implements the CLI commands and wires the collection, balancing and
//! dataset modules together. It handles argument parsing, configuration loading, logging
//! setup, and the high-level workflows.
//!
//! # Commands
//!
//! - **collect**: walk creation-date windows of the search API and write the raw dataset
//! - **balance**: draw a star-stratified sample from the raw dataset and write it out
//! - **rate-limit**: authenticate and report the remaining API quota
//! - **init**: generate a default configuration file
//!
//! Every command loads the configuration once, from `census.toml` or the file named by
//! `--config`, applies its command-line overrides, and validates the result before doing
//! any work.

mod balance;
mod collect;
mod common;
mod host;
mod init;
mod progress_reporter;
mod rate_limit;
mod run;

pub use balance::{BalanceArgs, balance_dataset};
pub use collect::{CollectArgs, collect_repos};
pub use common::{ColorMode, GlobalArgs, LogLevel};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use rate_limit::check_rate_limit;
pub use run::run;
