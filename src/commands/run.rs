//! Command dispatch logic for repo-census

use super::{BalanceArgs, CollectArgs, GlobalArgs, InitArgs, balance_dataset, check_rate_limit, collect_repos, init_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-census", version, author, long_about = None)]
#[command(about = "Sample GitHub repository metadata and balance it by star count")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: CensusSubcommand,
}

#[derive(Subcommand, Debug)]
enum CensusSubcommand {
    /// Collect repository metadata from the search API into the raw dataset
    Collect(CollectArgs),
    /// Draw a star-stratified sample from the raw dataset
    Balance(BalanceArgs),
    /// Report the remaining API quota of the configured token
    RateLimit,
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        CensusSubcommand::Collect(collect_args) => collect_repos(host, &cli.global, collect_args).await,
        CensusSubcommand::Balance(balance_args) => balance_dataset(host, &cli.global, balance_args),
        CensusSubcommand::RateLimit => check_rate_limit(host, &cli.global).await,
        CensusSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
