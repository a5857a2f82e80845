use super::{GlobalArgs, Host};
use crate::Result;
use crate::balance::{StarBins, StratifiedSampler};
use crate::config::Config;
use crate::dataset::{BALANCED_DATASET, DatasetLoader, DatasetPaths, DatasetWriter, RAW_DATASET};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug, Clone, Default)]
pub struct BalanceArgs {
    /// Raw dataset CSV to sample from (default is the raw dataset in `data_dir`)
    #[arg(long, value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Directory to write the balanced dataset to (default is the configured `data_dir`)
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Number of rows in the balanced dataset
    #[arg(long, value_name = "N")]
    pub target_rows: Option<usize>,
}

impl BalanceArgs {
    fn input_path(&self, config: &Config) -> Utf8PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| DatasetPaths::new(&config.data_dir, RAW_DATASET).csv)
    }

    fn output_paths(&self, config: &Config) -> DatasetPaths {
        let dir = self.output_dir.as_ref().unwrap_or(&config.data_dir);
        DatasetPaths::new(dir, BALANCED_DATASET)
    }
}

pub fn balance_dataset<H: Host>(host: &mut H, global: &GlobalArgs, args: &BalanceArgs) -> Result<()> {
    let mut config = global.setup()?;
    if let Some(target_rows) = args.target_rows {
        config.target_rows = target_rows;
    }
    config.validate()?;

    let input = args.input_path(&config);
    let records = DatasetLoader::load(&input)?;

    let bins = StarBins::new(&config.star_bins)?;
    let sampler = StratifiedSampler::new(bins, config.target_rows, config.sample_seed, config.top_up_seed);
    let sample = sampler.sample(&records);

    let writer = DatasetWriter::new(args.output_paths(&config));
    writer.write(&sample.rows)?;

    let mut out = host.output();
    let _ = writeln!(out, "Read {} records from {input}", records.len());
    let _ = writeln!(out, "Per-bin quota: {}", sample.quota);
    for bin in &sample.bins {
        let _ = writeln!(out, "  {:>12}: {} of {}", bin.label, bin.sampled, bin.population);
    }
    let _ = writeln!(out, "Top-up: {}", sample.top_up);
    if sample.shortfall > 0 {
        let _ = writeln!(out, "Short of the target by {} rows", sample.shortfall);
    }
    let _ = writeln!(out, "Wrote {} rows to {}", sample.rows.len(), writer.paths().csv);
    let _ = writeln!(out, "Wrote {}", writer.paths().xlsx);

    Ok(())
}
