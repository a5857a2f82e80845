//! Tabular datasets shared by the collector and the balancer
//!
//! Datasets are written whole at the end of a pipeline run, once as CSV and once as an
//! Excel workbook with the same columns. The CSV file is the one read back by the balancer.

mod csv;
mod excel;
mod record;

pub use record::{BalancedRecord, Cell, DatasetRow, RawRepoRecord};

use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::IntoAppError;
use std::fs;
use std::io::BufReader;

const LOG_TARGET: &str = "     dataset";

/// Base file name of the collector output
pub const RAW_DATASET: &str = "github_repos_raw";

/// Base file name of the balancer output
pub const BALANCED_DATASET: &str = "github_repos_balanced";

/// Location of one dataset on disk, in both of its formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub csv: Utf8PathBuf,
    pub xlsx: Utf8PathBuf,
}

impl DatasetPaths {
    #[must_use]
    pub fn new(dir: &Utf8Path, base_name: &str) -> Self {
        Self {
            csv: dir.join(format!("{base_name}.csv")),
            xlsx: dir.join(format!("{base_name}.xlsx")),
        }
    }
}

/// Writes a complete dataset to its CSV and Excel files.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    paths: DatasetPaths,
}

impl DatasetWriter {
    #[must_use]
    pub const fn new(paths: DatasetPaths) -> Self {
        Self { paths }
    }

    #[must_use]
    pub const fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    /// Write all rows, creating the parent directory if needed
    pub fn write<R: DatasetRow>(&self, rows: &[R]) -> Result<()> {
        for path in [&self.paths.csv, &self.paths.xlsx] {
            if let Some(parent) = path.parent()
                && !parent.as_str().is_empty()
            {
                fs::create_dir_all(parent).into_app_err_with(|| format!("creating dataset directory '{parent}'"))?;
            }
        }

        let file = fs::File::create(&self.paths.csv).into_app_err_with(|| format!("creating '{}'", self.paths.csv))?;
        csv::generate(rows, file).into_app_err_with(|| format!("writing '{}'", self.paths.csv))?;
        log::info!(target: LOG_TARGET, "Wrote {} rows to '{}'", rows.len(), self.paths.csv);

        let mut file = fs::File::create(&self.paths.xlsx).into_app_err_with(|| format!("creating '{}'", self.paths.xlsx))?;
        excel::generate(rows, &mut file).into_app_err_with(|| format!("writing '{}'", self.paths.xlsx))?;
        log::info!(target: LOG_TARGET, "Wrote {} rows to '{}'", rows.len(), self.paths.xlsx);

        Ok(())
    }
}

/// Reads a dataset previously written by [`DatasetWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load(path: &Utf8Path) -> Result<Vec<RawRepoRecord>> {
        let file = fs::File::open(path).into_app_err_with(|| format!("opening dataset '{path}'"))?;
        let records = csv::parse(BufReader::new(file)).into_app_err_with(|| format!("reading dataset '{path}'"))?;
        log::info!(target: LOG_TARGET, "Loaded {} rows from '{path}'", records.len());
        Ok(records)
    }
}
