use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

/// One value of a dataset row, typed so spreadsheets keep numbers numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Empty,
    Text(&'a str),
    Owned(String),
    Count(u64),
}

impl Cell<'_> {
    /// Text rendering used for CSV output
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => (*s).to_string(),
            Self::Owned(s) => s.clone(),
            Self::Count(n) => n.to_string(),
        }
    }
}

/// A row type that can be written as one line of a tabular dataset.
pub trait DatasetRow {
    /// Column names, in output order
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per entry of [`Self::COLUMNS`]
    fn cells(&self) -> Vec<Cell<'_>>;
}

/// Normalized projection of one repository search hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRepoRecord {
    pub repo_id: u64,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub size_kb: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub license: Option<String>,
    /// Comma-joined topic names, absent when topic collection is disabled
    pub topics: Option<String>,
}

impl RawRepoRecord {
    /// Star count, with a missing value treated as zero
    #[must_use]
    pub fn stars(&self) -> u64 {
        self.stargazers_count.unwrap_or(0)
    }
}

fn text(value: Option<&str>) -> Cell<'_> {
    value.map_or(Cell::Empty, Cell::Text)
}

fn count(value: Option<u64>) -> Cell<'static> {
    value.map_or(Cell::Empty, Cell::Count)
}

fn timestamp(value: Option<&DateTime<Utc>>) -> Cell<'static> {
    value.map_or(Cell::Empty, |ts| Cell::Owned(ts.to_rfc3339_opts(SecondsFormat::Secs, true)))
}

impl DatasetRow for RawRepoRecord {
    const COLUMNS: &'static [&'static str] = &[
        "repo_id",
        "full_name",
        "name",
        "owner",
        "language",
        "created_at",
        "updated_at",
        "size_kb",
        "stargazers_count",
        "forks_count",
        "open_issues_count",
        "watchers_count",
        "license",
        "topics",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Count(self.repo_id),
            text(self.full_name.as_deref()),
            text(self.name.as_deref()),
            text(self.owner.as_deref()),
            text(self.language.as_deref()),
            timestamp(self.created_at.as_ref()),
            timestamp(self.updated_at.as_ref()),
            count(self.size_kb),
            count(self.stargazers_count),
            count(self.forks_count),
            count(self.open_issues_count),
            count(self.watchers_count),
            text(self.license.as_deref()),
            text(self.topics.as_deref()),
        ]
    }
}

/// A sampled record tagged with the label of its star bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedRecord {
    pub record: RawRepoRecord,
    pub star_bin: String,
}

impl DatasetRow for BalancedRecord {
    const COLUMNS: &'static [&'static str] = &[
        "repo_id",
        "full_name",
        "name",
        "owner",
        "language",
        "created_at",
        "updated_at",
        "size_kb",
        "stargazers_count",
        "forks_count",
        "open_issues_count",
        "watchers_count",
        "license",
        "topics",
        "star_bin",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        let mut cells = self.record.cells();
        cells.push(Cell::Text(&self.star_bin));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RawRepoRecord {
        RawRepoRecord {
            repo_id: 42,
            full_name: Some("octo/widget".into()),
            name: Some("widget".into()),
            owner: Some("octo".into()),
            language: Some("Rust".into()),
            created_at: DateTime::from_timestamp(1_420_070_400, 0),
            updated_at: None,
            size_kb: Some(120),
            stargazers_count: Some(7),
            forks_count: Some(1),
            open_issues_count: Some(0),
            watchers_count: Some(7),
            license: Some("MIT License".into()),
            topics: Some("cli,rust".into()),
        }
    }

    #[test]
    fn test_cells_match_columns() {
        let record = sample_record();
        assert_eq!(record.cells().len(), RawRepoRecord::COLUMNS.len());

        let balanced = BalancedRecord { record, star_bin: "0-10".into() };
        assert_eq!(balanced.cells().len(), BalancedRecord::COLUMNS.len());
        assert_eq!(BalancedRecord::COLUMNS.last(), Some(&"star_bin"));
    }

    #[test]
    fn test_cell_text_rendering() {
        let record = sample_record();
        let texts: Vec<_> = record.cells().iter().map(Cell::to_text).collect();
        assert_eq!(texts[0], "42");
        assert_eq!(texts[5], "2015-01-01T00:00:00Z");
        assert_eq!(texts[6], "");
        assert_eq!(texts[13], "cli,rust");
    }

    #[test]
    fn test_missing_stars_are_zero() {
        let record = RawRepoRecord { stargazers_count: None, ..sample_record() };
        assert_eq!(record.stars(), 0);
    }
}
