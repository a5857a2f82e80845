use super::{Cell, DatasetRow, RawRepoRecord};
use crate::Result;
use ohno::IntoAppError;
use std::io::{Read, Write};

pub fn generate<R: DatasetRow, W: Write>(rows: &[R], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(R::COLUMNS)?;
    for row in rows {
        csv_writer.write_record(row.cells().iter().map(Cell::to_text))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Read every record of a CSV dataset, matching columns by header name.
///
/// Columns that are not part of [`RawRepoRecord`] (such as `star_bin`) are ignored.
pub fn parse<Rd: Read>(reader: Rd) -> Result<Vec<RawRepoRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    csv_reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| row.into_app_err_with(|| format!("malformed dataset row {}", index + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::BalancedRecord;
    use chrono::DateTime;

    fn record(repo_id: u64, stars: Option<u64>) -> RawRepoRecord {
        RawRepoRecord {
            repo_id,
            full_name: Some(format!("owner/repo-{repo_id}")),
            name: Some(format!("repo-{repo_id}")),
            owner: Some("owner".into()),
            language: None,
            created_at: DateTime::from_timestamp(1_600_000_000, 0),
            updated_at: DateTime::from_timestamp(1_700_000_000, 0),
            size_kb: Some(10),
            stargazers_count: stars,
            forks_count: Some(0),
            open_issues_count: Some(3),
            watchers_count: stars,
            license: Some("Apache License 2.0".into()),
            topics: Some("a,b".into()),
        }
    }

    #[test]
    fn test_header_row() {
        let mut out = Vec::new();
        generate::<RawRepoRecord, _>(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.trim_end(),
            "repo_id,full_name,name,owner,language,created_at,updated_at,size_kb,stargazers_count,forks_count,open_issues_count,watchers_count,license,topics"
        );
    }

    #[test]
    fn test_topics_are_quoted() {
        let mut out = Vec::new();
        generate(&[record(1, Some(5))], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"a,b\""));
    }

    #[test]
    fn test_parse_written_dataset() {
        let records = vec![record(1, Some(5)), record(2, None)];
        let mut out = Vec::new();
        generate(&records, &mut out).unwrap();

        let parsed = parse(out.as_slice()).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_parse_ignores_star_bin_column() {
        let balanced = vec![BalancedRecord { record: record(9, Some(50)), star_bin: "11-100".into() }];
        let mut out = Vec::new();
        generate(&balanced, &mut out).unwrap();

        let parsed = parse(out.as_slice()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].repo_id, 9);
    }

    #[test]
    fn test_parse_malformed_row() {
        let data = "repo_id,name\nnot-a-number,x\n";
        assert!(parse(data.as_bytes()).is_err());
    }
}
