use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::youtube::ResultRecord;

pub const LINK_TEXT: &str = "Video Link";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One CSV row. Field order is the column order.
#[derive(Serialize)]
struct Row<'a> {
    title: &'a str,
    url: String,
    description: &'a str,
    channel_name: &'a str,
    published_date: &'a str,
    video_id: &'a str,
    search_term: &'a str,
}

impl<'a> From<&'a ResultRecord> for Row<'a> {
    fn from(r: &'a ResultRecord) -> Self {
        Row {
            title: &r.title,
            url: hyperlink_formula(&r.url),
            description: &r.description,
            channel_name: &r.channel_name,
            published_date: &r.published_at,
            video_id: &r.video_id,
            search_term: &r.search_term,
        }
    }
}

/// Spreadsheet formula that renders as a clickable "Video Link".
pub fn hyperlink_formula(url: &str) -> String {
    format!(r#"=HYPERLINK("{}", "{LINK_TEXT}")"#, url.replace('"', "\"\""))
}

/// Encode header plus one row per record.
pub fn write_records<W: Write>(writer: W, records: &[ResultRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // serde-driven headers are only emitted alongside the first row
        wtr.write_record([
            "title",
            "url",
            "description",
            "channel_name",
            "published_date",
            "video_id",
            "search_term",
        ])?;
    }
    for record in records {
        wtr.serialize(Row::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Encode fully in memory first so a failure never leaves a truncated file behind.
pub fn write_csv(path: &Path, records: &[ResultRecord]) -> Result<(), OutputError> {
    let mut buf = Vec::new();
    write_records(&mut buf, records)?;
    std::fs::write(path, &buf).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = records.len(), bytes = buf.len(), "csv written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 7] = [
        "title",
        "url",
        "description",
        "channel_name",
        "published_date",
        "video_id",
        "search_term",
    ];

    fn sample() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new(
                "abc123",
                "Cats, \"funny\" edition",
                "line one\nline two",
                "Cat Channel",
                "2024-03-01T12:00:00Z",
                "funny cats",
            ),
            ResultRecord::new("def456", "Plain", "", "Other", "2023-12-31T23:59:59Z", "cats"),
        ]
    }

    fn encode(records: &[ResultRecord]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        buf
    }

    #[test]
    fn header_has_fixed_column_order() {
        let bytes = encode(&sample());
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<_> = reader.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, HEADER);
    }

    #[test]
    fn empty_collection_still_writes_header() {
        let text = String::from_utf8(encode(&[])).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
    }

    #[test]
    fn rows_round_trip_through_csv_reader() {
        let records = sample();
        let bytes = encode(&records);
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(&row[0], record.title);
            assert!(row[1].contains(&record.url), "url column: {}", &row[1]);
            assert_eq!(&row[2], record.description);
            assert_eq!(&row[3], record.channel_name);
            assert_eq!(&row[4], record.published_at);
            assert_eq!(&row[5], record.video_id);
            assert_eq!(&row[6], record.search_term);
        }
    }

    #[test]
    fn url_column_is_hyperlink_formula() {
        assert_eq!(
            hyperlink_formula("https://www.youtube.com/watch?v=abc123"),
            r#"=HYPERLINK("https://www.youtube.com/watch?v=abc123", "Video Link")"#
        );
    }

    #[test]
    fn write_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&path, &sample()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("title,url,description"));
        assert!(text.contains("def456"));
    }

    #[test]
    fn write_csv_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.csv");
        let err = write_csv(&path, &sample()).unwrap_err();
        assert!(matches!(err, OutputError::Write { .. }));
    }
}
