//! CSV export of match results.
//!
//! The export has one row per (story, DOI) match with the header
//! `Title,DOI,Story URL`. It is always written as UTF-8.

use crate::models::MatchRecord;
use std::error::Error;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Default file name for the export.
pub const DEFAULT_EXPORT_FILE: &str = "retracted_on_scimex.csv";

/// Serialize `matches` as CSV into `writer`.
pub fn write_matches<W: io::Write>(writer: W, matches: &[MatchRecord]) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in matches {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render `matches` to CSV bytes.
pub fn matches_to_csv(matches: &[MatchRecord]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut buf = Vec::new();
    write_matches(&mut buf, matches)?;
    Ok(buf)
}

/// Write `matches` to the CSV file at `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = matches.len()))]
pub async fn write_matches_csv(matches: &[MatchRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = matches_to_csv(matches)?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create export dir");
            return Err(e.into());
        }
    }

    fs::write(path, bytes).await?;
    info!("Wrote CSV export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_TITLE;

    fn record(title: &str, doi: &str, url: &str) -> MatchRecord {
        MatchRecord {
            title: title.to_string(),
            doi: doi.to_string(),
            story_url: url.to_string(),
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let matches = vec![
            record("Coffee, tea and you", "10.1000/xyz123", "https://www.scimex.org/newsfeed/a"),
            record(UNKNOWN_TITLE, "10.2000/abc", "https://www.scimex.org/newsfeed/b"),
        ];
        let csv = String::from_utf8(matches_to_csv(&matches).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Title,DOI,Story URL");
        assert_eq!(
            lines[1],
            "\"Coffee, tea and you\",10.1000/xyz123,https://www.scimex.org/newsfeed/a"
        );
        assert_eq!(lines[2], "Unknown Title,10.2000/abc,https://www.scimex.org/newsfeed/b");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_keeps_utf8() {
        let matches = vec![record("Ngā pūtaiao – science", "10.1000/x", "u")];
        let csv = String::from_utf8(matches_to_csv(&matches).unwrap()).unwrap();
        assert!(csv.contains("Ngā pūtaiao – science"));
    }

    #[tokio::test]
    async fn test_write_matches_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_EXPORT_FILE);
        let matches = vec![record("T", "10.1000/xyz123", "https://s/1")];
        write_matches_csv(&matches, &path).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Title,DOI,Story URL\nT,10.1000/xyz123,https://s/1\n");
    }
}
