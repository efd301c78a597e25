//! Utility functions for log formatting and file system checks.

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure the directory that will hold `file` exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file.
/// Called before a long crawl so a bad export path fails fast.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(file = %file.display()))]
pub async fn ensure_parent_writable(file: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };
    fs::create_dir_all(dir).await?;
    // A small sync write has a simpler error surface.
    let scratch_path = dir.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!(dir = %dir.display(), "Export directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let result = truncate_for_log("Ngā pūtaiao", 3);
        assert_eq!(result, "Ngā…(+9 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_parent_writable_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reports").join("out.csv");
        ensure_parent_writable(&file).await.unwrap();
        assert!(dir.path().join("reports").is_dir());
        assert!(!dir.path().join("reports").join("..__write_check__").exists());
    }

    #[tokio::test]
    async fn test_ensure_parent_writable_bare_file_name() {
        assert!(ensure_parent_writable(Path::new("out.csv")).await.is_ok());
    }
}
