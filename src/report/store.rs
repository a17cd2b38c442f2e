//! Report persistence: writing, listing and reading saved reports

use super::render::{render_report, report_filename};
use super::ReportError;
use crate::research::ReportDocument;
use chrono::{DateTime, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Names the store lists and reads back: single path components shaped like
/// `report_*.md`. Any Unicode the filename sanitizer keeps is allowed.
static REPORT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^report_[^/\\\x00]+\.md$").expect("valid report name regex"));

/// A saved report as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub modified: DateTime<Local>,
}

/// Append-only directory of rendered reports
///
/// Filenames are derived per run, so concurrent writers never coordinate.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    query_prefix_len: usize,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>, query_prefix_len: usize) -> Self {
        Self {
            dir: dir.into(),
            query_prefix_len,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render and write a report, creating the directory if needed
    ///
    /// Two runs with the same sanitized prefix in the same second share a
    /// filename and the later one wins.
    pub async fn save(
        &self,
        query: &str,
        report: &ReportDocument,
        generated_at: &NaiveDateTime,
    ) -> Result<PathBuf, ReportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = report_filename(query, generated_at, self.query_prefix_len);
        let path = self.dir.join(filename);
        let content = render_report(query, report, generated_at);

        tokio::fs::write(&path, content).await?;
        debug!("Wrote report to {}", path.display());
        Ok(path)
    }

    /// List saved reports, newest first by modification time
    pub async fn list(&self) -> Result<Vec<ReportEntry>, ReportError> {
        let mut entries = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !Self::is_valid_name(&name) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            entries.push(ReportEntry {
                name,
                modified: DateTime::<Local>::from(modified),
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(entries)
    }

    /// Read a saved report by filename
    pub async fn read(&self, name: &str) -> Result<String, ReportError> {
        if !Self::is_valid_name(name) {
            return Err(ReportError::InvalidName(name.to_string()));
        }

        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReportError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check that a name refers to a report file directly inside the store
    pub fn is_valid_name(name: &str) -> bool {
        REPORT_NAME.is_match(name) && !name.contains("..")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report() -> ReportDocument {
        ReportDocument {
            short_summary: "summary".to_string(),
            markdown_report: "body".to_string(),
            follow_up_questions: vec!["next?".to_string()],
        }
    }

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, second)
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path().join("nested/outputs"), 50);

        let path = store.save("hello world", &report(), &at(5)).await.unwrap();

        assert!(path.exists());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "report_2025-01-02_03-04-05_hello_world.md"
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Research Report\n\n**Query:** hello world\n\n"));
        assert!(content.ends_with("- next?"));
    }

    #[tokio::test]
    async fn test_same_second_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path(), 50);

        let first = store.save("dup", &report(), &at(1)).await.unwrap();
        let mut second_report = report();
        second_report.markdown_report = "newer".to_string();
        let second = store.save("dup", &second_report, &at(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(std::fs::read_to_string(second).unwrap().contains("newer"));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filters() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path(), 50);

        let old = tmp.path().join("report_a.md");
        let new = tmp.path().join("report_b.md");
        std::fs::write(&old, "old").unwrap();
        std::fs::write(&new, "new").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let earlier = SystemTime::now() - std::time::Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(earlier)
            .unwrap();

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["report_b.md", "report_a.md"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path().join("absent"), 50);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_round_trip_and_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path(), 50);
        let path = store.save("read me", &report(), &at(9)).await.unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();

        let content = store.read(name).await.unwrap();
        assert!(content.contains("**Query:** read me"));

        assert!(matches!(
            store.read("report_missing.md").await,
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            store.read("../secrets.md").await,
            Err(ReportError::InvalidName(_))
        ));
    }

    #[test]
    fn test_name_validation() {
        assert!(ReportStore::is_valid_name("report_2025-01-02_03-04-05_x.md"));
        assert!(!ReportStore::is_valid_name("report_../x.md"));
        assert!(!ReportStore::is_valid_name("other.md"));
        assert!(!ReportStore::is_valid_name("report_x.md.bak"));
        assert!(!ReportStore::is_valid_name("report_a\\..\\b.md"));
        assert!(!ReportStore::is_valid_name("report_a..md"));
        assert!(!ReportStore::is_valid_name("report_a\0b.md"));
        assert!(ReportStore::is_valid_name("report_2025-01-02_03-04-05_H₂O_½.md"));
    }

    #[tokio::test]
    async fn test_non_ascii_numeric_query_is_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path(), 50);

        let path = store
            .save("Water H₂O and ½ measures", &report(), &at(5))
            .await
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(name, "report_2025-01-02_03-04-05_Water_H₂O_and_½_measures.md");

        let listed: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(listed, vec![name.clone()]);

        let content = store.read(&name).await.unwrap();
        assert!(content.contains("**Query:** Water H₂O and ½ measures"));
    }
}
