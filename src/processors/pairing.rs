//! Pairing of per-subject files from two rater directories.
//!
//! Each rater directory holds one `<Subject>_<Session>[_...].csv` file per
//! rated item. Files are joined on their exact file name; the merged table
//! has one row per name present on both sides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::HeaderStyle;
use crate::core::loaders::{self, CsvListing, LoaderError};
use crate::core::writers;

/// Errors that can occur while pairing rater files.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Rater directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to list rater directory {path}: {source}")]
    ListError {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },
}

/// One matched pair of rater files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedItem {
    /// File name shared by both raters
    pub filename: String,
    pub subject: String,
    pub session: String,
    /// Trimmed contents of rater A's file
    pub rater_a: String,
    /// Trimmed contents of rater B's file
    pub rater_b: String,
}

impl RatedItem {
    fn into_row(self) -> Vec<String> {
        vec![self.subject, self.session, self.rater_a, self.rater_b]
    }
}

/// Outcome of pairing two rater directories.
#[derive(Debug, Clone, Default)]
pub struct PairingReport {
    /// Matched items in ascending file name order
    pub items: Vec<RatedItem>,
    /// Files only rater A has
    pub orphans_a: Vec<String>,
    /// Files only rater B has
    pub orphans_b: Vec<String>,
    /// Matched files whose name lacks a session token
    pub malformed: Vec<String>,
    /// CSV files on either side whose names are not valid UTF-8
    pub unreadable_names: Vec<PathBuf>,
}

/// Split a file name into its Subject and Session tokens.
///
/// The `.csv` extension is dropped first, then the stem is split on `_`.
/// Tokens past the second are ignored. Returns `None` when the stem has
/// fewer than two tokens.
///
/// ```
/// use rating_pipeline::processors::pairing::split_subject_session;
///
/// assert_eq!(
///     split_subject_session("S01_02.csv"),
///     Some(("S01".to_string(), "02".to_string()))
/// );
/// assert_eq!(split_subject_session("S01.csv"), None);
/// ```
pub fn split_subject_session(filename: &str) -> Option<(String, String)> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let mut parts = stem.split('_');
    let subject = parts.next()?;
    let session = parts.next()?;
    Some((subject.to_string(), session.to_string()))
}

/// Column labels for the two rater columns.
pub fn header_labels(dir_a: &Path, dir_b: &Path, style: HeaderStyle) -> (String, String) {
    match style {
        HeaderStyle::Fixed => ("A".to_string(), "B".to_string()),
        HeaderStyle::Folder => (folder_label(dir_a, "A"), folder_label(dir_b, "B")),
    }
}

fn folder_label(dir: &Path, fallback: &str) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn list_rater_dir(dir: &Path) -> std::result::Result<CsvListing, PairingError> {
    loaders::list_csv_files(dir).map_err(|e| match e {
        LoaderError::DirectoryNotFound(path) => PairingError::DirectoryNotFound(path),
        other => PairingError::ListError {
            path: dir.to_path_buf(),
            source: other,
        },
    })
}

/// Join the CSV files of two rater directories on file name.
///
/// Orphans on either side, malformed names and names that are not valid
/// UTF-8 are logged as warnings and recorded in the report; they never fail
/// the run.
///
/// # Errors
///
/// Fails if either directory is missing or a matched file cannot be read.
pub fn pair_rater_files(dir_a: &Path, dir_b: &Path) -> Result<PairingReport> {
    let listing_a = list_rater_dir(dir_a)?;
    let listing_b = list_rater_dir(dir_b)?;
    let (files_a, files_b) = (&listing_a.files, &listing_b.files);

    debug!(
        "Found {} files for rater A, {} for rater B",
        files_a.len(),
        files_b.len()
    );

    let mut report = PairingReport {
        orphans_a: files_a
            .keys()
            .filter(|name| !files_b.contains_key(*name))
            .cloned()
            .collect(),
        orphans_b: files_b
            .keys()
            .filter(|name| !files_a.contains_key(*name))
            .cloned()
            .collect(),
        unreadable_names: listing_a
            .non_utf8
            .iter()
            .chain(&listing_b.non_utf8)
            .cloned()
            .collect(),
        ..PairingReport::default()
    };

    for path in &report.unreadable_names {
        warn!("Skipping {}: file name is not valid UTF-8", path.display());
    }

    if !report.orphans_a.is_empty() {
        warn!(
            "Files in A without matching B files: {}",
            report.orphans_a.join(", ")
        );
    }
    if !report.orphans_b.is_empty() {
        warn!(
            "Files in B without matching A files: {}",
            report.orphans_b.join(", ")
        );
    }

    for (filename, path_a) in files_a {
        let path_b = match files_b.get(filename) {
            Some(path) => path,
            None => continue,
        };

        let (subject, session) = match split_subject_session(filename) {
            Some(ids) => ids,
            None => {
                warn!("Skipping {}: expected <subject>_<session>.csv", filename);
                report.malformed.push(filename.clone());
                continue;
            }
        };

        let rater_a = loaders::read_trimmed(path_a)
            .with_context(|| format!("Failed to read rater A file: {}", path_a.display()))?;
        let rater_b = loaders::read_trimmed(path_b)
            .with_context(|| format!("Failed to read rater B file: {}", path_b.display()))?;

        report.items.push(RatedItem {
            filename: filename.clone(),
            subject,
            session,
            rater_a,
            rater_b,
        });
    }

    Ok(report)
}

/// Pair two rater directories and write the merged TSV.
///
/// Columns are `Subject`, `Session` and the two labels chosen by `style`.
///
/// # Arguments
///
/// * `dir_a` - Rater A directory
/// * `dir_b` - Rater B directory
/// * `output` - TSV path (parent directories are created if needed)
/// * `style` - How to label the rater columns
pub fn merge_rater_dirs(
    dir_a: &Path,
    dir_b: &Path,
    output: &Path,
    style: HeaderStyle,
) -> Result<PairingReport> {
    let report = pair_rater_files(dir_a, dir_b)?;
    let (label_a, label_b) = header_labels(dir_a, dir_b, style);

    let header = ["Subject", "Session", label_a.as_str(), label_b.as_str()];
    let rows: Vec<Vec<String>> = report.items.iter().cloned().map(RatedItem::into_row).collect();

    writers::write_tsv(output, &header, &rows)
        .with_context(|| format!("Failed to write merged table: {}", output.display()))?;

    info!(
        "Wrote {} paired rows to {} (columns: Subject, Session, {}, {})",
        rows.len(),
        output.display(),
        label_a,
        label_b
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_rater_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", content).unwrap();
        path
    }

    fn setup_rater_dirs(base: &Path) -> (PathBuf, PathBuf) {
        let a = base.join("rater_jane");
        let b = base.join("rater_tom");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        (a, b)
    }

    #[test]
    fn test_split_subject_session() {
        assert_eq!(
            split_subject_session("S01_01.csv"),
            Some(("S01".to_string(), "01".to_string()))
        );
        assert_eq!(
            split_subject_session("S01_02_extra.csv"),
            Some(("S01".to_string(), "02".to_string()))
        );
        assert_eq!(split_subject_session("S01.csv"), None);
    }

    #[test]
    fn test_header_labels() {
        let a = Path::new("/data/rater_jane");
        let b = Path::new("/data/rater_tom");

        assert_eq!(
            header_labels(a, b, HeaderStyle::Folder),
            ("rater_jane".to_string(), "rater_tom".to_string())
        );
        assert_eq!(
            header_labels(a, b, HeaderStyle::Fixed),
            ("A".to_string(), "B".to_string())
        );
    }

    #[test]
    fn test_pair_rater_files_reports_orphans() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());

        create_rater_csv(&a, "S01_01.csv", "1,(2),3");
        create_rater_csv(&a, "S02_01.csv", "4");
        create_rater_csv(&b, "S01_01.csv", "  1,4  ");

        let report = pair_rater_files(&a, &b).unwrap();

        assert_eq!(report.items.len(), 1);
        let item = &report.items[0];
        assert_eq!(item.subject, "S01");
        assert_eq!(item.session, "01");
        assert_eq!(item.rater_a, "1,(2),3");
        assert_eq!(item.rater_b, "1,4");

        assert_eq!(report.orphans_a, vec!["S02_01.csv"]);
        assert!(report.orphans_b.is_empty());
    }

    #[test]
    fn test_pair_rater_files_reports_orphans_on_b_side() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());

        create_rater_csv(&a, "S01_01.csv", "1");
        create_rater_csv(&b, "S01_01.csv", "1");
        create_rater_csv(&b, "S03_02.csv", "7");
        create_rater_csv(&b, "S04_01.csv", "8");

        let report = pair_rater_files(&a, &b).unwrap();

        assert_eq!(report.items.len(), 1);
        assert!(report.orphans_a.is_empty());
        assert_eq!(report.orphans_b, vec!["S03_02.csv", "S04_01.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_pair_rater_files_reports_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());
        let raw_name = OsStr::from_bytes(b"S0\xff_01.csv");

        File::create(a.join(raw_name)).unwrap();
        File::create(b.join(raw_name)).unwrap();
        create_rater_csv(&a, "S9_01.csv", "1");

        let report = pair_rater_files(&a, &b).unwrap();

        assert!(report.items.is_empty());
        assert_eq!(report.orphans_a, vec!["S9_01.csv"]);
        assert_eq!(
            report.unreadable_names,
            vec![a.join(raw_name), b.join(raw_name)]
        );
    }

    #[test]
    fn test_pair_rater_files_skips_malformed_names() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());

        create_rater_csv(&a, "S01.csv", "1");
        create_rater_csv(&b, "S01.csv", "1");
        create_rater_csv(&a, "S02_01.csv", "2");
        create_rater_csv(&b, "S02_01.csv", "3");

        let report = pair_rater_files(&a, &b).unwrap();

        assert_eq!(report.malformed, vec!["S01.csv"]);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].subject, "S02");
    }

    #[test]
    fn test_pair_rater_files_keeps_subject_session_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());

        for name in ["S01_01.csv", "S01_01_retest.csv"] {
            create_rater_csv(&a, name, "1");
            create_rater_csv(&b, name, "2");
        }

        let report = pair_rater_files(&a, &b).unwrap();

        assert_eq!(report.items.len(), 2);
        assert!(report
            .items
            .iter()
            .all(|item| item.subject == "S01" && item.session == "01"));
    }

    #[test]
    fn test_pair_rater_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let (a, _) = setup_rater_dirs(temp_dir.path());
        let missing = temp_dir.path().join("rater_missing");

        let err = pair_rater_files(&a, &missing).unwrap_err();

        match err.downcast_ref::<PairingError>() {
            Some(PairingError::DirectoryNotFound(path)) => assert_eq!(path, &missing),
            _ => panic!("Expected DirectoryNotFound, got {}", err),
        }
    }

    #[test]
    fn test_merge_rater_dirs_writes_tsv() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());

        create_rater_csv(&a, "S02_01.csv", "5");
        create_rater_csv(&b, "S02_01.csv", "(5)");
        create_rater_csv(&a, "S01_01.csv", "1,2");
        create_rater_csv(&b, "S01_01.csv", "2");

        let output = temp_dir.path().join("data").join("identified_components.txt");
        let report = merge_rater_dirs(&a, &b, &output, HeaderStyle::Folder).unwrap();

        assert_eq!(report.items.len(), 2);

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Subject\tSession\trater_jane\trater_tom");
        assert_eq!(lines[1], "S01\t01\t1,2\t2");
        assert_eq!(lines[2], "S02\t01\t5\t(5)");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_merge_rater_dirs_fixed_labels_empty_input() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = setup_rater_dirs(temp_dir.path());
        let output = temp_dir.path().join("merged.txt");

        let report = merge_rater_dirs(&a, &b, &output, HeaderStyle::Fixed).unwrap();

        assert!(report.items.is_empty());
        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["Subject\tSession\tA\tB"]);
    }
}
