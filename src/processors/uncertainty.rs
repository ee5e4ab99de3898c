//! Stripping of uncertainty markers from decision files.
//!
//! Layout under the base directory:
//!
//! ```text
//! data/decision/*.csv        input
//! data/strict/*.csv          markers and their items removed
//! data/conservative/*.csv    parentheses removed, numbers kept
//! data/uncertain_summary.csv filename,n_uncertain
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::core::loaders;
use crate::core::transforms::{conservative_variant, count_uncertain_markers, strict_variant};
use crate::core::writers;

pub const DATA_DIR: &str = "data";
pub const DECISION_DIR: &str = "decision";
pub const STRICT_DIR: &str = "strict";
pub const CONSERVATIVE_DIR: &str = "conservative";
pub const SUMMARY_FILE: &str = "uncertain_summary.csv";

/// Errors that can occur while sorting uncertain decisions.
#[derive(Debug, Error)]
pub enum UncertaintyError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to create output directory {path}: {source}")]
    CreateDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One decision file and its derived variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncertaintyRecord {
    pub filename: String,
    /// Trimmed original text
    pub original: String,
    /// Number of `(n)` markers found
    pub n_uncertain: usize,
    pub strict: String,
    pub conservative: String,
}

impl UncertaintyRecord {
    /// Derive both variants and the marker count from trimmed file content.
    pub fn from_content(filename: impl Into<String>, content: &str) -> Self {
        let original = content.trim().to_string();
        Self {
            filename: filename.into(),
            n_uncertain: count_uncertain_markers(&original),
            strict: strict_variant(&original),
            conservative: conservative_variant(&original),
            original,
        }
    }
}

/// `base/data/decision`
pub fn decision_dir(base: &Path) -> PathBuf {
    base.join(DATA_DIR).join(DECISION_DIR)
}

/// `base/data/uncertain_summary.csv`
pub fn summary_path(base: &Path) -> PathBuf {
    base.join(DATA_DIR).join(SUMMARY_FILE)
}

/// Create `data/strict` and `data/conservative` under `base` if absent.
pub fn ensure_output_dirs(base: &Path) -> std::result::Result<(), UncertaintyError> {
    for name in [STRICT_DIR, CONSERVATIVE_DIR] {
        let dir = base.join(DATA_DIR).join(name);
        fs::create_dir_all(&dir).map_err(|e| UncertaintyError::CreateDirError {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

fn process_file(base: &Path, filename: &str, src: &Path) -> Result<UncertaintyRecord> {
    let content = loaders::read_trimmed(src)
        .with_context(|| format!("Failed to read decision file: {}", src.display()))?;

    let record = UncertaintyRecord::from_content(filename, &content);

    let data = base.join(DATA_DIR);
    let strict_path = data.join(STRICT_DIR).join(filename);
    let conservative_path = data.join(CONSERVATIVE_DIR).join(filename);

    writers::write_text(&strict_path, &record.strict)
        .with_context(|| format!("Failed to write {}", strict_path.display()))?;
    writers::write_text(&conservative_path, &record.conservative)
        .with_context(|| format!("Failed to write {}", conservative_path.display()))?;

    debug!("{}: {} uncertain", filename, record.n_uncertain);

    Ok(record)
}

/// Write strict and conservative variants for every decision file.
///
/// Files are processed in parallel using rayon. Records come back in
/// ascending file name order, which is also the row order of the summary
/// written to `data/uncertain_summary.csv`.
///
/// # Errors
///
/// Fails with [`UncertaintyError::DirectoryNotFound`] if
/// `base/data/decision` is missing. Any read or write failure aborts the
/// run.
pub fn process_decision_dir(base: &Path) -> Result<Vec<UncertaintyRecord>> {
    let input_dir = decision_dir(base);
    if !input_dir.is_dir() {
        return Err(UncertaintyError::DirectoryNotFound(input_dir).into());
    }

    ensure_output_dirs(base)?;

    let listing = loaders::list_csv_files(&input_dir)
        .with_context(|| format!("Failed to list {}", input_dir.display()))?;

    for path in &listing.non_utf8 {
        warn!("Skipping {}: file name is not valid UTF-8", path.display());
    }

    let files: Vec<(String, PathBuf)> = listing.files.into_iter().collect();

    info!("Processing {} decision files", files.len());

    let records: Vec<UncertaintyRecord> = files
        .par_iter()
        .map(|(filename, src)| process_file(base, filename, src))
        .collect::<Result<_>>()?;

    let summary = summary_path(base);
    writers::write_summary_csv(
        &summary,
        records
            .iter()
            .map(|r| (r.filename.as_str(), r.n_uncertain)),
    )
    .with_context(|| format!("Failed to write summary: {}", summary.display()))?;

    Ok(records)
}
