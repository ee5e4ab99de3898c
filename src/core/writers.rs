//! Writers for text, TSV and CSV outputs.
//!
//! This module provides functions for writing pipeline results:
//! - Raw text files (strict and conservative variants)
//! - Tab-separated tables with a header row
//! - The `filename,n_uncertain` summary CSV

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A row does not have as many fields as the header.
    #[error("row {row} has {found} fields, header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a CSV writer over a buffered file with the given delimiter.
fn create_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(BufWriter::new(file)))
}

/// Write `content` verbatim, replacing any existing file.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dirs(path)?;
    fs::write(path, content).map_err(|e| WriteError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write a tab-separated table.
///
/// Fields containing tabs, quotes or line breaks are quoted, so multi-line
/// rater payloads survive a round trip through any TSV reader.
///
/// # Errors
///
/// Returns [`WriteError::RowWidth`] if any row differs in width from
/// `header`; nothing is written in that case.
///
/// # Example
///
/// ```no_run
/// use rating_pipeline::core::writers::write_tsv;
/// use std::path::Path;
///
/// let rows = vec![vec!["S01".to_string(), "01".to_string()]];
/// write_tsv(Path::new("out.txt"), &["Subject", "Session"], &rows).unwrap();
/// ```
pub fn write_tsv<S: AsRef<str>>(path: &Path, header: &[S], rows: &[Vec<String>]) -> Result<()> {
    if let Some((row, found)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != header.len())
        .map(|(i, r)| (i, r.len()))
    {
        return Err(WriteError::RowWidth {
            row,
            expected: header.len(),
            found,
        });
    }

    let mut writer = create_csv_writer(path, b'\t')?;
    let path_str = path.display().to_string();

    writer
        .write_record(header.iter().map(|h| h.as_ref()))
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for row in rows {
        writer.write_record(row).map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write the per-file uncertainty summary with header `filename,n_uncertain`.
pub fn write_summary_csv<'a, I>(path: &Path, entries: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let mut writer = create_csv_writer(path, b',')?;
    let path_str = path.display().to_string();

    writer
        .write_record(["filename", "n_uncertain"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for (filename, count) in entries {
        writer
            .write_record([filename, count.to_string().as_str()])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
