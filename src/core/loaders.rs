//! Loaders for rater and decision files.
//!
//! Rater and decision files are `*.csv` by name but are treated as opaque
//! text payloads. The only structured input is the merged pairing table,
//! which is read as tab-separated records.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Returns true for regular files with a `.csv` extension (any case).
fn is_csv_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
}

/// `*.csv` files found in one directory.
#[derive(Debug, Clone, Default)]
pub struct CsvListing {
    /// File name to full path, in ascending name order
    pub files: BTreeMap<String, PathBuf>,
    /// CSV files whose names are not valid UTF-8
    pub non_utf8: Vec<PathBuf>,
}

/// Map every `*.csv` file name in `dir` to its full path.
///
/// Subdirectories are not descended into. Names that are not valid UTF-8
/// cannot be joined or written to a text table; they are returned in
/// [`CsvListing::non_utf8`] so the caller can report them.
///
/// # Errors
///
/// Returns [`LoaderError::DirectoryNotFound`] if `dir` is not a directory,
/// and [`LoaderError::Read`] if the directory or one of its entries cannot
/// be read.
pub fn list_csv_files(dir: &Path) -> Result<CsvListing> {
    if !dir.is_dir() {
        return Err(LoaderError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| LoaderError::Read {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut listing = CsvListing::default();
    for entry in entries {
        let path = entry
            .map_err(|e| LoaderError::Read {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();

        if !is_csv_file(&path) {
            continue;
        }

        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => {
                listing.files.insert(name.to_string(), path);
            }
            None => listing.non_utf8.push(path),
        }
    }

    listing.non_utf8.sort();
    Ok(listing)
}

/// Read a whole file and trim surrounding whitespace.
pub fn read_trimmed(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| LoaderError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(content.trim().to_string())
}

/// Read a tab-separated file with a header row.
///
/// Records are returned without the header. Ragged rows are allowed so the
/// caller can decide what to do with short ones.
pub fn read_tsv_records(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|e| LoaderError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoaderError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(records)
}
