//! Core text transforms and file I/O.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{list_csv_files, read_trimmed, read_tsv_records, CsvListing, LoaderError};
pub use transforms::{conservative_variant, count_uncertain_markers, strict_variant};
pub use writers::{write_summary_csv, write_text, write_tsv, WriteError};
