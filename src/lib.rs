//! Batch tools for two-rater CSV annotations.
//!
//! This crate provides tools for:
//! - Pairing per-subject rater files from two directories into one TSV
//! - Stripping `(n)` uncertainty markers into strict and conservative copies
//! - Classifying each component of a paired table as agreed or disputed
//!
//! # Example
//!
//! ```no_run
//! use rating_pipeline::processors::uncertainty::process_decision_dir;
//! use std::path::Path;
//!
//! let records = process_decision_dir(Path::new(".")).unwrap();
//! for r in &records {
//!     println!("{}: {}", r.filename, r.n_uncertain);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{AgreementConfig, HeaderStyle, PairingConfig, PipelineConfig, UncertaintyConfig};
pub use processors::{ItemAgreement, PairingReport, RatedItem, UncertaintyRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
