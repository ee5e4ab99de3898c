//! Command-line interface for the rating pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::HeaderStyle;
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "rating-pipeline")]
#[command(about = "Pair, clean and reconcile two-rater CSV annotations", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge matching CSV files from two rater folders into one TSV
    Pair {
        /// Folder containing rater A's CSV files
        #[arg(long)]
        rater_a: Option<PathBuf>,
        /// Folder containing rater B's CSV files
        #[arg(long)]
        rater_b: Option<PathBuf>,
        /// Output TSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Label rater columns "A" and "B" instead of folder names
        #[arg(long)]
        fixed_labels: bool,
    },

    /// Write strict and conservative copies of data/decision/*.csv
    SortUncertain {
        /// Base directory containing data/decision
        base_dir: Option<PathBuf>,
    },

    /// Classify components of a merged table as agreed or disputed
    Agreement {
        /// Merged TSV produced by `pair`
        input: PathBuf,
        /// Output TSV path (defaults to agreement.tsv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn truncate_display(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let head: String = value.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        println!("║ {:<20}: {:<39} ║", key, truncate_display(value, 39));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Pair {
            rater_a,
            rater_b,
            output,
            fixed_labels,
        } => {
            let rater_a = rater_a.or_else(|| config.pairing.rater_a_dir.clone());
            let rater_b = rater_b.or_else(|| config.pairing.rater_b_dir.clone());
            let output = output.unwrap_or_else(|| config.pairing.output_file.clone());
            let style = if fixed_labels {
                HeaderStyle::Fixed
            } else {
                config.pairing.header_style
            };
            cmd_pair(rater_a, rater_b, &output, style);
        }
        Commands::SortUncertain { base_dir } => {
            let base_dir = base_dir.unwrap_or_else(|| config.uncertainty.base_dir.clone());
            cmd_sort_uncertain(&base_dir);
        }
        Commands::Agreement { input, output } => {
            let output = output
                .or_else(|| config.agreement.output_file.clone())
                .unwrap_or_else(|| crate::processors::agreement::default_report_path(&input));
            cmd_agreement(&input, &output);
        }
    }
}

fn load_config(path: Option<&Path>) -> PipelineConfig {
    match path {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    }
}

fn cmd_pair(rater_a: Option<PathBuf>, rater_b: Option<PathBuf>, output: &Path, style: HeaderStyle) {
    use crate::processors::pairing;

    // No folder is a user choice, not a failure
    let Some(rater_a) = rater_a else {
        println!("No folder selected for rater A. Exiting.");
        return;
    };
    let Some(rater_b) = rater_b else {
        println!("No folder selected for rater B. Exiting.");
        return;
    };

    let start = Instant::now();

    println!("Pairing rater files...");
    println!("Rater A: {}", rater_a.display());
    println!("Rater B: {}", rater_b.display());

    let spinner = create_spinner("Matching files by name...");

    match pairing::merge_rater_dirs(&rater_a, &rater_b, output, style) {
        Ok(report) => {
            spinner.finish_and_clear();

            let (label_a, label_b) = pairing::header_labels(&rater_a, &rater_b, style);

            print_summary(
                "Pairing Complete",
                &[
                    ("Output file", output.display().to_string()),
                    ("Columns", format!("Subject, Session, {}, {}", label_a, label_b)),
                    ("Rows written", report.items.len().to_string()),
                    ("Only in A", report.orphans_a.len().to_string()),
                    ("Only in B", report.orphans_b.len().to_string()),
                    ("Malformed names", report.malformed.len().to_string()),
                    ("Non-UTF-8 names", report.unreadable_names.len().to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Pairing failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_sort_uncertain(base_dir: &Path) {
    use crate::processors::uncertainty;

    let start = Instant::now();

    println!("Sorting uncertain decisions...");
    println!("Base directory: {}", base_dir.display());

    let spinner = create_spinner("Stripping uncertainty markers...");

    match uncertainty::process_decision_dir(base_dir) {
        Ok(records) => {
            spinner.finish_and_clear();

            let total_markers: usize = records.iter().map(|r| r.n_uncertain).sum();
            let files_with_markers = records.iter().filter(|r| r.n_uncertain > 0).count();

            print_summary(
                "Uncertainty Sort Complete",
                &[
                    ("Base directory", base_dir.display().to_string()),
                    ("Files processed", records.len().to_string()),
                    ("Files uncertain", files_with_markers.to_string()),
                    ("Markers removed", total_markers.to_string()),
                    (
                        "Summary",
                        uncertainty::summary_path(base_dir).display().to_string(),
                    ),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Uncertainty sort failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_agreement(input: &Path, output: &Path) {
    use crate::processors::agreement;

    let start = Instant::now();

    println!("Classifying rater agreement...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    let spinner = create_spinner("Tallying component votes...");

    match agreement::write_agreement_report(input, output) {
        Ok(items) => {
            spinner.finish_and_clear();

            let agreed: usize = items.iter().map(|i| i.agreed().len()).sum();
            let disputed: usize = items.iter().map(|i| i.disputed().len()).sum();

            print_summary(
                "Agreement Report Complete",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output file", output.display().to_string()),
                    ("Items", items.len().to_string()),
                    ("Agreed components", agreed.to_string()),
                    ("Disputed components", disputed.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Agreement report failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair_command() {
        let cli = Cli::try_parse_from([
            "rating-pipeline",
            "-vv",
            "pair",
            "--rater-a",
            "/data/jane",
            "--rater-b",
            "/data/tom",
            "--fixed-labels",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Pair {
                rater_a,
                rater_b,
                output,
                fixed_labels,
            } => {
                assert_eq!(rater_a, Some(PathBuf::from("/data/jane")));
                assert_eq!(rater_b, Some(PathBuf::from("/data/tom")));
                assert!(output.is_none());
                assert!(fixed_labels);
            }
            _ => panic!("Expected pair command"),
        }
    }

    #[test]
    fn test_parse_sort_uncertain_default_base() {
        let cli = Cli::try_parse_from(["rating-pipeline", "sort-uncertain"]).unwrap();

        match cli.command {
            Commands::SortUncertain { base_dir } => assert!(base_dir.is_none()),
            _ => panic!("Expected sort-uncertain command"),
        }
    }

    #[test]
    fn test_agreement_requires_input() {
        assert!(Cli::try_parse_from(["rating-pipeline", "agreement"]).is_err());
    }

    #[test]
    fn test_load_config_falls_back_to_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/config.yaml")));
        assert_eq!(config.uncertainty.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("short", 39), "short");
        assert_eq!(truncate_display("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_display("ääääääääää", 8).chars().count(), 8);
    }
}
