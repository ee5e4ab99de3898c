//! Configuration types for the rating pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the two rater columns of the merged table are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    /// Use the base name of each rater directory
    #[default]
    Folder,
    /// Use the literal labels "A" and "B"
    Fixed,
}

/// Configuration for the pairing merger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Directory holding rater A's CSV files
    #[serde(default)]
    pub rater_a_dir: Option<PathBuf>,

    /// Directory holding rater B's CSV files
    #[serde(default)]
    pub rater_b_dir: Option<PathBuf>,

    /// Merged TSV output path
    #[serde(default = "default_pairing_output")]
    pub output_file: PathBuf,

    #[serde(default)]
    pub header_style: HeaderStyle,
}

fn default_pairing_output() -> PathBuf {
    PathBuf::from("data").join("identified_components.txt")
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            rater_a_dir: None,
            rater_b_dir: None,
            output_file: default_pairing_output(),
            header_style: HeaderStyle::default(),
        }
    }
}

/// Configuration for the uncertainty sorter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertaintyConfig {
    /// Base directory that contains `data/decision`
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

/// Configuration for the agreement report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgreementConfig {
    /// Report output path; defaults to `agreement.tsv` next to the input
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pairing: PairingConfig,

    #[serde(default)]
    pub uncertainty: UncertaintyConfig,

    #[serde(default)]
    pub agreement: AgreementConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
