//! Configuration types for RGB-D frame synchronization.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dataset folder layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Candidate color folder names, first existing one wins
    #[serde(default = "default_color_candidates")]
    pub color_candidates: Vec<String>,

    /// Depth folder name, replaced in place by the reorganizer
    #[serde(default = "default_depth")]
    pub depth: String,

    /// Holding folder for the original depth files during reorganization
    #[serde(default = "default_temp")]
    pub temp: String,
}

fn default_color_candidates() -> Vec<String> {
    vec!["image".to_string(), "rgb".to_string(), "color".to_string()]
}

fn default_depth() -> String {
    "depth".to_string()
}

fn default_temp() -> String {
    "temp".to_string()
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            color_candidates: default_color_candidates(),
            depth: default_depth(),
            temp: default_temp(),
        }
    }
}

/// File extensions picked up by the listing step.
///
/// Extensions are given with their leading dot and matched case-sensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Color extensions; files are grouped by extension in this order
    #[serde(default = "default_color_extensions")]
    pub color: Vec<String>,

    /// Depth extensions
    #[serde(default = "default_depth_extensions")]
    pub depth: Vec<String>,
}

fn default_color_extensions() -> Vec<String> {
    vec![".jpg".to_string(), ".png".to_string()]
}

fn default_depth_extensions() -> Vec<String> {
    vec![".png".to_string()]
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            color: default_color_extensions(),
            depth: default_depth_extensions(),
        }
    }
}

/// Naming of the renamed depth frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Zero-padded width of the frame number
    #[serde(default = "default_digits")]
    pub digits: usize,

    /// Number given to the first color frame
    #[serde(default = "default_start_index")]
    pub start_index: usize,

    /// Extension of renamed depth files, without the dot
    #[serde(default = "default_output_extension")]
    pub extension: String,
}

fn default_digits() -> usize {
    6
}

fn default_start_index() -> usize {
    1
}

fn default_output_extension() -> String {
    "png".to_string()
}

impl OutputConfig {
    /// File name for the color frame at `index` (0-based).
    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{:0width$}.{}",
            index + self.start_index,
            self.extension,
            width = self.digits
        )
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            digits: default_digits(),
            start_index: default_start_index(),
            extension: default_output_extension(),
        }
    }
}

/// Main configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub folders: FolderConfig,

    #[serde(default)]
    pub extensions: ExtensionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl SyncConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: SyncConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
