use crate::heal::HealOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON configuration of the `heal_demo` tool.
#[derive(Debug, Deserialize)]
pub struct HealToolConfig {
    /// Image providing the texture.
    pub source: PathBuf,
    /// Image to retouch; also the size reference for the other inputs.
    pub destination: PathBuf,
    /// Opacity mask; black pixels are left alone.
    pub mask: PathBuf,
    /// Translation `[dx, dy]` applied when sampling the source patch.
    #[serde(default)]
    pub source_offset: [isize; 2],
    #[serde(default)]
    pub heal: HealOptions,
    pub output: HealOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct HealOutputConfig {
    #[serde(rename = "image")]
    pub image: PathBuf,
    #[serde(rename = "report_json")]
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<HealToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn parse_config(json: &str) -> Result<HealToolConfig, serde_json::Error> {
    serde_json::from_str(json)
}
