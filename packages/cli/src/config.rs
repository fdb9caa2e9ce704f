use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_compiler_html::CompileOptions;
use strata_editor::EditorConfig;

pub const DEFAULT_CONFIG_NAME: &str = "strata.config.json";

/// Strata configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Store settings (`historyLimit`, `readOnly`)
    #[serde(flatten)]
    pub editor: EditorConfig,

    /// HTML export options
    pub export: CompileOptions,
}

impl Config {
    /// Load config from an explicit path, or from `cwd` if one exists there.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    // Return default config if none exists
                    return Ok(Config::default());
                }
                path
            }
        };

        Self::read(&config_path)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }
}
