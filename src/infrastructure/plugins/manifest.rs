//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use crate::application::errors::LoadError;

/// File name expected in every plugin directory
pub const MANIFEST_FILE: &str = "plugin.yaml";

/// Plugin metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    /// Plugin id (required)
    pub id: String,

    /// Registry entry implementing the plugin (required)
    pub entry: String,

    /// Plugin version
    pub version: Option<String>,

    /// Plugin description
    pub description: Option<String>,

    /// Disabled plugins are skipped at discovery
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::BadManifest {
            path: path.display().to_string(),
            reason: format!("Failed to read manifest: {}", e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| LoadError::BadManifest {
            path: path.display().to_string(),
            reason: format!("Failed to parse manifest: {}", e),
        })
    }
}
