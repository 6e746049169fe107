//! Plugin loader - Discovers the plugins to run

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::errors::LoadError;
use crate::plugins::Plugin;
use super::manifest::{PluginManifest, MANIFEST_FILE};
use super::registry::PluginRegistry;

/// A constructed, not yet started plugin
pub struct Discovered {
    pub id: String,
    pub plugin: Arc<dyn Plugin>,
}

/// Where the plugin manager finds its plugins.
///
/// One entry per candidate: a bad candidate is an `Err` and does not stop
/// the scan.
pub trait PluginSource: Send + Sync {
    fn discover(&self) -> Vec<Result<Discovered, LoadError>>;
}

/// Every registry entry, or the configured subset of it
pub struct BuiltinSource {
    registry: Arc<PluginRegistry>,
    enabled: Vec<String>,
}

impl BuiltinSource {
    /// An empty `enabled` list means all entries
    pub fn new(registry: Arc<PluginRegistry>, enabled: Vec<String>) -> Self {
        Self { registry, enabled }
    }
}

impl PluginSource for BuiltinSource {
    fn discover(&self) -> Vec<Result<Discovered, LoadError>> {
        let entries = if self.enabled.is_empty() {
            self.registry.names()
        } else {
            self.enabled.clone()
        };

        entries
            .into_iter()
            .map(|entry| match self.registry.create(&entry) {
                Some(plugin) => Ok(Discovered { id: entry, plugin }),
                None => Err(LoadError::UnknownEntry {
                    id: entry.clone(),
                    entry,
                }),
            })
            .collect()
    }
}

/// Plugins declared by `<dir>/<plugin>/plugin.yaml` manifests
pub struct ManifestSource {
    plugin_dir: PathBuf,
    registry: Arc<PluginRegistry>,
}

impl ManifestSource {
    pub fn new(plugin_dir: impl Into<PathBuf>, registry: Arc<PluginRegistry>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            registry,
        }
    }

    /// Load a single plugin from a directory. `Ok(None)` when disabled.
    pub fn load_plugin(&self, path: impl AsRef<Path>) -> Result<Option<Discovered>, LoadError> {
        let path = path.as_ref();

        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(LoadError::MissingManifest(path.display().to_string()));
        }

        let manifest = PluginManifest::from_file(&manifest_path)?;
        if !manifest.enabled {
            tracing::info!(plugin = %manifest.id, "Plugin disabled by manifest");
            return Ok(None);
        }

        let plugin = self
            .registry
            .create(&manifest.entry)
            .ok_or_else(|| LoadError::UnknownEntry {
                id: manifest.id.clone(),
                entry: manifest.entry.clone(),
            })?;

        tracing::info!(
            plugin = %manifest.id,
            entry = %manifest.entry,
            version = manifest.version.as_deref().unwrap_or("-"),
            "Discovered plugin"
        );

        Ok(Some(Discovered {
            id: manifest.id,
            plugin,
        }))
    }
}

impl PluginSource for ManifestSource {
    fn discover(&self) -> Vec<Result<Discovered, LoadError>> {
        if !self.plugin_dir.exists() {
            tracing::warn!("Plugin directory does not exist: {}", self.plugin_dir.display());
            return Vec::new();
        }

        let entries = match std::fs::read_dir(&self.plugin_dir) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(LoadError::Source(format!(
                    "Failed to read plugin directory {}: {}",
                    self.plugin_dir.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            // Skip hidden directories
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }
            paths.push(path);
        }
        paths.sort();

        paths
            .iter()
            .filter_map(|path| self.load_plugin(path).transpose())
            .collect()
    }
}
