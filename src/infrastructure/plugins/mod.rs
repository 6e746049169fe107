//! Plugin discovery for legendary-bot
//! 
//! Plugins are statically compiled units registered in a [`PluginRegistry`].
//! A [`PluginSource`] decides which of them run: all built-ins, or the ones
//! declared by `plugin.yaml` manifests in the plugin directory.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use loader::{BuiltinSource, Discovered, ManifestSource, PluginSource};
pub use manifest::PluginManifest;
pub use registry::{PluginFactory, PluginRegistry};
