//! Plugin system for legendary-bot
//! 
//! Plugins contribute commands and background pollers and are started and
//! stopped by the [`PluginManager`].

pub mod manager;
pub mod trait_def;
pub mod invasion;
pub mod wprank;
pub mod legendary;

pub use manager::{LoadReport, PluginInfo, PluginManager, PluginState, StartReport};
pub use trait_def::{Plugin, PluginContext, Resource, Services};
