//! Plugin trait definitions

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::application::errors::{DuplicateCommandError, LifecycleError};
use crate::application::services::{ItemCache, PollerDeps};
use crate::domain::entities::{Command, CommandTable};
use crate::domain::traits::{
    Bot, Diagnostics, GameApi, RankApi, SettingsReader, WatermarkStore,
};
use crate::infrastructure::config::Config;

/// Core plugin trait that all plugins must implement.
///
/// `stop` must undo everything `start` registered: commands go back out of
/// the table and pollers are shut down. The manager only warns about
/// leftovers, it does not clean up after a plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Entry name the plugin is registered under
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    async fn start(&self, ctx: &PluginContext) -> Result<(), LifecycleError>;

    async fn stop(&self, ctx: &PluginContext) -> Result<(), LifecycleError>;
}

/// Shared runtime services handed to every plugin
#[derive(Clone)]
pub struct Services {
    pub commands: Arc<CommandTable>,
    pub bot: Arc<dyn Bot>,
    pub settings: Arc<dyn SettingsReader>,
    pub api: Arc<dyn GameApi>,
    pub ranks: Arc<dyn RankApi>,
    pub watermarks: Arc<dyn WatermarkStore>,
    pub items: Arc<ItemCache>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub config: Arc<Config>,
}

impl Services {
    pub fn poller_deps(&self) -> PollerDeps {
        PollerDeps {
            bot: self.bot.clone(),
            settings: self.settings.clone(),
            api: self.api.clone(),
            watermarks: self.watermarks.clone(),
            items: self.items.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Something a plugin registered and must release on stop
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Command(String),
    Poller(String),
}

/// Per-plugin view of the runtime.
///
/// Registrations made through the context are recorded so the manager can
/// report leaks after `stop`.
#[derive(Clone)]
pub struct PluginContext {
    plugin_id: String,
    services: Services,
    ledger: Arc<Mutex<Vec<Resource>>>,
}

impl PluginContext {
    pub fn new(plugin_id: impl Into<String>, services: Services) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            services,
            ledger: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn config(&self) -> &Config {
        &self.services.config
    }

    pub fn register_command(
        &self,
        name: &str,
        command: Arc<dyn Command>,
    ) -> Result<(), DuplicateCommandError> {
        self.services.commands.register(name, command)?;
        self.record(Resource::Command(name.to_string()));
        Ok(())
    }

    pub fn unregister_command(&self, name: &str) -> bool {
        self.release(&Resource::Command(name.to_string()));
        self.services.commands.unregister(name)
    }

    pub fn track_poller(&self, guild_id: &str) {
        self.record(Resource::Poller(guild_id.to_string()));
    }

    pub fn release_poller(&self, guild_id: &str) {
        self.release(&Resource::Poller(guild_id.to_string()));
    }

    /// Resources recorded and not yet released
    pub fn resources(&self) -> Vec<Resource> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, resource: Resource) {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner).push(resource);
    }

    fn release(&self, resource: &Resource) {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|r| r != resource);
    }
}
