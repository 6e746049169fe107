//! Plugin registry - Statically known plugin factories

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::LoadError;
use crate::plugins::invasion::InvasionPlugin;
use crate::plugins::legendary::LegendaryCheckPlugin;
use crate::plugins::wprank::WpRankPlugin;
use crate::plugins::Plugin;

/// Builds a fresh plugin instance
pub type PluginFactory = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Registry of plugin factories keyed by entry name.
///
/// Reload rebuilds every plugin from here, so a restarted plugin never sees
/// state left over from its previous run.
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every plugin shipped with the bot
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, PluginFactory); 3] = [
            ("invasion", Arc::new(|| Arc::new(InvasionPlugin::new()) as Arc<dyn Plugin>)),
            ("wprank", Arc::new(|| Arc::new(WpRankPlugin::new()) as Arc<dyn Plugin>)),
            ("legendarycheck", Arc::new(|| Arc::new(LegendaryCheckPlugin::new()) as Arc<dyn Plugin>)),
        ];
        for (entry, factory) in builtins {
            registry.factories.insert(entry.to_string(), factory);
        }
        registry
    }

    pub fn register(&mut self, entry: impl Into<String>, factory: PluginFactory) -> Result<(), LoadError> {
        let entry = entry.into();
        if self.factories.contains_key(&entry) {
            return Err(LoadError::Duplicate(entry));
        }
        self.factories.insert(entry, factory);
        Ok(())
    }

    /// Build a new instance of an entry
    pub fn create(&self, entry: &str) -> Option<Arc<dyn Plugin>> {
        self.factories.get(entry).map(|factory| factory())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.factories.contains_key(entry)
    }

    /// Entry names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
