//! Plugin manager - handles plugin lifecycle
//!
//! Per plugin state machine:
//!
//! ```text
//! Discovered -> Started -> Stopped -> Started ...
//!      any state -> Failed (hook error)      any state -> removed (unload)
//! ```
//!
//! Lifecycle operations are serialized by one async mutex; command dispatch
//! never takes it.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::application::errors::{LifecycleError, LoadError};
use crate::infrastructure::plugins::PluginSource;
use crate::plugins::trait_def::{Plugin, PluginContext, Resource, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PluginState {
    Discovered,
    Started,
    Stopped,
    Failed,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            PluginState::Discovered => "discovered",
            PluginState::Started => "started",
            PluginState::Stopped => "stopped",
            PluginState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// A plugin known to the manager
struct PluginDescriptor {
    id: String,
    state: PluginState,
    plugin: Arc<dyn Plugin>,
    context: PluginContext,
    last_error: Option<String>,
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub state: PluginState,
    pub last_error: Option<String>,
    pub resources: usize,
}

/// Outcome of a discovery scan
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadError>,
}

/// Outcome of starting several plugins
#[derive(Debug, Default)]
pub struct StartReport {
    pub started: Vec<String>,
    pub failures: Vec<(String, LifecycleError)>,
}

#[derive(Clone, Copy)]
enum Hook {
    Start,
    Stop,
}

impl Hook {
    fn as_str(self) -> &'static str {
        match self {
            Hook::Start => "start",
            Hook::Stop => "stop",
        }
    }
}

/// Manages all plugins for the bot
pub struct PluginManager {
    source: Arc<dyn PluginSource>,
    services: Services,
    plugins: Mutex<Vec<PluginDescriptor>>,
}

impl PluginManager {
    pub fn new(source: Arc<dyn PluginSource>, services: Services) -> Self {
        Self {
            source,
            services,
            plugins: Mutex::new(Vec::new()),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Scan the source and add a descriptor per new plugin. Nothing is started.
    pub async fn load_all(&self) -> LoadReport {
        let mut plugins = self.plugins.lock().await;
        self.load_locked(&mut plugins)
    }

    fn load_locked(&self, plugins: &mut Vec<PluginDescriptor>) -> LoadReport {
        let mut report = LoadReport::default();

        for result in self.source.discover() {
            let discovered = match result {
                Ok(d) => d,
                Err(e) => {
                    warn!(error = %e, "Failed to load plugin");
                    report.failures.push(e);
                    continue;
                }
            };

            if plugins.iter().any(|p| p.id == discovered.id) {
                let err = LoadError::Duplicate(discovered.id);
                warn!(error = %err, "Failed to load plugin");
                report.failures.push(err);
                continue;
            }

            info!(plugin = %discovered.id, "Loaded plugin: {}", discovered.plugin.name());
            report.loaded.push(discovered.id.clone());
            plugins.push(PluginDescriptor {
                context: PluginContext::new(discovered.id.clone(), self.services.clone()),
                id: discovered.id,
                state: PluginState::Discovered,
                plugin: discovered.plugin,
                last_error: None,
            });
        }

        report
    }

    /// Start every plugin that is not running and has not failed
    pub async fn start_all(&self) -> StartReport {
        let mut plugins = self.plugins.lock().await;
        self.start_all_locked(&mut plugins).await
    }

    async fn start_all_locked(&self, plugins: &mut [PluginDescriptor]) -> StartReport {
        let mut report = StartReport::default();
        for descriptor in plugins.iter_mut() {
            if !matches!(descriptor.state, PluginState::Discovered | PluginState::Stopped) {
                continue;
            }
            match self.start_descriptor(descriptor).await {
                Ok(()) => report.started.push(descriptor.id.clone()),
                Err(e) => report.failures.push((descriptor.id.clone(), e)),
            }
        }
        report
    }

    pub async fn start(&self, id: &str) -> Result<(), LifecycleError> {
        let mut plugins = self.plugins.lock().await;
        let descriptor = find(&mut plugins, id)?;

        if !matches!(descriptor.state, PluginState::Discovered | PluginState::Stopped) {
            return Err(LifecycleError::InvalidState {
                id: id.to_string(),
                action: "start",
                state: descriptor.state.to_string(),
            });
        }
        self.start_descriptor(descriptor).await
    }

    async fn start_descriptor(&self, descriptor: &mut PluginDescriptor) -> Result<(), LifecycleError> {
        match self.run_hook(descriptor, Hook::Start).await {
            Ok(()) => {
                descriptor.state = PluginState::Started;
                descriptor.last_error = None;
                info!(plugin = %descriptor.id, "Plugin started");
                Ok(())
            }
            Err(e) => {
                // A failed plugin must not stay reachable through commands it
                // managed to register before failing.
                for resource in descriptor.context.resources() {
                    if let Resource::Command(name) = resource {
                        descriptor.context.unregister_command(&name);
                    }
                }
                self.fail(descriptor, Hook::Start, &e);
                Err(e)
            }
        }
    }

    /// Stop every started plugin, last started first
    pub async fn stop_all(&self) -> Vec<(String, LifecycleError)> {
        let mut plugins = self.plugins.lock().await;
        self.stop_all_locked(&mut plugins).await
    }

    async fn stop_all_locked(&self, plugins: &mut [PluginDescriptor]) -> Vec<(String, LifecycleError)> {
        let mut failures = Vec::new();
        for descriptor in plugins.iter_mut().rev() {
            if descriptor.state != PluginState::Started {
                continue;
            }
            if let Err(e) = self.stop_descriptor(descriptor).await {
                failures.push((descriptor.id.clone(), e));
            }
        }
        failures
    }

    /// Stop a plugin. Stopping a plugin that is not running does nothing.
    pub async fn stop(&self, id: &str) -> Result<(), LifecycleError> {
        let mut plugins = self.plugins.lock().await;
        let descriptor = find(&mut plugins, id)?;
        if descriptor.state != PluginState::Started {
            return Ok(());
        }
        self.stop_descriptor(descriptor).await
    }

    async fn stop_descriptor(&self, descriptor: &mut PluginDescriptor) -> Result<(), LifecycleError> {
        let result = self.run_hook(descriptor, Hook::Stop).await;

        let leaked = descriptor.context.resources();
        if !leaked.is_empty() {
            warn!(plugin = %descriptor.id, ?leaked, "Plugin left registrations behind after stop");
        }

        match result {
            Ok(()) => {
                descriptor.state = PluginState::Stopped;
                info!(plugin = %descriptor.id, "Plugin stopped");
                Ok(())
            }
            Err(e) => {
                self.fail(descriptor, Hook::Stop, &e);
                Err(e)
            }
        }
    }

    /// Stop (if started) and forget a plugin
    pub async fn unload(&self, id: &str) -> Result<(), LifecycleError> {
        let mut plugins = self.plugins.lock().await;
        let index = plugins
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LifecycleError::NotFound(id.to_string()))?;

        let stop_result = if plugins[index].state == PluginState::Started {
            self.stop_descriptor(&mut plugins[index]).await
        } else {
            Ok(())
        };

        plugins.remove(index);
        info!(plugin = %id, "Unloaded plugin");
        stop_result
    }

    /// Stop everything, rebuild every plugin from the source and start them.
    ///
    /// Not transactional: plugins that fail to start stay `Failed` while the
    /// others run.
    pub async fn reload(&self) -> (LoadReport, StartReport) {
        let mut plugins = self.plugins.lock().await;
        info!(plugins = plugins.len(), "Reloading plugins");

        for (id, e) in self.stop_all_locked(&mut plugins).await {
            warn!(plugin = %id, error = %e, "Plugin failed to stop during reload");
        }
        plugins.clear();

        let load = self.load_locked(&mut plugins);
        let start = self.start_all_locked(&mut plugins).await;
        info!(
            loaded = load.loaded.len(),
            started = start.started.len(),
            failed = load.failures.len() + start.failures.len(),
            "Plugins reloaded"
        );
        (load, start)
    }

    pub async fn state(&self, id: &str) -> Option<PluginState> {
        let plugins = self.plugins.lock().await;
        plugins.iter().find(|p| p.id == id).map(|p| p.state)
    }

    /// List all known plugins
    pub async fn list_plugins(&self) -> Vec<PluginInfo> {
        let plugins = self.plugins.lock().await;
        plugins
            .iter()
            .map(|p| PluginInfo {
                id: p.id.clone(),
                name: p.plugin.name().to_string(),
                description: p.plugin.description().to_string(),
                state: p.state,
                last_error: p.last_error.clone(),
                resources: p.context.resources().len(),
            })
            .collect()
    }

    /// Run a hook on its own task so a panic is contained
    async fn run_hook(&self, descriptor: &PluginDescriptor, hook: Hook) -> Result<(), LifecycleError> {
        let plugin = descriptor.plugin.clone();
        let ctx = descriptor.context.clone();

        let handle = tokio::spawn(async move {
            match hook {
                Hook::Start => plugin.start(&ctx).await,
                Hook::Stop => plugin.stop(&ctx).await,
            }
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => Err(LifecycleError::Panicked(e.to_string())),
        }
    }

    fn fail(&self, descriptor: &mut PluginDescriptor, hook: Hook, err: &LifecycleError) {
        error!(plugin = %descriptor.id, hook = hook.as_str(), error = %err, "Plugin lifecycle hook failed");
        self.services.diagnostics.report(
            err,
            &[("plugin", descriptor.id.clone()), ("hook", hook.as_str().to_string())],
        );
        descriptor.state = PluginState::Failed;
        descriptor.last_error = Some(err.to_string());
    }
}

fn find<'a>(plugins: &'a mut [PluginDescriptor], id: &str) -> Result<&'a mut PluginDescriptor, LifecycleError> {
    plugins
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| LifecycleError::NotFound(id.to_string()))
}
