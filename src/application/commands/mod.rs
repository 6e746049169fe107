//! Built-in commands, always available regardless of plugins

pub mod help;
pub mod reload;
pub mod settings;

use std::sync::{Arc, Weak};

use crate::application::errors::DuplicateCommandError;
use crate::domain::entities::CommandTable;
use crate::domain::traits::SettingsWriter;
use crate::plugins::PluginManager;

pub use help::HelpCommand;
pub use reload::ReloadCommand;
pub use settings::SetServerSettingCommand;

pub fn register_builtin_commands(
    commands: &Arc<CommandTable>,
    manager: Weak<PluginManager>,
    owner_id: Option<String>,
    settings: Arc<dyn SettingsWriter>,
) -> Result<(), DuplicateCommandError> {
    commands.register("help", Arc::new(HelpCommand::new(commands.clone())))?;
    commands.register("reload", Arc::new(ReloadCommand::new(manager, owner_id)))?;
    commands.register("setserversetting", Arc::new(SetServerSettingCommand::new(settings)))?;
    Ok(())
}
