//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Remote lookup failed: {0}")]
    Remote(#[from] RemoteFetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<BotError> for CommandError {
    fn from(err: BotError) -> Self {
        CommandError::Transport(err.to_string())
    }
}

/// Registration of a command name that is already taken
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Command '{0}' is already registered")]
pub struct DuplicateCommandError(pub String);

/// A plugin could not be discovered or constructed
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Missing manifest in {0}")]
    MissingManifest(String),

    #[error("Bad manifest {path}: {reason}")]
    BadManifest { path: String, reason: String },

    #[error("Unknown plugin entry '{entry}' requested by '{id}'")]
    UnknownEntry { id: String, entry: String },

    #[error("Plugin '{0}' is already loaded")]
    Duplicate(String),

    #[error("Failed to read plugin source: {0}")]
    Source(String),
}

/// A plugin start/stop hook failed
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Plugin '{0}' not found")]
    NotFound(String),

    #[error("Plugin '{id}' cannot {action} while {state}")]
    InvalidState {
        id: String,
        action: &'static str,
        state: String,
    },

    #[error(transparent)]
    Duplicate(#[from] DuplicateCommandError),

    #[error("Hook failed: {0}")]
    Hook(String),

    #[error("Hook panicked: {0}")]
    Panicked(String),
}

/// Network or decoding failure against an upstream API
#[derive(Error, Debug)]
pub enum RemoteFetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Unparsable response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RemoteFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteFetchError::Parse(err.to_string())
        } else {
            RemoteFetchError::Request(err.to_string())
        }
    }
}

/// Reasons a poller tick is abandoned
#[derive(Error, Debug)]
pub enum PollerError {
    #[error("Guild is missing setting: {0}")]
    ConfigurationIncomplete(&'static str),

    #[error("Notification channel '{0}' cannot be resolved")]
    ChannelResolution(String),

    #[error(transparent)]
    Remote(#[from] RemoteFetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Tick panicked: {0}")]
    Panicked(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
