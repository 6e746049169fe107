//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database / Storage: Guild settings and watermarks (SQLite, memory)
//! - Battle.net / WowProgress: Remote game APIs
//! - Plugins: Plugin discovery
//! - Adapters: Chat transports

pub mod config;
pub mod database;
pub mod storage;
pub mod battlenet;
pub mod wowprogress;
pub mod diagnostics;
pub mod plugins;
pub mod adapters;
