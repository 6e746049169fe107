//! legendary-bot - plugin-driven chat bot watching World of Warcraft guilds

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
