//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod store;
pub mod game_api;
pub mod diagnostics;

pub use bot::{Bot, BotInfo};
pub use store::{SettingsReader, SettingsWriter, WatermarkKey, WatermarkStore};
pub use game_api::{GameApi, RankApi};
pub use diagnostics::Diagnostics;
