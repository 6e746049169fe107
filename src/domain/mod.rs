//! Domain layer - Core business logic
//! 
//! This layer contains:
//! - Entities: Core business objects (Member, IncomingMessage, Command, GuildSettings)
//! - Traits: Abstractions for the collaborators (Bot, settings, watermarks, game APIs)

pub mod entities;
pub mod traits;
