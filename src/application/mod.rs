//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Cache-aside lookup and the per-guild poller
//! - Commands: Built-in runtime commands
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and dispatching

pub mod errors;
pub mod services;
pub mod messaging;
pub mod commands;
