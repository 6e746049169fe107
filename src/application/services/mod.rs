//! Application services - Background work and shared lookups

pub mod cache;
pub mod poller;

pub use cache::{CacheAside, Fetch, ItemCache, ItemFetcher};
pub use poller::{GuildPoller, PollerConfig, PollerDeps, PollerHandle, TickReport};
