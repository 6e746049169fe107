//! Domain entities - Core business objects

pub mod user;
pub mod message;
pub mod command;
pub mod guild;
pub mod game;
pub mod schedule;

pub use user::Member;
pub use message::IncomingMessage;
pub use command::{Command, CommandContext, CommandTable};
pub use guild::GuildSettings;
pub use game::{CharacterFeed, FeedEvent, GuildRank, ItemInfo, ItemKey, Roster, RosterMember};
pub use schedule::{IntervalSchedule, Phase};
