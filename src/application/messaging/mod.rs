//! Message handling - Parsing and dispatching chat commands

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{DispatchOutcome, MessageDispatcher};
pub use parser::{MessageParser, ParsedCommand};
