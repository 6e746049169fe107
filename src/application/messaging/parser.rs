//! Message parser - Splits chat text into a command name and arguments

/// A prefixed chat line split into tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Parses incoming chat text into commands
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message. Anything without the prefix is ordinary chat.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let cmd_text = text.trim_start().strip_prefix(self.command_prefix.as_str())?;
        // The name must follow the prefix directly
        if cmd_text.starts_with(char::is_whitespace) {
            return None;
        }

        let mut parts = cmd_text.split_whitespace();
        let name = parts.next()?.to_string();
        let args = parts.map(str::to_string).collect();

        Some(ParsedCommand { name, args })
    }
}
