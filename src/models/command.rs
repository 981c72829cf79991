use std::fmt;
use std::str::FromStr;

use super::chat::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(UserId),
    Send(String),
    Refresh,
    Close,
    Help,
    Quit,
}

pub const HELP: &str =
    "Commands:\n  list            show conversations\n  open <user_id>  open a conversation\n  send <text>     send a message to the open conversation\n  refresh         reload the open conversation\n  close           close the open conversation\n  help            show this help\n  quit            exit";

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCommandError {
    message: String,
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_start();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "list" | "ls" => Ok(Command::List),
            "open" => {
                let id = rest.trim();
                id.parse::<UserId>()
                    .map(Command::Open)
                    .map_err(|_| ParseCommandError {
                        message: format!("Invalid user id: '{}'", id),
                    })
            }
            // The text is passed through untouched; the composer decides what counts as empty.
            "send" => Ok(Command::Send(rest.to_string())),
            "refresh" => Ok(Command::Refresh),
            "close" | "back" => Ok(Command::Close),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ =>
                Err(ParseCommandError {
                    message: format!("Unknown command: '{}'. Type 'help' for a list.", word),
                }),
        }
    }
}
