use std::str::FromStr;

use thiserror::Error;

use crate::shared::demographics::{Target, TargetParseError};

/// Presentation-side requests delivered to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    TogglePlay,
    ToggleActive,
    SetTarget(Target),
    ClearTarget,
    SensorUnavailable,
    ShowStats,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (expected p, a, t AGE GENDER, c, u, s or q)")]
    Unknown(String),
    #[error("usage: t AGE GENDER")]
    MissingTarget,
    #[error(transparent)]
    Target(#[from] TargetParseError),
}

impl FromStr for ConsoleCommand {
    type Err = CommandParseError;

    /// Parses one interactive console line, e.g. `p`, `t 30 female`, `q`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(CommandParseError::Empty)?;

        let command = match head.to_ascii_lowercase().as_str() {
            "p" | "play" | "pause" => ConsoleCommand::TogglePlay,
            "a" | "active" => ConsoleCommand::ToggleActive,
            "c" | "clear" => ConsoleCommand::ClearTarget,
            "u" | "unavailable" => ConsoleCommand::SensorUnavailable,
            "s" | "stats" => ConsoleCommand::ShowStats,
            "q" | "quit" | "exit" => ConsoleCommand::Quit,
            "t" | "target" => {
                let rest: Vec<&str> = words.collect();
                let raw = match rest.as_slice() {
                    [] => return Err(CommandParseError::MissingTarget),
                    [single] => single.to_string(),
                    [age, gender] => format!("{age}:{gender}"),
                    _ => return Err(CommandParseError::MissingTarget),
                };
                ConsoleCommand::SetTarget(raw.parse()?)
            }
            other => return Err(CommandParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
