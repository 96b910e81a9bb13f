//! Shell line parser
//!
//! The first whitespace-separated word selects the command, case sensitive.
//! Everything after it, trimmed, is the argument.

use crate::command::{Capability, Request, RequestError};
use thiserror::Error;

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellLine {
    /// `port [path]`
    Port(Option<String>),
    /// `verbose`
    Verbose,
    /// `help [command]`
    Help(Option<String>),
    /// `shell <cmd>`
    Shell(String),
    /// `exit`, `x`, `q`
    Exit,
    /// Blank line
    Empty,
    /// Anything addressed to the device
    Device(Request),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: {0}. Type help for a list of commands")]
    UnknownCommand(String),

    #[error("shell needs a command line, for example: shell ls -l")]
    MissingShellCommand,

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Split a line into its command word and optional argument
fn split(line: &str) -> (&str, Option<&str>) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => {
            let rest = rest.trim();
            (word, (!rest.is_empty()).then_some(rest))
        }
        None => (line, None),
    }
}

/// Parse one input line
pub fn parse(line: &str) -> Result<ShellLine, ParseError> {
    let (word, argument) = split(line);

    let parsed = match word {
        "" => ShellLine::Empty,
        "port" => ShellLine::Port(argument.map(String::from)),
        "verbose" => ShellLine::Verbose,
        "help" => ShellLine::Help(argument.map(String::from)),
        "shell" => match argument {
            Some(cmd) => ShellLine::Shell(cmd.to_string()),
            None => return Err(ParseError::MissingShellCommand),
        },
        "exit" | "x" | "q" => ShellLine::Exit,
        other => {
            let capability = Capability::from_word(other)
                .ok_or_else(|| ParseError::UnknownCommand(other.to_string()))?;
            ShellLine::Device(Request::new(capability, argument)?)
        }
    };

    Ok(parsed)
}
