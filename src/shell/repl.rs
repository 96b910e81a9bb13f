//! Interactive read-eval-print loop

use super::help;
use super::parser::{self, ShellLine};
use crate::command::CommandResult;
use crate::logging::LogControl;
use crate::session::Session;
use crate::transport::Connector;
use anyhow::Result;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

const PROMPT: &str = "Chameleon> ";
const FAREWELL: &str = "Bye!";

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print and read the next line
    Print(String),
    /// Print as an error and read the next line
    Error(String),
    /// Nothing to show
    Silent,
    /// Print and leave the loop
    Exit(String),
}

/// Interactive shell around a device session
pub struct Shell<C> {
    session: Session<C>,
    logging: Option<LogControl>,
}

impl<C: Connector> Shell<C> {
    pub fn new(session: Session<C>, logging: Option<LogControl>) -> Self {
        Self { session, logging }
    }

    /// Run until exit, end of input, or a session-ending command
    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        println!("{}", style("Chameleon-Mini interactive shell").bold().cyan());
        match self.session.endpoint() {
            Some(port) => println!("Device port: {}", port),
            None => println!(
                "{}",
                style("Set the device port first, for example: port /dev/ttyACM0").yellow()
            ),
        }
        println!("Type help for the command list");

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }

                    match self.handle_line(&line).await {
                        Outcome::Print(text) => println!("{}", text),
                        Outcome::Error(text) => println!("{}", style(text).red()),
                        Outcome::Silent => {}
                        Outcome::Exit(text) => {
                            println!("{}", text);
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{}", FAREWELL);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Evaluate one input line
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let parsed = match parser::parse(line) {
            Ok(parsed) => parsed,
            Err(e) => return Outcome::Error(e.to_string()),
        };

        match parsed {
            ShellLine::Empty => Outcome::Silent,
            ShellLine::Exit => Outcome::Exit(FAREWELL.into()),
            ShellLine::Port(None) => {
                Outcome::Error("Need a port, for example: port /dev/ttyACM0".into())
            }
            ShellLine::Port(Some(port)) => {
                let text = format!("Device port set to {}", port);
                self.session.set_endpoint(port);
                Outcome::Print(text)
            }
            ShellLine::Verbose => self.toggle_verbose(),
            ShellLine::Help(None) => Outcome::Print(help::overview()),
            ShellLine::Help(Some(word)) => match help::for_command(&word) {
                Some(text) => Outcome::Print(text),
                None => Outcome::Error(format!("No help for {}", word)),
            },
            ShellLine::Shell(cmd) => run_shell(&cmd).await,
            ShellLine::Device(request) => match self.session.run(&request).await {
                Ok(CommandResult::Terminate { message }) => Outcome::Exit(message),
                Ok(CommandResult::Completed { message }) => Outcome::Print(message),
                Ok(CommandResult::Failed { message }) => Outcome::Error(message),
                Err(e) => {
                    debug!(command = request.capability().word(), error = ?e, "command failed");
                    Outcome::Error(e.to_string())
                }
            },
        }
    }

    fn toggle_verbose(&mut self) -> Outcome {
        let Some(logging) = self.logging.as_mut() else {
            return Outcome::Error("Verbose output is not available".into());
        };

        match logging.toggle() {
            Ok(true) => Outcome::Print("Verbose output enabled".into()),
            Ok(false) => Outcome::Print("Verbose output disabled".into()),
            Err(e) => {
                warn!("Failed to change log filter: {}", e);
                Outcome::Error(format!("Changing verbose output failed: {}", e))
            }
        }
    }
}

/// Run `cmd` through `sh -c` and collect its output
async fn run_shell(cmd: &str) -> Outcome {
    debug!("Running shell command: {}", cmd);

    let output = match tokio::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => return Outcome::Error(format!("Running {} failed: {}", cmd, e)),
    };

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let text = text.trim_end().to_string();

    if output.status.success() {
        if text.is_empty() {
            Outcome::Silent
        } else {
            Outcome::Print(text)
        }
    } else if text.is_empty() {
        Outcome::Error(format!("{} exited with {}", cmd, output.status))
    } else {
        Outcome::Error(text)
    }
}
