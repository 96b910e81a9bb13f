//! Command executor - dispatches a decoded request to its handler

use super::capability::Capability;
use super::handlers;
use super::request::Request;
use crate::error::CommandError;
use crate::transport::DeviceConnection;
use tracing::debug;

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The device applied or answered the request
    Completed { message: String },
    /// The device reported a status outside the success set
    Failed { message: String },
    /// The command ends the interactive session
    Terminate { message: String },
}

impl CommandResult {
    /// Render-ready text
    pub fn message(&self) -> &str {
        match self {
            CommandResult::Completed { message }
            | CommandResult::Failed { message }
            | CommandResult::Terminate { message } => message,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandResult::Terminate { .. })
    }
}

/// Execute one request on an open connection
///
/// Exactly one handler runs; handlers never call each other.
pub async fn execute(
    conn: &mut dyn DeviceConnection,
    request: &Request,
) -> Result<CommandResult, CommandError> {
    debug!(?request, "executing");

    match request {
        Request::Read(Capability::Info) => handlers::handle_version(conn).await,
        Request::Read(cap) | Request::Action(cap) => match cap {
            Capability::Upgrade => handlers::handle_upgrade(conn).await,
            _ => handlers::handle_device_action(conn, *cap).await,
        },
        Request::Configure(cap, argument) => handlers::handle_setting(conn, *cap, argument).await,
        Request::Download(cap, path) => handlers::handle_download(conn, *cap, path).await,
        Request::Upload(cap, path) => handlers::handle_upload(conn, *cap, path).await,
    }
}
