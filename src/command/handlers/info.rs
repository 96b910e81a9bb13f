//! Read-only queries and reader actions

use crate::command::{Capability, CommandResult};
use crate::error::CommandError;
use crate::transport::DeviceConnection;
use chameleon_protocol::{DeviceCommand, Response};

/// Handle `info`: firmware version string
pub async fn handle_version(conn: &mut dyn DeviceConnection) -> Result<CommandResult, CommandError> {
    let response = conn.query(DeviceCommand::Version).await?;
    Ok(render_text(Capability::Info, response))
}

/// Handle `getuid`, `identify` and `dumpmfu`
///
/// These drive the reader against a card in the field and report its answer.
pub async fn handle_device_action(
    conn: &mut dyn DeviceConnection,
    capability: Capability,
) -> Result<CommandResult, CommandError> {
    let response = conn.action(capability.descriptor().command).await?;
    Ok(render_text(capability, response))
}

fn render_text(capability: Capability, response: Response) -> CommandResult {
    if response.is_success() {
        CommandResult::Completed {
            message: response.response,
        }
    } else {
        CommandResult::Failed {
            message: format!(
                "{} failed: {}",
                capability.descriptor().title(),
                response.status_text
            ),
        }
    }
}
