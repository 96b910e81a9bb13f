//! Upgrade command handler

use crate::command::CommandResult;
use crate::error::CommandError;
use crate::transport::DeviceConnection;
use chameleon_protocol::DeviceCommand;
use tracing::info;

/// Handle `upgrade`
///
/// On success the device drops into its bootloader and the shell session ends.
pub async fn handle_upgrade(conn: &mut dyn DeviceConnection) -> Result<CommandResult, CommandError> {
    let response = conn.action(DeviceCommand::Upgrade).await?;

    if response.is_success() {
        info!("Device entering upgrade mode");
        Ok(CommandResult::Terminate {
            message: "Device changed into Upgrade Mode".into(),
        })
    } else {
        Ok(CommandResult::Failed {
            message: format!("Entering upgrade mode failed: {}", response.status_text),
        })
    }
}
