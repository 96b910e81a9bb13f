//! Response-interpretation policy shared by every settable capability
//!
//! One argument decides one of three shapes:
//! - `Query`: fetch and show the current value
//! - `Suggest`: list the values the device accepts, in device order
//! - `Set`: apply, then re-query so the device's normalised value is shown

use super::capability::{CapabilityDescriptor, Phrasing};
use super::executor::CommandResult;
use super::request::Argument;
use crate::error::DeviceError;
use crate::transport::DeviceConnection;
use chameleon_protocol::Response;
use tracing::debug;

/// Run the query/suggest/set branch for one capability
pub async fn apply(
    conn: &mut dyn DeviceConnection,
    descriptor: &CapabilityDescriptor,
    argument: &Argument,
) -> Result<CommandResult, DeviceError> {
    match argument {
        Argument::Query => {
            let response = conn.query(descriptor.command).await?;
            Ok(CommandResult::Completed {
                message: render_current(descriptor, &response),
            })
        }
        Argument::Suggest => {
            let response = conn.suggest(descriptor.command).await?;
            Ok(render_suggestions(descriptor, &response))
        }
        Argument::Set(value) => {
            let response = conn.set(descriptor.command, value).await?;
            if !response.is_success() {
                return Ok(CommandResult::Failed {
                    message: render_set_failure(descriptor, value, &response),
                });
            }

            debug!(label = descriptor.label, "set applied, reading back");
            let confirmed = conn.query(descriptor.command).await?;
            Ok(CommandResult::Completed {
                message: render_set_success(descriptor, &confirmed),
            })
        }
    }
}

/// "Current <label>: <value>"
pub fn render_current(descriptor: &CapabilityDescriptor, response: &Response) -> String {
    format!("Current {}: {}", descriptor.label, response.response)
}

/// "Possible <label>s: a, b, c"
pub fn render_suggestions(descriptor: &CapabilityDescriptor, response: &Response) -> CommandResult {
    if !response.is_success() {
        return CommandResult::Failed {
            message: format!(
                "Listing possible {}s failed: {}",
                descriptor.label, response.status_text
            ),
        };
    }

    let list = response
        .suggestions
        .as_deref()
        .unwrap_or_default()
        .join(", ");
    CommandResult::Completed {
        message: format!("Possible {}s: {}", descriptor.label, list),
    }
}

pub fn render_set_success(descriptor: &CapabilityDescriptor, confirmed: &Response) -> String {
    let verb = match descriptor.phrasing {
        Phrasing::Set => "set",
        Phrasing::Change => "changed",
    };
    format!(
        "{} has been {} to {}",
        descriptor.title(),
        verb,
        confirmed.response
    )
}

pub fn render_set_failure(descriptor: &CapabilityDescriptor, value: &str, response: &Response) -> String {
    let verb = match descriptor.phrasing {
        Phrasing::Set => "Setting",
        Phrasing::Change => "Changing",
    };
    format!(
        "{} {} to {} failed: {}",
        verb, descriptor.label, value, response.status_text
    )
}
