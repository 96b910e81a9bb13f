//! Get/set capabilities bound to the shared response policy

use crate::command::policy;
use crate::command::request::Argument;
use crate::command::{Capability, CommandResult};
use crate::error::CommandError;
use crate::transport::DeviceConnection;

/// Handle UID, configuration, setting, buttons, LEDs, field, read-only,
/// log mode and threshold
pub async fn handle_setting(
    conn: &mut dyn DeviceConnection,
    capability: Capability,
    argument: &Argument,
) -> Result<CommandResult, CommandError> {
    let descriptor = capability.descriptor();
    Ok(policy::apply(conn, &descriptor, argument).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockDevice;
    use chameleon_protocol::{DeviceCommand, RequestLine, Response, StatusCode};

    #[tokio::test]
    async fn test_threshold_set_reads_back() {
        let device = MockDevice::new();
        device
            .respond(Response::status(StatusCode::Ok, "OK"))
            .respond(Response::with_text("400"));

        let mut conn = device.connection();
        let result = handle_setting(&mut conn, Capability::Threshold, &Argument::Set("400".into()))
            .await
            .unwrap();

        assert_eq!(result.message(), "Threshold has been set to 400");
        assert_eq!(
            device.requests(),
            vec![
                RequestLine::Set(DeviceCommand::Threshold, "400".into()),
                RequestLine::Query(DeviceCommand::Threshold),
            ]
        );
    }

    #[tokio::test]
    async fn test_log_mode_query() {
        let device = MockDevice::new();
        device.respond(Response::with_text("MEMORY"));

        let mut conn = device.connection();
        let result = handle_setting(&mut conn, Capability::LogMode, &Argument::Query)
            .await
            .unwrap();
        assert_eq!(result.message(), "Current log mode: MEMORY");
    }

    #[tokio::test]
    async fn test_link_failure_propagates() {
        let device = MockDevice::new();

        let mut conn = device.connection();
        let result = handle_setting(&mut conn, Capability::Field, &Argument::Query).await;
        assert!(matches!(result, Err(CommandError::Device(_))));
    }
}
