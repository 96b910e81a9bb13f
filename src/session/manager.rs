//! Session manager: one connection per command, opened and released around it

use crate::command::{self, CommandResult, Request};
use crate::error::CommandError;
use crate::transport::Connector;
use chameleon_protocol::state_machine::{LinkEvent, LinkPhase, LinkStateMachine, TransitionResult};
use tracing::{debug, info, warn};

/// Per-process shell session state
pub struct Session<C> {
    connector: C,
    /// Configured device endpoint (serial port path)
    endpoint: Option<String>,
    lifecycle: LinkStateMachine,
}

impl<C: Connector> Session<C> {
    /// Create a new session without an endpoint
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            endpoint: None,
            lifecycle: LinkStateMachine::new(),
        }
    }

    /// Set the device endpoint used by subsequent commands
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        info!("Device endpoint set to {} ({})", endpoint, self.connector.name());
        self.endpoint = Some(endpoint);
    }

    /// Get the configured endpoint
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> LinkPhase {
        self.lifecycle.phase()
    }

    fn transition(&mut self, event: LinkEvent) {
        match self.lifecycle.process_event(event) {
            TransitionResult::Success(phase) => debug!(?event, ?phase, "link transition"),
            TransitionResult::Invalid { from, event } => {
                warn!("Invalid link transition: {:?} on {:?}", event, from)
            }
        }
    }

    /// Connect, run one request, and disconnect
    ///
    /// The connection is released even when the handler fails.
    pub async fn run(&mut self, request: &Request) -> Result<CommandResult, CommandError> {
        self.transition(LinkEvent::ConnectRequested);

        let Some(endpoint) = self.endpoint.clone() else {
            self.transition(LinkEvent::ConnectFailed);
            return Err(CommandError::NoEndpoint);
        };

        let mut conn = match self.connector.open(&endpoint).await {
            Ok(conn) => conn,
            Err(e) => {
                self.transition(LinkEvent::ConnectFailed);
                return Err(CommandError::Connection(e));
            }
        };
        self.transition(LinkEvent::Opened);

        self.transition(LinkEvent::HandlerStarted);
        let result = command::execute(conn.as_mut(), request).await;
        self.transition(LinkEvent::HandlerFinished);

        let closed = conn.close().await;
        drop(conn);
        self.transition(LinkEvent::Closed);

        match (result, closed) {
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!("Failed to close {}: {}", endpoint, close_err);
                }
                Err(e)
            }
            (Ok(result), Ok(())) => Ok(result),
            (Ok(result), Err(close_err)) if result.is_terminal() => {
                debug!("Ignoring close failure after session end: {}", close_err);
                Ok(result)
            }
            (Ok(_), Err(close_err)) => Err(CommandError::Connection(close_err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Argument, Capability};
    use crate::transport::mock::MockDevice;
    use chameleon_protocol::{Response, StatusCode};

    #[tokio::test]
    async fn test_no_endpoint_never_contacts_device() {
        let device = MockDevice::new();
        let mut session = Session::new(device.clone());

        let result = session
            .run(&Request::Configure(Capability::Config, Argument::Query))
            .await;

        assert!(matches!(result, Err(CommandError::NoEndpoint)));
        assert!(device.opened().is_empty());
        assert!(device.requests().is_empty());
        assert_eq!(session.phase(), LinkPhase::Idle);
    }

    #[tokio::test]
    async fn test_connection_opened_and_closed_per_command() {
        let device = MockDevice::new();
        device
            .respond(Response::with_text("ChameleonMini RevG"))
            .respond(Response::with_text("ChameleonMini RevG"));
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyACM0");

        for _ in 0..2 {
            let result = session.run(&Request::Read(Capability::Info)).await.unwrap();
            assert_eq!(result.message(), "ChameleonMini RevG");
        }

        assert_eq!(device.opened(), vec!["/dev/ttyACM0", "/dev/ttyACM0"]);
        assert_eq!(device.closed(), 2);
        assert_eq!(session.phase(), LinkPhase::Idle);
    }

    #[tokio::test]
    async fn test_connection_released_after_handler_error() {
        let device = MockDevice::new();
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyACM0");

        // no scripted response: the link reports a disconnect
        let result = session.run(&Request::Action(Capability::Identify)).await;

        assert!(matches!(result, Err(CommandError::Device(_))));
        assert_eq!(device.closed(), 1);
        assert_eq!(session.phase(), LinkPhase::Idle);
    }

    #[tokio::test]
    async fn test_open_failure_is_connection_error() {
        let device = MockDevice::new();
        device.fail_open();
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyUSB9");

        let result = session.run(&Request::Read(Capability::Info)).await;

        assert!(matches!(result, Err(CommandError::Connection(_))));
        assert!(device.requests().is_empty());
        assert_eq!(device.closed(), 0);
        assert_eq!(session.phase(), LinkPhase::Idle);
    }

    #[tokio::test]
    async fn test_close_failure_is_surfaced() {
        let device = MockDevice::new();
        device
            .respond(Response::with_text("MF_ULTRALIGHT"))
            .fail_close();
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyACM0");

        let result = session
            .run(&Request::Configure(Capability::Config, Argument::Query))
            .await;

        assert!(matches!(result, Err(CommandError::Connection(_))));
    }

    #[tokio::test]
    async fn test_upgrade_terminates_even_if_close_fails() {
        let device = MockDevice::new();
        device
            .respond(Response::status(StatusCode::Ok, "OK"))
            .fail_close();
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyACM0");

        let result = session
            .run(&Request::Action(Capability::Upgrade))
            .await
            .unwrap();

        assert!(result.is_terminal());
    }

    #[tokio::test]
    async fn test_protocol_failure_is_not_an_error() {
        let device = MockDevice::new();
        device.respond(Response::status(StatusCode::InvalidParameter, "busy"));
        let mut session = Session::new(device.clone());
        session.set_endpoint("/dev/ttyACM0");

        let result = session
            .run(&Request::Configure(
                Capability::Config,
                Argument::Set("MF_CLASSIC_1K".into()),
            ))
            .await
            .unwrap();

        assert_eq!(
            result,
            CommandResult::Failed {
                message: "Changing configuration to MF_CLASSIC_1K failed: busy".into()
            }
        );
        assert_eq!(device.closed(), 1);
    }
}
