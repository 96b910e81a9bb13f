//! Error types for the device link and command execution

use chameleon_protocol::codec::CodecError;
use chameleon_protocol::xmodem::XmodemError;
use chameleon_protocol::{DeviceCommand, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the device connection itself
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Cannot open {endpoint}: {reason}")]
    Open { endpoint: String, reason: String },

    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No response from device within {0:?}")]
    Timeout(Duration),

    #[error("Device closed the connection")]
    Disconnected,

    #[error("Protocol error: {0}")]
    Codec(#[from] CodecError),

    #[error("XMODEM error: {0}")]
    Xmodem(#[from] XmodemError),

    #[error("Device refused {command}: {status} {text}")]
    Refused {
        command: DeviceCommand,
        status: StatusCode,
        text: String,
    },
}

/// Failures of a single shell command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No device port set. Specify one first, for example: port /dev/ttyACM0")]
    NoEndpoint,

    #[error("Connection error: {0}")]
    Connection(#[source] DeviceError),

    #[error("{0}")]
    Device(#[from] DeviceError),

    #[error("Cannot access {}: {source}", path.display())]
    TransferIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
