//! Device connection contract consumed by the command handlers

use crate::error::DeviceError;
use async_trait::async_trait;
use chameleon_protocol::{DeviceCommand, Response};
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte sink for download-style transfers
pub type ByteSink<'a> = dyn AsyncWrite + Send + Unpin + 'a;

/// Byte source for upload-style transfers
pub type ByteSource<'a> = dyn AsyncRead + Send + Unpin + 'a;

/// An open connection to a device
///
/// One request is in flight at a time; every method waits for the complete
/// response before returning.
#[async_trait]
pub trait DeviceConnection: Send {
    /// Ask for the current value (`CMD?`)
    async fn query(&mut self, command: DeviceCommand) -> Result<Response, DeviceError>;

    /// Change a value (`CMD=value`)
    async fn set(&mut self, command: DeviceCommand, value: &str) -> Result<Response, DeviceError>;

    /// Ask for the valid values (`CMD=?`); the result carries `suggestions`
    async fn suggest(&mut self, command: DeviceCommand) -> Result<Response, DeviceError>;

    /// Fire a command without argument (`CMD`) and report its result
    async fn action(&mut self, command: DeviceCommand) -> Result<Response, DeviceError>;

    /// Receive a binary image from the device into `sink`
    async fn transfer_out(
        &mut self,
        command: DeviceCommand,
        sink: &mut ByteSink<'_>,
    ) -> Result<u64, DeviceError>;

    /// Send a binary image from `source` to the device
    async fn transfer_in(
        &mut self,
        command: DeviceCommand,
        source: &mut ByteSource<'_>,
    ) -> Result<u64, DeviceError>;

    /// Release the connection
    async fn close(&mut self) -> Result<(), DeviceError>;
}

/// Factory for device connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Attempt to open the endpoint, returning a connection on success
    async fn open(&self, endpoint: &str) -> Result<Box<dyn DeviceConnection>, DeviceError>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
