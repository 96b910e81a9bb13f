//! Serial transport implementation for USB-CDC attached devices

use crate::error::DeviceError;
use crate::transport::link::{ChameleonLink, LinkTimeouts};
use crate::transport::traits::{Connector, DeviceConnection};
use async_trait::async_trait;
use chameleon_protocol::timing;
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

/// Configuration for the serial connector
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (ignored by USB-CDC devices but required by the port API)
    pub baud_rate: u32,
    /// Read timeouts applied by the protocol link
    pub timeouts: LinkTimeouts,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: timing::DEFAULT_BAUD_RATE,
            timeouts: LinkTimeouts::default(),
        }
    }
}

impl SerialConfig {
    /// Override the ordinary and reader response timeouts
    pub fn with_timeouts(mut self, response: Duration, reader: Duration) -> Self {
        self.timeouts.response = response;
        self.timeouts.reader = reader;
        self
    }
}

/// Serial connector opening one port per command
pub struct SerialConnector {
    config: SerialConfig,
}

impl SerialConnector {
    /// Create a new serial connector
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for SerialConnector {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn DeviceConnection>, DeviceError> {
        debug!(endpoint, baud = self.config.baud_rate, "opening serial port");

        let stream = tokio_serial::new(endpoint, self.config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| DeviceError::Open {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Box::new(ChameleonLink::new(stream, self.config.timeouts)))
    }

    fn name(&self) -> &'static str {
        "Serial"
    }
}
