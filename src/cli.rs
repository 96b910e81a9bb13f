//! Command line arguments

use crate::transport::SerialConfig;
use chameleon_protocol::timing;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "chameleon-shell", version, about = "Interactive shell for Chameleon-Mini devices")]
pub struct Args {
    /// Serial port of the device, for example /dev/ttyACM0
    #[arg(short, long)]
    pub port: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value_t = timing::DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Response timeout for ordinary commands in milliseconds
    #[arg(long, default_value_t = timing::RESPONSE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Response timeout for reader commands (getuid, identify, dumpmfu) in milliseconds
    #[arg(long, default_value_t = timing::READER_TIMEOUT_MS)]
    pub reader_timeout_ms: u64,

    /// Start with debug output of the device traffic
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            baud_rate: self.baud,
            ..SerialConfig::default()
        }
        .with_timeouts(
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.reader_timeout_ms),
        )
    }
}
