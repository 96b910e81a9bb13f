pub mod link;
#[cfg(test)]
pub mod mock;
pub mod serial;
pub mod traits;

pub use link::{ChameleonLink, LinkTimeouts};
pub use serial::{SerialConfig, SerialConnector};
pub use traits::{ByteSink, ByteSource, Connector, DeviceConnection};
