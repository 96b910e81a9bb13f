//! Command handlers for the device capabilities

mod info;
mod settable;
mod transfer;
mod upgrade;

pub use info::{handle_device_action, handle_version};
pub use settable::handle_setting;
pub use transfer::{handle_download, handle_upload};
pub use upgrade::handle_upgrade;
