//! Session management for the interactive shell
//!
//! This module handles:
//! - Holding the configured device endpoint
//! - Opening the device connection around each command
//! - Releasing the connection even when a command fails

mod manager;

pub use manager::Session;
