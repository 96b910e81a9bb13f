//! Command dispatch and response interpretation
//!
//! This module handles:
//! - Mapping shell command words to device capabilities
//! - Decoding the free-form argument into a typed request
//! - Dispatching to the capability's handler
//! - Rendering device responses as text

mod capability;
mod executor;
pub mod handlers;
pub mod policy;
mod request;

pub use capability::{Capability, CapabilityDescriptor, CapabilityKind, Phrasing};
pub use executor::{execute, CommandResult};
pub use request::{Argument, Request, RequestError};
