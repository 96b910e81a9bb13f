//! Decoded command requests
//!
//! The raw argument text is interpreted exactly once, here, so handlers
//! never look at the string again.

use super::capability::{Capability, CapabilityKind};
use chameleon_protocol::{QUERY_MARKER, SUGGEST_MARKER};
use std::path::PathBuf;
use thiserror::Error;

/// What a settable command was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Show the current value
    Query,
    /// List the valid values
    Suggest,
    /// Change the value
    Set(String),
}

impl Argument {
    /// Classify free-form argument text
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Argument::Query,
            Some(QUERY_MARKER) => Argument::Query,
            Some(SUGGEST_MARKER) => Argument::Suggest,
            Some(value) => Argument::Set(value.to_string()),
        }
    }
}

/// A device command ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Pure query, argument ignored
    Read(Capability),
    /// Fire-and-report action, argument ignored
    Action(Capability),
    /// Query, suggest or set through the shared policy
    Configure(Capability, Argument),
    /// Device image into a local file
    Download(Capability, PathBuf),
    /// Local file into the device
    Upload(Capability, PathBuf),
}

/// Argument problems detected before any device contact
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("{0} needs a file path, for example: {0} card.dump")]
    MissingPath(&'static str),
}

impl Request {
    /// Build the request for `capability` from its raw argument text
    pub fn new(capability: Capability, raw: Option<&str>) -> Result<Self, RequestError> {
        let request = match capability.kind() {
            CapabilityKind::Read => Request::Read(capability),
            CapabilityKind::Action => Request::Action(capability),
            CapabilityKind::Settable => Request::Configure(capability, Argument::parse(raw)),
            CapabilityKind::Download => Request::Download(capability, required_path(capability, raw)?),
            CapabilityKind::Upload => Request::Upload(capability, required_path(capability, raw)?),
        };
        Ok(request)
    }

    /// The capability this request addresses
    pub fn capability(&self) -> Capability {
        match self {
            Request::Read(cap)
            | Request::Action(cap)
            | Request::Configure(cap, _)
            | Request::Download(cap, _)
            | Request::Upload(cap, _) => *cap,
        }
    }
}

fn required_path(capability: Capability, raw: Option<&str>) -> Result<PathBuf, RequestError> {
    match raw.map(str::trim) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(RequestError::MissingPath(capability.word())),
    }
}
