//! Chameleon-Mini Protocol Types
//!
//! This crate provides the wire-level types shared by the shell and the
//! serial device link: status codes, device command words, the request line
//! format, response values, line framing and XMODEM block framing.

pub mod codec;
pub mod state_machine;
pub mod xmodem;

use std::fmt;

/// Argument marker that asks the device for the list of valid values
pub const SUGGEST_MARKER: &str = "??";

/// Argument marker that asks the device for the current value
pub const QUERY_MARKER: &str = "?";

/// Status codes the interpretation policy treats as "operation applied"
pub const STATUS_CODES_SUCCESS: [StatusCode; 4] = [
    StatusCode::Ok,
    StatusCode::OkWithText,
    StatusCode::False,
    StatusCode::True,
];

/// Timing parameters for the serial link
pub mod timing {
    /// Default serial baud rate
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;

    /// Response timeout for ordinary commands in milliseconds
    pub const RESPONSE_TIMEOUT_MS: u64 = 2000;

    /// Response timeout for commands that talk to a card in the field
    pub const READER_TIMEOUT_MS: u64 = 10_000;

    /// Timeout waiting for a single XMODEM control byte or block
    pub const XMODEM_BLOCK_TIMEOUT_MS: u64 = 3000;
}

/// Status code reported on the first line of every device response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    OkWithText,
    WaitingForXmodem,
    False,
    True,
    UnknownCommand,
    InvalidCommandUsage,
    InvalidParameter,
    Timeout,
    /// A code this crate has no name for
    Other(u16),
}

impl StatusCode {
    /// Numeric value as sent on the wire
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 100,
            StatusCode::OkWithText => 101,
            StatusCode::WaitingForXmodem => 110,
            StatusCode::False => 120,
            StatusCode::True => 121,
            StatusCode::UnknownCommand => 200,
            StatusCode::InvalidCommandUsage => 201,
            StatusCode::InvalidParameter => 202,
            StatusCode::Timeout => 203,
            StatusCode::Other(code) => code,
        }
    }

    /// Whether this status means the request was applied
    pub fn is_success(self) -> bool {
        STATUS_CODES_SUCCESS.contains(&self)
    }

    /// Whether a text line follows the status line
    pub fn has_text(self) -> bool {
        self == StatusCode::OkWithText
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        match code {
            100 => StatusCode::Ok,
            101 => StatusCode::OkWithText,
            110 => StatusCode::WaitingForXmodem,
            120 => StatusCode::False,
            121 => StatusCode::True,
            200 => StatusCode::UnknownCommand,
            201 => StatusCode::InvalidCommandUsage,
            202 => StatusCode::InvalidParameter,
            203 => StatusCode::Timeout,
            other => StatusCode::Other(other),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Command words understood by the device firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    Version,
    Config,
    Uid,
    ReadOnly,
    Upload,
    Download,
    LogDownload,
    Upgrade,
    Setting,
    LButton,
    LButtonLong,
    RButton,
    RButtonLong,
    LedGreen,
    LedRed,
    LogMode,
    GetUid,
    DumpMfu,
    Identify,
    Threshold,
    Field,
}

impl DeviceCommand {
    /// The command word as written on the serial line
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceCommand::Version => "VERSION",
            DeviceCommand::Config => "CONFIG",
            DeviceCommand::Uid => "UID",
            DeviceCommand::ReadOnly => "READONLY",
            DeviceCommand::Upload => "UPLOAD",
            DeviceCommand::Download => "DOWNLOAD",
            DeviceCommand::LogDownload => "LOGDOWNLOAD",
            DeviceCommand::Upgrade => "UPGRADE",
            DeviceCommand::Setting => "SETTING",
            DeviceCommand::LButton => "LBUTTON",
            DeviceCommand::LButtonLong => "LBUTTON_LONG",
            DeviceCommand::RButton => "RBUTTON",
            DeviceCommand::RButtonLong => "RBUTTON_LONG",
            DeviceCommand::LedGreen => "LEDGREEN",
            DeviceCommand::LedRed => "LEDRED",
            DeviceCommand::LogMode => "LOGMODE",
            DeviceCommand::GetUid => "GETUID",
            DeviceCommand::DumpMfu => "DUMP_MFU",
            DeviceCommand::Identify => "IDENTIFY",
            DeviceCommand::Threshold => "THRESHOLD",
            DeviceCommand::Field => "FIELD",
        }
    }

    /// Whether the command drives the reader front-end and may take a while
    pub fn uses_reader(self) -> bool {
        matches!(
            self,
            DeviceCommand::GetUid | DeviceCommand::DumpMfu | DeviceCommand::Identify
        )
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request line sent to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLine {
    /// `CMD?`
    Query(DeviceCommand),
    /// `CMD=value`
    Set(DeviceCommand, String),
    /// `CMD=?`
    Suggest(DeviceCommand),
    /// `CMD`
    Action(DeviceCommand),
}

impl RequestLine {
    /// The command this request addresses
    pub fn command(&self) -> DeviceCommand {
        match self {
            RequestLine::Query(cmd)
            | RequestLine::Set(cmd, _)
            | RequestLine::Suggest(cmd)
            | RequestLine::Action(cmd) => *cmd,
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestLine::Query(cmd) => write!(f, "{}?", cmd),
            RequestLine::Set(cmd, value) => write!(f, "{}={}", cmd, value),
            RequestLine::Suggest(cmd) => write!(f, "{}=?", cmd),
            RequestLine::Action(cmd) => write!(f, "{}", cmd),
        }
    }
}

/// Structured result of one device request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: StatusCode,
    pub status_text: String,
    pub response: String,
    pub suggestions: Option<Vec<String>>,
}

impl Response {
    /// Create a response carrying only a status line
    pub fn status(status_code: StatusCode, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            response: String::new(),
            suggestions: None,
        }
    }

    /// Create a 101 response carrying a text line
    pub fn with_text(response: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OkWithText,
            status_text: "OK WITH TEXT".into(),
            response: response.into(),
            suggestions: None,
        }
    }

    /// Turn this response into a suggestion result by splitting its text
    ///
    /// Order is kept as sent by the device; empty text yields an empty list.
    pub fn into_suggestions(mut self) -> Self {
        let list = self
            .response
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self.suggestions = Some(list);
        self
    }

    /// Whether the status code is in the success set
    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line_format() {
        assert_eq!(RequestLine::Query(DeviceCommand::Config).to_string(), "CONFIG?");
        assert_eq!(
            RequestLine::Set(DeviceCommand::LButtonLong, "CLONE".into()).to_string(),
            "LBUTTON_LONG=CLONE"
        );
        assert_eq!(RequestLine::Suggest(DeviceCommand::LedRed).to_string(), "LEDRED=?");
        assert_eq!(RequestLine::Action(DeviceCommand::DumpMfu).to_string(), "DUMP_MFU");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(StatusCode::from(101), StatusCode::OkWithText);
        assert_eq!(StatusCode::from(203), StatusCode::Timeout);
        assert_eq!(StatusCode::from(999), StatusCode::Other(999));
        assert_eq!(StatusCode::Other(999).code(), 999);
    }

    #[test]
    fn test_success_set() {
        assert!(StatusCode::Ok.is_success());
        assert!(StatusCode::False.is_success());
        assert!(StatusCode::True.is_success());
        assert!(!StatusCode::WaitingForXmodem.is_success());
        assert!(!StatusCode::InvalidParameter.is_success());
    }

    #[test]
    fn test_suggestions_keep_device_order() {
        let resp = Response::with_text("NONE,MF_ULTRALIGHT,MF_CLASSIC_1K").into_suggestions();
        assert_eq!(
            resp.suggestions.unwrap(),
            vec!["NONE", "MF_ULTRALIGHT", "MF_CLASSIC_1K"]
        );
    }

    #[test]
    fn test_empty_suggestions() {
        let resp = Response::with_text("").into_suggestions();
        assert_eq!(resp.suggestions, Some(Vec::new()));
    }
}
