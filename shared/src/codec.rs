//! Line codec for the device's text protocol
//!
//! Requests are single lines terminated by CRLF. Responses are framed as:
//! ```text
//! NNN:STATUS TEXT\r\n
//! [ response text\r\n ]      (only after status 101)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tracing::trace;

use crate::{RequestLine, Response, StatusCode};

/// Maximum accepted line length, guards against a device streaming garbage
pub const MAX_LINE_LENGTH: usize = 4096;

/// Line terminator for requests
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Errors that can occur while framing or parsing lines
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Line too long: {0} bytes (max: {MAX_LINE_LENGTH})")]
    LineTooLong(usize),

    #[error("Malformed status line: {0:?}")]
    MalformedStatus(String),

    #[error("Line is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Encode a request into a terminated line
pub fn encode(request: &RequestLine) -> Bytes {
    let line = request.to_string();
    let mut buf = BytesMut::with_capacity(line.len() + LINE_TERMINATOR.len());
    buf.put_slice(line.as_bytes());
    buf.put_slice(LINE_TERMINATOR);
    buf.freeze()
}

/// Try to take one line from the front of a buffer
///
/// Returns:
/// - `Ok(Some(line))` with the terminator stripped if a complete line was found
/// - `Ok(None)` if more data is needed
/// - `Err(...)` if the line is too long or not UTF-8
pub fn decode_line(buf: &mut BytesMut) -> Result<Option<String>, CodecError> {
    let Some(pos) = buf.iter().position(|b| *b == b'\n') else {
        if buf.len() > MAX_LINE_LENGTH {
            return Err(CodecError::LineTooLong(buf.len()));
        }
        return Ok(None);
    };

    if pos > MAX_LINE_LENGTH {
        return Err(CodecError::LineTooLong(pos));
    }

    let mut line = buf.split_to(pos);
    buf.advance(1);

    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }

    let text = std::str::from_utf8(&line)?.to_string();
    trace!(line = %text, "decoded line");
    Ok(Some(text))
}

/// Parse a `NNN:TEXT` status line
pub fn parse_status(line: &str) -> Result<(StatusCode, String), CodecError> {
    let (code, text) = line
        .split_once(':')
        .ok_or_else(|| CodecError::MalformedStatus(line.to_string()))?;

    let code: u16 = code
        .trim()
        .parse()
        .map_err(|_| CodecError::MalformedStatus(line.to_string()))?;

    Ok((StatusCode::from(code), text.trim().to_string()))
}

/// Streaming decoder that assembles responses from raw serial bytes
#[derive(Debug, Default)]
pub struct ResponseDecoder {
    buffer: BytesMut,
    pending: Option<(StatusCode, String)>,
}

impl ResponseDecoder {
    /// Create a new response decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(512),
            pending: None,
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next complete response
    ///
    /// Blank lines ahead of a status line are skipped. A 101 status is held
    /// back until its text line arrives.
    pub fn decode_next(&mut self) -> Result<Option<Response>, CodecError> {
        loop {
            let Some(line) = decode_line(&mut self.buffer)? else {
                return Ok(None);
            };

            match self.pending.take() {
                Some((status_code, status_text)) => {
                    return Ok(Some(Response {
                        status_code,
                        status_text,
                        response: line,
                        suggestions: None,
                    }));
                }
                None if line.trim().is_empty() => continue,
                None => {
                    let (status_code, status_text) = parse_status(&line)?;
                    if status_code.has_text() {
                        self.pending = Some((status_code, status_text));
                        continue;
                    }
                    return Ok(Some(Response::status(status_code, status_text)));
                }
            }
        }
    }

    /// Take up to `n` raw bytes that were buffered but not consumed as lines
    pub fn take_raw(&mut self, n: usize) -> Bytes {
        let n = n.min(self.buffer.len());
        self.buffer.split_to(n).freeze()
    }

    /// Get the current buffer length
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any buffered bytes and partial responses
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending = None;
    }
}
