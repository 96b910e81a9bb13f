//! Chameleon text protocol over any byte stream
//!
//! The link sends one request line, then reads until a complete response
//! has been decoded. Dumps and logs move through XMODEM once the device
//! answers `110:WAITING FOR XMODEM`.

use crate::error::DeviceError;
use crate::transport::traits::{ByteSink, ByteSource, DeviceConnection};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use chameleon_protocol::codec::{self, ResponseDecoder};
use chameleon_protocol::xmodem::{
    self, BlockDisposition, ReceiveState, XmodemError, ACK, BLOCK_SIZE, CAN, EOT, FRAME_SIZE,
    MAX_RETRIES, NAK, SOH,
};
use chameleon_protocol::{timing, DeviceCommand, RequestLine, Response, StatusCode};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Read timeouts applied by the link
#[derive(Debug, Clone, Copy)]
pub struct LinkTimeouts {
    /// Ordinary request/response round trip
    pub response: Duration,
    /// Commands that drive the reader (GETUID, IDENTIFY, DUMP_MFU)
    pub reader: Duration,
    /// One XMODEM block or control byte
    pub block: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            response: Duration::from_millis(timing::RESPONSE_TIMEOUT_MS),
            reader: Duration::from_millis(timing::READER_TIMEOUT_MS),
            block: Duration::from_millis(timing::XMODEM_BLOCK_TIMEOUT_MS),
        }
    }
}

/// A device connection speaking the Chameleon protocol over `S`
pub struct ChameleonLink<S> {
    stream: S,
    decoder: ResponseDecoder,
    timeouts: LinkTimeouts,
}

impl<S> ChameleonLink<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    /// Wrap an open stream
    pub fn new(stream: S, timeouts: LinkTimeouts) -> Self {
        Self {
            stream,
            decoder: ResponseDecoder::new(),
            timeouts,
        }
    }

    /// Send one request line and wait for its response
    async fn request(&mut self, request: RequestLine) -> Result<Response, DeviceError> {
        let limit = if request.command().uses_reader() {
            self.timeouts.reader
        } else {
            self.timeouts.response
        };

        self.decoder.clear();
        debug!(request = %request, "-> device");
        self.stream.write_all(&codec::encode(&request)).await?;
        self.stream.flush().await?;

        let deadline = Instant::now() + limit;
        let response = loop {
            if let Some(response) = self.decoder.decode_next()? {
                break response;
            }
            self.fill(deadline, limit).await?;
        };

        debug!(
            status = %response.status_code,
            text = %response.status_text,
            response = %response.response,
            "<- device"
        );
        Ok(response)
    }

    /// Read more bytes from the stream into the decoder
    async fn fill(&mut self, deadline: Instant, limit: Duration) -> Result<(), DeviceError> {
        let mut buf = [0u8; 256];
        match timeout_at(deadline, self.stream.read(&mut buf)).await {
            Ok(Ok(0)) => Err(DeviceError::Disconnected),
            Ok(Ok(n)) => {
                self.decoder.extend(&buf[..n]);
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(DeviceError::Timeout(limit)),
        }
    }

    /// Read exactly `n` raw bytes, draining buffered data first
    async fn read_raw(&mut self, n: usize) -> Result<BytesMut, DeviceError> {
        let limit = self.timeouts.block;
        let deadline = Instant::now() + limit;
        let mut out = BytesMut::with_capacity(n);

        while out.len() < n {
            if self.decoder.buffer_len() == 0 {
                self.fill(deadline, limit).await?;
            }
            out.extend_from_slice(&self.decoder.take_raw(n - out.len()));
        }
        Ok(out)
    }

    async fn read_control(&mut self) -> Result<u8, DeviceError> {
        Ok(self.read_raw(1).await?[0])
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Issue the transfer command and require the XMODEM handshake status
    async fn enter_xmodem(&mut self, command: DeviceCommand) -> Result<(), DeviceError> {
        let response = self.request(RequestLine::Action(command)).await?;
        if response.status_code != StatusCode::WaitingForXmodem {
            return Err(DeviceError::Refused {
                command,
                status: response.status_code,
                text: response.status_text,
            });
        }
        Ok(())
    }

    /// Abort the transfer on our side and hand back the error
    async fn cancel(&mut self, error: XmodemError) -> DeviceError {
        if let Err(e) = self.write_raw(&[CAN]).await {
            warn!("Failed to send XMODEM cancel: {}", e);
        }
        error.into()
    }

    /// Receive an XMODEM image into `sink`
    async fn receive_image(&mut self, sink: &mut ByteSink<'_>) -> Result<u64, DeviceError> {
        let mut state = ReceiveState::new();
        let mut retries = 0u32;

        self.write_raw(&[NAK]).await?;

        loop {
            match self.read_control().await? {
                SOH => {
                    let mut frame = BytesMut::with_capacity(FRAME_SIZE);
                    frame.put_u8(SOH);
                    frame.extend_from_slice(&self.read_raw(FRAME_SIZE - 1).await?);

                    match xmodem::decode_block(&frame) {
                        Ok(block) => match state.classify(&block) {
                            BlockDisposition::Accept => {
                                sink.write_all(&block.data).await?;
                                retries = 0;
                                self.write_raw(&[ACK]).await?;
                            }
                            BlockDisposition::Duplicate => {
                                debug!(seq = block.seq, "duplicate XMODEM block");
                                self.write_raw(&[ACK]).await?;
                            }
                            BlockDisposition::OutOfSequence => {
                                let error = XmodemError::OutOfSequence {
                                    expected: state.expected(),
                                    got: block.seq,
                                };
                                return Err(self.cancel(error).await);
                            }
                        },
                        Err(e) => {
                            retries += 1;
                            if retries >= MAX_RETRIES {
                                let error = XmodemError::RetriesExhausted(state.expected());
                                return Err(self.cancel(error).await);
                            }
                            warn!("Bad XMODEM block ({}), requesting retransmission", e);
                            self.write_raw(&[NAK]).await?;
                        }
                    }
                }
                EOT => {
                    self.write_raw(&[ACK]).await?;
                    break;
                }
                CAN => return Err(XmodemError::Cancelled.into()),
                other => return Err(self.cancel(XmodemError::UnexpectedByte(other)).await),
            }
        }

        sink.flush().await?;
        Ok(state.received_bytes())
    }

    /// Send an XMODEM image read from `source`
    async fn send_image(&mut self, source: &mut ByteSource<'_>) -> Result<u64, DeviceError> {
        loop {
            match self.read_control().await? {
                NAK => break,
                CAN => return Err(XmodemError::Cancelled.into()),
                other => debug!("ignoring 0x{:02x} while waiting for receiver", other),
            }
        }

        let mut seq: u8 = 1;
        let mut total = 0u64;
        let mut chunk = [0u8; BLOCK_SIZE];

        loop {
            let n = read_chunk(source, &mut chunk).await?;
            if n == 0 {
                break;
            }
            total += n as u64;

            let frame = xmodem::encode_block(seq, &chunk[..n]);
            self.send_until_acked(&frame, seq).await?;
            seq = seq.wrapping_add(1);

            if n < BLOCK_SIZE {
                break;
            }
        }

        self.send_until_acked(&[EOT], seq).await?;
        Ok(total)
    }

    async fn send_until_acked(&mut self, frame: &[u8], seq: u8) -> Result<(), DeviceError> {
        for _ in 0..MAX_RETRIES {
            self.write_raw(frame).await?;
            match self.read_control().await? {
                ACK => return Ok(()),
                NAK => debug!(seq, "XMODEM block rejected, resending"),
                CAN => return Err(XmodemError::Cancelled.into()),
                other => return Err(self.cancel(XmodemError::UnexpectedByte(other)).await),
            }
        }
        Err(self.cancel(XmodemError::RetriesExhausted(seq)).await)
    }
}

/// Fill `buf` from `source` until it is full or the source is exhausted
async fn read_chunk(source: &mut ByteSource<'_>, buf: &mut [u8]) -> Result<usize, DeviceError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[async_trait]
impl<S> DeviceConnection for ChameleonLink<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    async fn query(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        self.request(RequestLine::Query(command)).await
    }

    async fn set(&mut self, command: DeviceCommand, value: &str) -> Result<Response, DeviceError> {
        self.request(RequestLine::Set(command, value.to_string())).await
    }

    async fn suggest(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        let response = self.request(RequestLine::Suggest(command)).await?;
        Ok(response.into_suggestions())
    }

    async fn action(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        self.request(RequestLine::Action(command)).await
    }

    async fn transfer_out(
        &mut self,
        command: DeviceCommand,
        sink: &mut ByteSink<'_>,
    ) -> Result<u64, DeviceError> {
        self.enter_xmodem(command).await?;
        let received = self.receive_image(sink).await?;
        debug!(command = %command, bytes = received, "XMODEM receive complete");
        Ok(received)
    }

    async fn transfer_in(
        &mut self,
        command: DeviceCommand,
        source: &mut ByteSource<'_>,
    ) -> Result<u64, DeviceError> {
        self.enter_xmodem(command).await?;
        let sent = self.send_image(source).await?;
        debug!(command = %command, bytes = sent, "XMODEM send complete");
        Ok(sent)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
