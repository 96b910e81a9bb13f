//! XMODEM block framing used for dump and log transfers
//!
//! Every data block is framed as:
//! ```text
//! [ SOH ][ seq ][ 255 - seq ][ 128 bytes data ][ checksum ]
//! ```
//!
//! The checksum is the 8-bit sum of the data bytes. Short final blocks are
//! padded with `PAD`.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

pub const SOH: u8 = 0x01;
pub const EOT: u8 = 0x04;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;
pub const PAD: u8 = 0x1A;

/// Payload bytes per block
pub const BLOCK_SIZE: usize = 128;

/// Full frame length including header and checksum
pub const FRAME_SIZE: usize = 3 + BLOCK_SIZE + 1;

/// Retransmissions allowed for one block before giving up
pub const MAX_RETRIES: u32 = 10;

/// Errors raised by the XMODEM framing or transfer state
#[derive(Error, Debug, PartialEq, Eq)]
pub enum XmodemError {
    #[error("Frame has wrong length: {0} bytes (expected {FRAME_SIZE})")]
    FrameLength(usize),

    #[error("Frame does not start with SOH (got 0x{0:02x})")]
    MissingSoh(u8),

    #[error("Block number {seq} does not match its complement {complement}")]
    SequenceMismatch { seq: u8, complement: u8 },

    #[error("Checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}")]
    Checksum { expected: u8, actual: u8 },

    #[error("Block {got} out of sequence (expected {expected})")]
    OutOfSequence { expected: u8, got: u8 },

    #[error("Unexpected control byte 0x{0:02x}")]
    UnexpectedByte(u8),

    #[error("Transfer cancelled by peer")]
    Cancelled,

    #[error("Block {0} failed after {MAX_RETRIES} attempts")]
    RetriesExhausted(u8),
}

/// A decoded data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub seq: u8,
    pub data: Bytes,
}

/// 8-bit additive checksum over a block payload
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode one data block, padding short payloads
pub fn encode_block(seq: u8, data: &[u8]) -> Bytes {
    debug_assert!(data.len() <= BLOCK_SIZE);

    let mut payload = [PAD; BLOCK_SIZE];
    payload[..data.len()].copy_from_slice(data);

    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_u8(SOH);
    buf.put_u8(seq);
    buf.put_u8(255 - seq);
    buf.put_slice(&payload);
    buf.put_u8(checksum(&payload));
    buf.freeze()
}

/// Decode and verify one complete frame
pub fn decode_block(frame: &[u8]) -> Result<Block, XmodemError> {
    if frame.len() != FRAME_SIZE {
        return Err(XmodemError::FrameLength(frame.len()));
    }
    if frame[0] != SOH {
        return Err(XmodemError::MissingSoh(frame[0]));
    }

    let seq = frame[1];
    let complement = frame[2];
    if seq != 255 - complement {
        return Err(XmodemError::SequenceMismatch { seq, complement });
    }

    let data = &frame[3..3 + BLOCK_SIZE];
    let expected = frame[FRAME_SIZE - 1];
    let actual = checksum(data);
    if expected != actual {
        return Err(XmodemError::Checksum { expected, actual });
    }

    Ok(Block {
        seq,
        data: Bytes::copy_from_slice(data),
    })
}

/// What the receiver should do with an incoming, verified block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDisposition {
    /// Next block in sequence, keep its data
    Accept,
    /// Retransmission of the block already accepted, ACK and drop it
    Duplicate,
    /// Out of sequence, the transfer cannot continue
    OutOfSequence,
}

/// Receiver-side sequence tracking
#[derive(Debug, Clone)]
pub struct ReceiveState {
    expected: u8,
    received_bytes: u64,
}

impl Default for ReceiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiveState {
    /// Blocks are numbered from 1
    pub fn new() -> Self {
        Self {
            expected: 1,
            received_bytes: 0,
        }
    }

    /// Classify a block and advance on acceptance
    pub fn classify(&mut self, block: &Block) -> BlockDisposition {
        if block.seq == self.expected {
            self.expected = self.expected.wrapping_add(1);
            self.received_bytes += block.data.len() as u64;
            BlockDisposition::Accept
        } else if block.seq == self.expected.wrapping_sub(1) {
            BlockDisposition::Duplicate
        } else {
            BlockDisposition::OutOfSequence
        }
    }

    /// Block number the receiver is waiting for
    pub fn expected(&self) -> u8 {
        self.expected
    }

    /// Data bytes accepted so far
    pub fn received_bytes(&self) -> u64 {
        self.received_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let frame = encode_block(1, &[0xAA; BLOCK_SIZE]);
        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(frame[0], SOH);
        assert_eq!(frame[1], 1);
        assert_eq!(frame[2], 254);
        assert_eq!(frame[FRAME_SIZE - 1], checksum(&[0xAA; BLOCK_SIZE]));
    }

    #[test]
    fn test_short_block_is_padded() {
        let frame = encode_block(3, b"abc");
        let block = decode_block(&frame).expect("decode failed");
        assert_eq!(&block.data[..3], b"abc");
        assert!(block.data[3..].iter().all(|b| *b == PAD));
    }

    #[test]
    fn test_corrupted_checksum() {
        let mut frame = encode_block(1, &[0x10; BLOCK_SIZE]).to_vec();
        frame[10] ^= 0xFF;
        assert!(matches!(
            decode_block(&frame),
            Err(XmodemError::Checksum { .. })
        ));
    }

    #[test]
    fn test_bad_sequence_complement() {
        let mut frame = encode_block(5, &[0; BLOCK_SIZE]).to_vec();
        frame[2] = 0;
        assert_eq!(
            decode_block(&frame),
            Err(XmodemError::SequenceMismatch { seq: 5, complement: 0 })
        );
    }

    #[test]
    fn test_receive_state_sequence() {
        let mut state = ReceiveState::new();
        let first = decode_block(&encode_block(1, &[1; BLOCK_SIZE])).unwrap();
        let third = decode_block(&encode_block(3, &[3; BLOCK_SIZE])).unwrap();

        assert_eq!(state.classify(&first), BlockDisposition::Accept);
        assert_eq!(state.classify(&first), BlockDisposition::Duplicate);
        assert_eq!(state.classify(&third), BlockDisposition::OutOfSequence);
        assert_eq!(state.received_bytes(), BLOCK_SIZE as u64);
    }

    #[test]
    fn test_sequence_wraps() {
        let mut state = ReceiveState::new();
        for seq in 1..=255u8 {
            let block = decode_block(&encode_block(seq, &[])).unwrap();
            assert_eq!(state.classify(&block), BlockDisposition::Accept);
        }
        let wrapped = decode_block(&encode_block(0, &[])).unwrap();
        assert_eq!(state.classify(&wrapped), BlockDisposition::Accept);
    }
}
