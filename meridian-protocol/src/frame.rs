//! Frame assembly for the LX200 serial protocol.
//!
//! Frame format:
//! - START (1 byte): `:`
//! - BODY (1+ bytes): command name followed by optional parameters
//! - END (1 byte): `#`
//!
//! The assembler accumulates one frame at a time into a fixed buffer.
//! A completed frame is handed out as a [`ParsedCommand`] that borrows the
//! buffer, so the borrow checker guarantees the command is consumed before
//! the next byte can be fed.

use crate::command::ParsedCommand;
use crate::coordinates::Precision;

/// Frame start marker
pub const FRAME_START: u8 = b':';

/// Frame end marker
pub const FRAME_END: u8 = b'#';

/// Maximum frame length in bytes, including both markers
pub const MAX_FRAME_LEN: usize = 64;

/// Errors produced while assembling or interpreting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Structural mismatch (wrong prefix, empty body, malformed field)
    InvalidFormat,
    /// Well-formed value outside its valid range
    OutOfRange,
    /// Frame exceeds the buffer capacity
    BufferFull,
}

/// Progress of the current frame after feeding a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedStatus {
    /// More bytes are needed
    Incomplete,
    /// A complete frame is ready for [`FrameAssembler::get_command`]
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    /// Waiting for START
    Empty,
    /// Got START, collecting the body
    Accumulating,
    /// Got END, frame waiting to be taken
    Complete,
}

/// Incremental frame assembler
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: AssemblerState,
    buffer: [u8; MAX_FRAME_LEN],
    len: usize,
    precision: Precision,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an empty assembler in high precision mode
    pub const fn new() -> Self {
        Self {
            state: AssemblerState::Empty,
            buffer: [0u8; MAX_FRAME_LEN],
            len: 0,
            precision: Precision::High,
        }
    }

    /// Discard any buffered bytes
    ///
    /// The precision mode is kept.
    pub fn reset(&mut self) {
        self.state = AssemblerState::Empty;
        self.len = 0;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Complete)` once the END marker has been accepted. On
    /// `BufferFull` and on an empty body the partial frame is dropped. A byte
    /// fed while a completed frame is still pending is rejected and the
    /// pending frame is left untouched.
    pub fn feed(&mut self, byte: u8) -> Result<FeedStatus, ParseError> {
        match self.state {
            AssemblerState::Empty => {
                if byte != FRAME_START {
                    return Err(ParseError::InvalidFormat);
                }
                self.push(byte)?;
                self.state = AssemblerState::Accumulating;
                Ok(FeedStatus::Incomplete)
            }
            AssemblerState::Accumulating => {
                if byte == FRAME_END {
                    if self.len == 1 {
                        self.reset();
                        return Err(ParseError::InvalidFormat);
                    }
                    self.push(byte)?;
                    self.state = AssemblerState::Complete;
                    return Ok(FeedStatus::Complete);
                }

                // The protocol is plain ASCII
                if !byte.is_ascii() {
                    self.reset();
                    return Err(ParseError::InvalidFormat);
                }

                // Keep the last slot for END
                if self.len + 1 >= MAX_FRAME_LEN {
                    self.reset();
                    return Err(ParseError::BufferFull);
                }
                self.push(byte)?;
                Ok(FeedStatus::Incomplete)
            }
            AssemblerState::Complete => Err(ParseError::InvalidFormat),
        }
    }

    /// Feed multiple bytes, stopping at the first complete frame or error
    ///
    /// Returns the number of bytes consumed together with the last status.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Result<FeedStatus, ParseError>) {
        let mut status = Ok(FeedStatus::Incomplete);
        for (i, &byte) in bytes.iter().enumerate() {
            status = self.feed(byte);
            if !matches!(status, Ok(FeedStatus::Incomplete)) {
                return (i + 1, status);
            }
        }
        (bytes.len(), status)
    }

    /// Check if a complete frame is waiting
    pub fn is_command_ready(&self) -> bool {
        self.state == AssemblerState::Complete
    }

    /// Take the completed frame, if any
    ///
    /// Taking the command resets the assembler. The returned command borrows
    /// the internal buffer and must be dropped before feeding again.
    pub fn get_command(&mut self) -> Option<ParsedCommand<'_>> {
        if self.state != AssemblerState::Complete {
            return None;
        }

        let end = self.len - 1;
        self.reset();

        // Only ASCII bytes are ever buffered
        let body = core::str::from_utf8(&self.buffer[1..end]).ok()?;
        Some(ParsedCommand::from_body(body, self.precision))
    }

    /// Number of bytes currently buffered
    pub fn buffered_len(&self) -> usize {
        self.len
    }

    /// Current coordinate precision mode
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Change the coordinate precision mode
    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    fn push(&mut self, byte: u8) -> Result<(), ParseError> {
        let slot = self.buffer.get_mut(self.len).ok_or(ParseError::BufferFull)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }
}
