//! LX200 protocol session
//!
//! Feeds serial bytes through the frame assembler, dispatches completed
//! frames to a [`CommandHandler`] and sends the replies. The session owns
//! the assembler, so it also owns the precision mode toggled by `:U#`.
//!
//! The session blocks in exactly two places: waiting on its [`ByteSource`]
//! and waiting on the handler.

use meridian_protocol::dispatch::{handle_command, reject};
use meridian_protocol::{
    CommandHandler, FeedStatus, FrameAssembler, Lx200Command, ParseError, Precision, Reply,
};

use crate::traits::{ByteSource, ReplySink};

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessorStats {
    /// Complete frames received
    pub frames: u32,
    /// Frames decoded and executed
    pub dispatched: u32,
    /// Frames that did not decode
    pub rejected: u32,
    /// Bytes refused by the assembler
    pub framing_errors: u32,
}

/// Protocol session bound to one handler
pub struct Lx200Processor<H> {
    assembler: FrameAssembler,
    handler: H,
    stats: ProcessorStats,
}

impl<H: CommandHandler> Lx200Processor<H> {
    pub fn new(handler: H, precision: Precision) -> Self {
        let mut assembler = FrameAssembler::new();
        assembler.set_precision(precision);
        Self {
            assembler,
            handler,
            stats: ProcessorStats::default(),
        }
    }

    /// Drive the session until the byte source closes
    ///
    /// Framing errors are counted and the session moves on to the next frame.
    pub async fn run<B: ByteSource, S: ReplySink>(&mut self, source: &mut B, sink: &mut S) {
        while let Some(byte) = source.next_byte().await {
            if let Err(_error) = self.process_byte(byte, sink).await {
                #[cfg(feature = "defmt")]
                defmt::debug!("Frame error on byte {=u8:#x}: {}", byte, _error);
            }
        }
    }

    /// Process one received byte
    ///
    /// When the byte completes a frame the command is executed and its reply,
    /// if any, is sent before returning. Framing errors are returned to the
    /// caller; the session is ready for the next frame either way.
    pub async fn process_byte<S: ReplySink>(
        &mut self,
        byte: u8,
        sink: &mut S,
    ) -> Result<FeedStatus, ParseError> {
        let status = match self.assembler.feed(byte) {
            Ok(status) => status,
            Err(error) => {
                self.stats.framing_errors = self.stats.framing_errors.wrapping_add(1);
                return Err(error);
            }
        };

        if status == FeedStatus::Complete {
            self.process_frame(sink).await;
        }
        Ok(status)
    }

    async fn process_frame<S: ReplySink>(&mut self, sink: &mut S) {
        let mut reply = Reply::new();
        let mut toggle_precision = false;

        if let Some(command) = self.assembler.get_command() {
            self.stats.frames = self.stats.frames.wrapping_add(1);
            match handle_command(&command, &mut self.handler, &mut reply).await {
                Ok(decoded) => {
                    toggle_precision = decoded == Lx200Command::TogglePrecision;
                    self.stats.dispatched = self.stats.dispatched.wrapping_add(1);
                }
                Err(error) => {
                    reject(&command, error, &mut reply);
                    self.stats.rejected = self.stats.rejected.wrapping_add(1);
                }
            }
        }

        if toggle_precision {
            let precision = self.assembler.precision().toggled();
            self.assembler.set_precision(precision);
        }

        if !reply.is_empty() {
            sink.send(&reply).await;
        }
    }

    pub fn precision(&self) -> Precision {
        self.assembler.precision()
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}
