//! Host serial task
//!
//! Reads LX200 bytes from the UART, runs them through the protocol session
//! and writes replies back on the same link.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;
use embedded_io_async::{Read, Write};

use meridian_core::rpc::{MountClient, MountQueue, ReplySlot};
use meridian_core::traits::{ByteSource, ReplySink};
use meridian_core::Lx200Processor;
use meridian_protocol::Precision;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// UART receive half as a byte source
struct UartSource {
    rx: BufferedUartRx,
    buf: [u8; RX_BUF_SIZE],
    pos: usize,
    len: usize,
}

impl ByteSource for UartSource {
    async fn next_byte(&mut self) -> Option<u8> {
        while self.pos == self.len {
            match self.rx.read(&mut self.buf).await {
                Ok(n) => {
                    trace!("RX: {} bytes", n);
                    self.pos = 0;
                    self.len = n;
                }
                Err(e) => {
                    warn!("UART read error: {:?}", e);
                }
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Some(byte)
    }
}

/// UART transmit half as a reply sink
struct UartSink {
    tx: BufferedUartTx,
}

impl ReplySink for UartSink {
    async fn send(&mut self, reply: &str) {
        trace!("TX: {=str}", reply);
        if let Err(e) = self.tx.write_all(reply.as_bytes()).await {
            warn!("Failed to send reply: {:?}", e);
        }
    }
}

/// Serial task - one LX200 session on the host link
#[embassy_executor::task]
pub async fn serial_task(
    rx: BufferedUartRx,
    tx: BufferedUartTx,
    queue: &'static MountQueue<CriticalSectionRawMutex>,
    reply: &'static ReplySlot<CriticalSectionRawMutex>,
    precision: Precision,
    timeout_ms: u32,
) {
    info!("Serial task started ({} ms mount timeout)", timeout_ms);

    let client = MountClient::new(queue, reply, Delay, timeout_ms);
    let mut session = Lx200Processor::new(client, precision);
    let mut source = UartSource {
        rx,
        buf: [0u8; RX_BUF_SIZE],
        pos: 0,
        len: 0,
    };
    let mut sink = UartSink { tx };

    session.run(&mut source, &mut sink).await;

    let stats = session.stats();
    warn!(
        "Serial session ended after {} frames ({} rejected)",
        stats.frames, stats.rejected
    );
}
