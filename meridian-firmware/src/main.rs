//! Meridian - Telescope Mount Controller Firmware
//!
//! Main firmware binary for RP2040-based mount controllers. Speaks the Meade
//! LX200 serial protocol to planetarium software and keeps the mount state
//! in a dedicated task that the protocol session reaches over a run queue.
//!
//! ```text
//!   UART0 ──► serial_task ──► MOUNT_QUEUE ──► mount_task
//!   UART0 ◄──      ▲                              │
//!                  └──────── PROTOCOL_REPLY ◄─────┘
//! ```
//!
//! The queue and the reply slot are created here and handed to the tasks;
//! nothing else is shared between them.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use meridian_core::config::{parse_config, MountConfig};
use meridian_core::rpc::{MountQueue, ReplySlot};
use meridian_core::Mount;

mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit mount.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../mount.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Static cells for the mount RPC channel
static MOUNT_QUEUE: StaticCell<MountQueue<CriticalSectionRawMutex>> = StaticCell::new();
static PROTOCOL_REPLY: StaticCell<ReplySlot<CriticalSectionRawMutex>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Meridian firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Site: lat {}{}*{:02}, lon {:03}*{:02}",
        config.site.latitude.sign().as_char(),
        config.site.latitude.degrees(),
        config.site.latitude.minutes(),
        config.site.longitude.degrees(),
        config.site.longitude.minutes()
    );

    // Host link on UART0 (GP0 = TX, GP1 = RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.serial.baudrate;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("Host UART at {} baud", config.serial.baudrate);

    let queue: &'static MountQueue<CriticalSectionRawMutex> =
        MOUNT_QUEUE.init(MountQueue::new());
    let reply: &'static ReplySlot<CriticalSectionRawMutex> =
        PROTOCOL_REPLY.init(ReplySlot::new());
    let mount = Mount::new(config.site.latitude, config.site.longitude);

    spawner.spawn(tasks::mount_task(queue, mount)).unwrap();
    spawner
        .spawn(tasks::serial_task(
            rx,
            tx,
            queue,
            reply,
            config.protocol.precision,
            config.rpc.timeout_ms,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse the embedded configuration
///
/// build.rs already validated the file, so a failure here means the parser
/// and the build check disagree. Defaults keep the mount usable.
fn load_config() -> MountConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            warn!("Embedded config rejected at line {}: {}, using defaults", e.line, e.kind);
            MountConfig::default()
        }
    }
}
