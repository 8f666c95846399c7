//! Mount worker task
//!
//! Owns the mount state and executes queued commands one at a time.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use meridian_core::rpc::{MountQueue, MountWorker};
use meridian_core::Mount;

/// Mount task - serves the run queue forever
#[embassy_executor::task]
pub async fn mount_task(queue: &'static MountQueue<CriticalSectionRawMutex>, mount: Mount) {
    info!("Mount task started");

    let mut worker = MountWorker::new(queue, mount);
    worker.run().await;
}
