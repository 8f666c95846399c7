//! Cross-context remote calls into the mount
//!
//! The protocol session never touches mount state directly. It submits a
//! [`MountRequest`] to a bounded FIFO run queue and waits on its own
//! [`AsyncResult`] slot; the [`MountWorker`] drains the queue, claims each
//! request's ticket and completes its slot. A caller that times out cancels
//! its ticket first, so the mount never acts on a request reported as
//! failed.
//!
//! ```text
//!  MountClient ──try_send──▶ MountQueue ──receive──▶ MountWorker
//!       ▲                                                │
//!       └──────────── wait ◀── ReplySlot ◀──── set ──────┘
//! ```

pub mod async_result;
pub mod client;
pub mod request;
pub mod worker;

pub use async_result::{AsyncResult, Cancel, SetError, Ticket};
pub use client::{MountClient, RpcError, DEFAULT_TIMEOUT_MS};
pub use request::{
    execute, MountCommand, MountQueue, MountReply, MountRequest, ReplySlot, MOUNT_QUEUE_DEPTH,
};
pub use worker::{MountWorker, WorkerStats};
