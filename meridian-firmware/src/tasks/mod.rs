//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod mount;
pub mod serial;

pub use mount::mount_task;
pub use serial::serial_task;
