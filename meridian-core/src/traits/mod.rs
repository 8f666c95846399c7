//! Hardware and transport abstraction traits
//!
//! These traits define the interface between the protocol and mount logic
//! and the board-specific implementations.

pub mod mount;
pub mod serial;

pub use mount::MountControl;
pub use serial::{ByteSource, ReplySink};
