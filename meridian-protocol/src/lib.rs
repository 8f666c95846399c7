//! Meade LX200 serial protocol
//!
//! This crate implements the host-facing command protocol of the Meridian
//! mount controller. Planetarium software talks to the mount over a serial
//! line using short ASCII frames:
//!
//! ```text
//! ┌───────┬──────────────┬────────────────┬─────┐
//! │ START │ COMMAND NAME │ PARAMETERS     │ END │
//! │ `:`   │ 1-2 chars    │ 0+ chars       │ `#` │
//! └───────┴──────────────┴────────────────┴─────┘
//! ```
//!
//! e.g. `:Sr12:34:56#` sets the target right ascension and `:GR#` reads the
//! current one.
//!
//! The pipeline is: [`FrameAssembler`] collects bytes into a frame,
//! [`dispatch::decode`] matches it against the command grammar and validates
//! its values, and [`dispatch::execute`] drives a [`CommandHandler`] and
//! formats the reply.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod coordinates;
pub mod dispatch;
pub mod frame;
pub mod grammar;
pub mod reply;

pub use command::{CommandFamily, ParsedCommand};
pub use coordinates::{
    DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, Precision, RaCoordinate,
    Sign, TimeValue,
};
pub use dispatch::{
    decode, dispatch, execute, handle_command, reject, CommandHandler, Lx200Command,
};
pub use frame::{FeedStatus, FrameAssembler, ParseError, FRAME_END, FRAME_START, MAX_FRAME_LEN};
pub use reply::{Reply, MAX_REPLY_LEN};
