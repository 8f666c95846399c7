//! Board-agnostic logic for the Meridian telescope mount controller
//!
//! This crate contains everything between the serial line and the mount
//! that does not depend on specific hardware:
//!
//! - The LX200 protocol session ([`processor`])
//! - The remote call channel into the mount context ([`rpc`])
//! - Mount state ([`mount`])
//! - Transport and mount traits ([`traits`])
//! - Configuration types and parsing ([`config`])

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod mount;
pub mod processor;
pub mod rpc;
pub mod traits;

pub use mount::Mount;
pub use processor::{Lx200Processor, ProcessorStats};
