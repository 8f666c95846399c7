//! Mount configuration
//!
//! Type definitions plus a small no_std reader for the embedded
//! `mount.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigError, ConfigErrorKind};
pub use types::*;
