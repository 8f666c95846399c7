//! Configuration type definitions
//!
//! These types represent the mount configuration. The firmware embeds a
//! `mount.toml` at build time and parses it with [`super::parse_config`].

use meridian_protocol::{LatitudeCoordinate, LongitudeCoordinate, Precision};

use crate::rpc::DEFAULT_TIMEOUT_MS;

/// Standard LX200 line speed
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Highest line speed accepted
pub const MAX_BAUDRATE: u32 = 921_600;

/// Longest RPC timeout accepted
pub const MAX_TIMEOUT_MS: u32 = 60_000;

/// Host serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Baud rate (1-921600)
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

/// Remote call behaviour between the protocol and mount contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RpcConfig {
    /// How long the protocol session waits for the mount worker (1-60000 ms)
    pub timeout_ms: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Protocol session defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolConfig {
    /// Precision mode at power-up
    pub precision: Precision,
}

/// Observing site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SiteConfig {
    pub latitude: LatitudeCoordinate,
    pub longitude: LongitudeCoordinate,
}

/// Complete mount configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MountConfig {
    pub serial: SerialConfig,
    pub rpc: RpcConfig,
    pub protocol: ProtocolConfig,
    pub site: SiteConfig,
}
