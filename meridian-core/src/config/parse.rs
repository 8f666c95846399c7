//! Minimal TOML reader for `mount.toml`
//!
//! Handles only the subset the mount configuration needs:
//! - `[section]` headers
//! - `key = value` pairs with integer or quoted string values
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys that are not present keep their defaults. Site coordinates are
//! written in LX200 form (`"+52*30"`, `"013*24"`) and checked with the
//! protocol validators.

use meridian_protocol::coordinates::{parse_latitude, parse_longitude};
use meridian_protocol::Precision;

use super::types::{MountConfig, MAX_BAUDRATE, MAX_TIMEOUT_MS};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigErrorKind {
    /// Unknown or malformed `[section]` header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    MissingValue,
    /// Value has the wrong type or is out of range
    InvalidValue,
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Serial,
    Rpc,
    Protocol,
    Site,
}

/// Parse configuration text, starting from defaults
pub fn parse_config(input: &str) -> Result<MountConfig, ConfigError> {
    let mut config = MountConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let fail = |kind| ConfigError {
            line: index + 1,
            kind,
        };
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or(fail(ConfigErrorKind::InvalidSection))?;
            section = parse_section_header(header).ok_or(fail(ConfigErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(fail(ConfigErrorKind::MissingValue))?;
        apply_value(&mut config, section, key, value).map_err(fail)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "serial" => Some(Section::Serial),
        "rpc" => Some(Section::Rpc),
        "protocol" => Some(Section::Protocol),
        "site" => Some(Section::Site),
        _ => None,
    }
}

/// Drop a `#` comment that is not inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ConfigErrorKind> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigErrorKind::InvalidValue)
}

fn parse_bounded(value: &str, max: u32) -> Result<u32, ConfigErrorKind> {
    match value.parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn apply_value(
    config: &mut MountConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigErrorKind> {
    match (section, key) {
        (Section::Serial, "baudrate") => {
            config.serial.baudrate = parse_bounded(value, MAX_BAUDRATE)?;
        }
        (Section::Rpc, "timeout_ms") => {
            config.rpc.timeout_ms = parse_bounded(value, MAX_TIMEOUT_MS)?;
        }
        (Section::Protocol, "precision") => {
            config.protocol.precision = match parse_string(value)? {
                "high" => Precision::High,
                "low" => Precision::Low,
                _ => return Err(ConfigErrorKind::InvalidValue),
            };
        }
        (Section::Site, "latitude") => {
            config.site.latitude =
                parse_latitude(parse_string(value)?).map_err(|_| ConfigErrorKind::InvalidValue)?;
        }
        (Section::Site, "longitude") => {
            config.site.longitude =
                parse_longitude(parse_string(value)?).map_err(|_| ConfigErrorKind::InvalidValue)?;
        }
        _ => return Err(ConfigErrorKind::UnknownKey),
    }
    Ok(())
}
