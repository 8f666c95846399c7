//! Build script for meridian-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates mount.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate mount.toml at compile time
///
/// The firmware parses the same file again at boot; catching mistakes here
/// keeps a broken config from silently falling back to defaults.
fn validate_config() {
    println!("cargo:rerun-if-changed=mount.toml");

    let config_path = Path::new("mount.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: mount.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a mount.toml configuration file.          ║\n\
            ║  Please create one in the meridian-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read mount.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in mount.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_serial(&config, &mut errors);
    validate_rpc(&config, &mut errors);
    validate_protocol(&config, &mut errors);
    validate_site(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in mount.toml                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=mount.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [(&str, &[&str]); 4] = [
    ("serial", &["baudrate"]),
    ("rpc", &["timeout_ms"]),
    ("protocol", &["precision"]),
    ("site", &["latitude", "longitude"]),
];

/// Only known sections and keys are allowed
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, section) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(known, _)| known == name) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn get<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

fn check_integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    max: i64,
    errors: &mut Vec<String>,
) {
    match get(config, section, key) {
        None => {}
        Some(toml::Value::Integer(n)) if (1..=max).contains(n) => {}
        Some(_) => errors.push(format!("[{}] {} must be an integer 1-{}", section, key, max)),
    }
}

fn validate_serial(config: &toml::Value, errors: &mut Vec<String>) {
    check_integer(config, "serial", "baudrate", 921_600, errors);
}

fn validate_rpc(config: &toml::Value, errors: &mut Vec<String>) {
    check_integer(config, "rpc", "timeout_ms", 60_000, errors);
}

fn validate_protocol(config: &toml::Value, errors: &mut Vec<String>) {
    match get(config, "protocol", "precision") {
        None => {}
        Some(toml::Value::String(p)) if p == "high" || p == "low" => {}
        Some(_) => errors.push("[protocol] precision must be 'high' or 'low'".to_string()),
    }
}

fn validate_site(config: &toml::Value, errors: &mut Vec<String>) {
    match get(config, "site", "latitude") {
        None => {}
        Some(toml::Value::String(s)) if is_latitude(s) => {}
        Some(_) => errors.push("[site] latitude must be \"sDD*MM\", |DD| <= 90".to_string()),
    }
    match get(config, "site", "longitude") {
        None => {}
        Some(toml::Value::String(s)) if is_longitude(s) => {}
        Some(_) => errors.push("[site] longitude must be \"DDD*MM\", DDD < 360".to_string()),
    }
}

/// Split "DD*MM" into numbers, requiring the exact digit widths
fn degrees_minutes(s: &str, width: usize) -> Option<(u32, u32)> {
    let (degrees, minutes) = s.split_once('*')?;
    let digits = |t: &str, n: usize| {
        (t.len() == n && t.bytes().all(|b| b.is_ascii_digit()))
            .then(|| t.parse::<u32>().ok())
            .flatten()
    };
    Some((digits(degrees, width)?, digits(minutes, 2)?))
}

fn is_latitude(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('+').or_else(|| s.strip_prefix('-')) else {
        return false;
    };
    matches!(degrees_minutes(rest, 2), Some((d, m)) if d <= 90 && m < 60)
}

fn is_longitude(s: &str) -> bool {
    matches!(degrees_minutes(s, 3), Some((d, m)) if d < 360 && m < 60)
}
