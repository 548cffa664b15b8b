//! Build information module
//!
//! Compile-time metadata reported by the status tool and the startup banner.

use serde::Serialize;

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("TRIVO_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Build label (CI sets `TRIVO_BUILD_LABEL`, local builds say "local")
pub const BUILD_LABEL: &str = match option_env!("TRIVO_BUILD_LABEL") {
    Some(s) => s,
    None => "local",
};

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Package description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_label: &'static str,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_label: BUILD_LABEL,
            build_timestamp: BUILD_TIMESTAMP,
            description: DESCRIPTION,
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Print the startup banner to stderr (stdout carries the MCP stream)
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Trivo recipe nutrition assistant");
    eprintln!("  Version: {} | Build: {}", info.version, info.build_label);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("===============================================");
}
