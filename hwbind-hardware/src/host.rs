//! Descriptive host information logged next to fingerprints.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::command::{ProbeBackend, SystemBackend};
use crate::config::DEFAULT_COMMAND_TIMEOUT_MS;

/// Information about the current host.
///
/// Not part of license binding; it only helps an operator recognise the
/// machine in diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    /// Operating system name.
    pub os_name: String,
    /// Operating system version, or "unknown".
    pub os_version: String,
    /// Hostname, or "unknown".
    pub hostname: String,
    /// CPU architecture.
    pub arch: String,
}

impl HostInfo {
    /// Collects information about the current host.
    ///
    /// External commands run under the default probe timeout.
    #[must_use]
    pub fn collect() -> Self {
        let backend = SystemBackend::new(Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS));
        Self::collect_with(&backend)
    }

    /// Collects host information, reading OS details through `backend`.
    #[must_use]
    pub fn collect_with(backend: &dyn ProbeBackend) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty());

        Self {
            os_name: env::consts::OS.to_string(),
            os_version: os_version(backend).unwrap_or_else(|| "unknown".to_string()),
            hostname: hostname.unwrap_or_else(|| "unknown".to_string()),
            arch: env::consts::ARCH.to_string(),
        }
    }
}

#[cfg(target_os = "macos")]
fn os_version(backend: &dyn ProbeBackend) -> Option<String> {
    let version = backend.run("sw_vers", &["-productVersion"])?;
    Some(version.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(not(target_os = "macos"))]
fn os_version(backend: &dyn ProbeBackend) -> Option<String> {
    let content = backend.read_file("/etc/os-release")?;
    os_release_value(&content, "PRETTY_NAME").or_else(|| os_release_value(&content, "VERSION_ID"))
}

/// Reads `KEY=value` (optionally quoted) from os-release content.
#[cfg_attr(target_os = "macos", allow(dead_code))]
fn os_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        (k.trim() == key)
            .then(|| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}
