//! Probe configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound for a single probe command, in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Interface name prefixes skipped during network collection.
///
/// Container runtimes and overlay networks create these on the fly; their
/// addresses say nothing about which machine we are on.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["docker", "veth", "flannel", "cni"];

/// Settings for hardware probing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Timeout for each external command, in milliseconds.
    pub command_timeout_ms: u64,
    /// Interfaces whose name starts with any of these are ignored.
    pub excluded_interface_prefixes: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            excluded_interface_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

impl ProbeConfig {
    /// Returns the per-command timeout.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
