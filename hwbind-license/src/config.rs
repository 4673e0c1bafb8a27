//! License configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! enabled = true
//! subject = "acme-server"
//! license_path = "/etc/acme/license.lic"
//! public_key_path = "/etc/acme/license-public.key"
//! cache_ttl_secs = 60
//! expiry_warning_days = 15
//!
//! [hardware]
//! command_timeout_ms = 5000
//! excluded_interface_prefixes = ["docker", "veth", "flannel", "cni"]
//! ```

use hwbind_hardware::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::error::{LicenseError, LicenseResult};
use crate::manager::DEFAULT_EXPIRY_WARNING_DAYS;

/// Settings for license installation and verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Master switch; when false nothing is installed at startup.
    pub enabled: bool,
    /// Required license subject, if any.
    pub subject: Option<String>,
    /// License file installed at startup.
    pub license_path: Option<PathBuf>,
    /// Public key verifying license signatures.
    pub public_key_path: Option<PathBuf>,
    /// Seconds a successful verification is trusted.
    pub cache_ttl_secs: u64,
    /// Warn when the license expires within this many days.
    pub expiry_warning_days: i64,
    /// Hardware probing settings.
    pub hardware: ProbeConfig,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subject: None,
            license_path: None,
            public_key_path: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            hardware: ProbeConfig::default(),
        }
    }
}

impl LicenseConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] on invalid TOML or field types.
    pub fn from_toml_str(text: &str) -> LicenseResult<Self> {
        toml::from_str(text).map_err(|e| LicenseError::Config(e.to_string()))
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Io`] if the file is unreadable and
    /// [`LicenseError::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that an enabled configuration can install a license.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] describing the first problem.
    pub fn validate(&self) -> LicenseResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.cache_ttl_secs == 0 {
            return Err(LicenseError::Config("cache_ttl_secs must be positive".into()));
        }
        if self.expiry_warning_days < 0 {
            return Err(LicenseError::Config(
                "expiry_warning_days must not be negative".into(),
            ));
        }
        let license_path = self
            .license_path
            .as_ref()
            .ok_or_else(|| LicenseError::Config("license_path is not set".into()))?;
        if !license_path.is_file() {
            return Err(LicenseError::Config(format!(
                "license file {} does not exist",
                license_path.display()
            )));
        }
        if self.public_key_path.is_none() {
            return Err(LicenseError::Config("public_key_path is not set".into()));
        }
        Ok(())
    }

    /// Returns the success TTL.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
