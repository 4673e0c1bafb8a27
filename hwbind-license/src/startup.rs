//! Installing the configured license when a process starts.

use hwbind_hardware::provider_for_current_os;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::VerificationCache;
use crate::config::LicenseConfig;
use crate::ed25519::Ed25519Notary;
use crate::error::{LicenseError, LicenseResult};

/// Installs the license named by `config` into `cache`.
///
/// Returns `Ok(false)` when licensing is disabled or no license path is
/// configured, and `Ok(true)` after a successful install.
///
/// # Errors
///
/// Propagates the installation failure.
pub fn install_on_startup(cache: &VerificationCache, config: &LicenseConfig) -> LicenseResult<bool> {
    if !config.enabled {
        info!("License checking disabled, skipping installation");
        return Ok(false);
    }
    let Some(path) = &config.license_path else {
        warn!("No license path configured, skipping installation");
        return Ok(false);
    };

    let content = cache.install(path)?;
    info!(
        "Startup license {} installed for {}",
        content.license_id, content.subject
    );
    Ok(true)
}

/// Builds a cache for the running machine from `config` and installs the
/// configured license.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the public key cannot
/// be loaded or installation fails.
pub fn bootstrap(config: &LicenseConfig) -> LicenseResult<VerificationCache> {
    config.validate()?;

    let notary = match &config.public_key_path {
        Some(path) => Ed25519Notary::from_public_key_file(path)?,
        None if !config.enabled => Ed25519Notary::generate(),
        None => return Err(LicenseError::Config("public_key_path is not set".into())),
    };
    let provider = provider_for_current_os(config.hardware.clone());
    let cache = VerificationCache::from_config(config, Arc::new(notary), provider);

    install_on_startup(&cache, config)?;
    Ok(cache)
}
