//! Thread-safe, time-bounded memo of successful verifications.

use hwbind_hardware::{Fingerprint, FingerprintProvider};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::LicenseConfig;
use crate::content::LicenseContent;
use crate::error::LicenseResult;
use crate::manager::{LicenseManager, LicenseState};
use crate::notary::LicenseNotary;

/// How long a successful verification is trusted by default.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Marker value meaning "no success recorded".
const NEVER: u64 = 0;

/// Shares a [`LicenseManager`] between threads and caches successes.
///
/// - A success is trusted for `ttl`; calls inside that window return
///   without touching the manager
/// - A failure clears the marker, so the next call verifies again
/// - Install and uninstall take the write lock and clear the marker;
///   verification runs under the read lock
pub struct VerificationCache {
    manager: RwLock<LicenseManager>,
    /// Nanoseconds since `epoch` plus one at the last success, or [`NEVER`].
    last_success: AtomicU64,
    epoch: Instant,
    ttl: Duration,
}

impl VerificationCache {
    /// Wraps `manager` with the default TTL.
    pub fn new(manager: LicenseManager) -> Self {
        Self::with_ttl(manager, DEFAULT_CACHE_TTL)
    }

    /// Wraps `manager`, trusting successes for `ttl`.
    pub fn with_ttl(manager: LicenseManager, ttl: Duration) -> Self {
        Self {
            manager: RwLock::new(manager),
            last_success: AtomicU64::new(NEVER),
            epoch: Instant::now(),
            ttl,
        }
    }

    /// Builds a manager and cache from configuration.
    pub fn from_config(
        config: &LicenseConfig,
        notary: Arc<dyn LicenseNotary>,
        provider: Arc<dyn FingerprintProvider>,
    ) -> Self {
        let mut manager = LicenseManager::new(notary, provider)
            .with_expiry_warning_days(config.expiry_warning_days);
        if let Some(subject) = &config.subject {
            manager = manager.with_subject(subject.clone());
        }
        Self::with_ttl(manager, config.cache_ttl())
    }

    /// Returns the success TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Installs the license at `path` under the write lock.
    ///
    /// # Errors
    ///
    /// See [`LicenseManager::install`].
    pub fn install(&self, path: impl AsRef<Path>) -> LicenseResult<LicenseContent> {
        let mut manager = self.write_manager();
        self.reset();
        manager.install(path)
    }

    /// Removes the installed license under the write lock.
    pub fn uninstall(&self) {
        let mut manager = self.write_manager();
        self.reset();
        manager.uninstall();
    }

    /// Returns true if the license is valid, serving recent successes from
    /// the cache.
    pub fn verify(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                debug!("License verification failed: {}", e);
                false
            }
        }
    }

    /// Like [`VerificationCache::verify`] but reports why verification
    /// failed.
    ///
    /// # Errors
    ///
    /// See [`LicenseManager::verify`].
    pub fn check(&self) -> LicenseResult<()> {
        if self.is_fresh() {
            return Ok(());
        }
        self.verify_content().map(drop)
    }

    /// Verifies the installed license without consulting the cache and
    /// returns the verified content. The outcome updates the cache like a
    /// miss in [`VerificationCache::check`].
    ///
    /// # Errors
    ///
    /// See [`LicenseManager::verify`].
    pub fn verify_content(&self) -> LicenseResult<LicenseContent> {
        let manager = self.read_manager();
        match manager.verify() {
            Ok(content) => {
                // Recorded while the read guard is held so an install
                // waiting on the write lock always clears it afterwards.
                self.last_success.store(self.ticks(), Ordering::Release);
                Ok(content)
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Returns the current machine's fingerprint.
    #[must_use]
    pub fn hardware_info(&self) -> Fingerprint {
        self.read_manager().hardware_info()
    }

    /// Returns whether a license is installed.
    #[must_use]
    pub fn state(&self) -> LicenseState {
        self.read_manager().state()
    }

    fn is_fresh(&self) -> bool {
        let last = self.last_success.load(Ordering::Acquire);
        if last == NEVER {
            return false;
        }
        let age = Duration::from_nanos(self.ticks().saturating_sub(last));
        age < self.ttl
    }

    fn reset(&self) {
        self.last_success.store(NEVER, Ordering::Release);
    }

    fn ticks(&self) -> u64 {
        let nanos = u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX - 1);
        nanos + 1
    }

    fn read_manager(&self) -> RwLockReadGuard<'_, LicenseManager> {
        self.manager.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_manager(&self) -> RwLockWriteGuard<'_, LicenseManager> {
        self.manager.write().unwrap_or_else(PoisonError::into_inner)
    }
}
