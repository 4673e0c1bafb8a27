//! Fingerprint providers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use crate::command::{ProbeBackend, SystemBackend};
use crate::config::ProbeConfig;
use crate::fingerprint::Fingerprint;
use crate::network;
use crate::probe::{first_non_empty, PlatformProbes};

/// Supplies the hardware fingerprint of the machine the process runs on.
pub trait FingerprintProvider: Send + Sync {
    /// Returns the current machine's fingerprint.
    ///
    /// Never fails: fields that cannot be determined are left empty.
    fn hardware_info(&self) -> Fingerprint;
}

/// Compute-once holder for a collected fingerprint.
///
/// Concurrent first callers block until the single collection finishes and
/// then all observe the same value.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    cell: OnceLock<Fingerprint>,
}

impl FingerprintCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached fingerprint, running `collect` if this is the
    /// first call.
    pub fn get_or_collect(&self, collect: impl FnOnce() -> Fingerprint) -> &Fingerprint {
        self.cell.get_or_init(collect)
    }
}

/// Provider that probes the operating system through a [`ProbeBackend`].
pub struct ProbeProvider {
    probes: PlatformProbes,
    config: ProbeConfig,
    backend: Arc<dyn ProbeBackend>,
    cache: FingerprintCache,
}

impl ProbeProvider {
    /// Creates a provider for the given platform chains on the real system.
    #[must_use]
    pub fn new(probes: PlatformProbes, config: ProbeConfig) -> Self {
        let backend = Arc::new(SystemBackend::new(config.command_timeout()));
        Self::with_backend(probes, config, backend)
    }

    /// Creates a provider reading through a custom backend.
    #[must_use]
    pub fn with_backend(
        probes: PlatformProbes,
        config: ProbeConfig,
        backend: Arc<dyn ProbeBackend>,
    ) -> Self {
        Self {
            probes,
            config,
            backend,
            cache: FingerprintCache::new(),
        }
    }

    fn collect(&self) -> Fingerprint {
        let started = Instant::now();
        let backend = self.backend.as_ref();

        let interfaces = backend.interfaces();
        let identity = network::summarize(&interfaces, &self.config.excluded_interface_prefixes);
        debug!(
            "Network probe saw {} interfaces, kept {} addresses",
            interfaces.len(),
            identity.ip_addresses.len()
        );

        let fingerprint = Fingerprint {
            cpu_serial: first_non_empty(self.probes.cpu_serial, backend),
            main_board_serial: first_non_empty(self.probes.main_board_serial, backend),
            ip_addresses: identity.ip_addresses,
            mac_addresses: identity.mac_addresses,
        };

        info!(
            "Collected {} hardware fingerprint {} in {}ms",
            self.probes.name,
            fingerprint.short_id(),
            started.elapsed().as_millis()
        );
        fingerprint
    }
}

impl FingerprintProvider for ProbeProvider {
    fn hardware_info(&self) -> Fingerprint {
        self.cache.get_or_collect(|| self.collect()).clone()
    }
}

/// Providers handed out by [`provider_for_current_os`], one per configuration.
static SHARED_PROVIDERS: OnceLock<Mutex<HashMap<ProbeConfig, Arc<dyn FingerprintProvider>>>> =
    OnceLock::new();

/// Returns the provider matching the operating system at runtime.
///
/// Calls with equal configuration share one provider, so the machine is
/// probed at most once per process for each configuration.
#[must_use]
pub fn provider_for_current_os(config: ProbeConfig) -> Arc<dyn FingerprintProvider> {
    let shared = SHARED_PROVIDERS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut providers = shared.lock().unwrap_or_else(PoisonError::into_inner);
    providers
        .entry(config)
        .or_insert_with_key(|config| {
            let provider: Arc<dyn FingerprintProvider> =
                Arc::new(ProbeProvider::new(PlatformProbes::current(), config.clone()));
            provider
        })
        .clone()
}
