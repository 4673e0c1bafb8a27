//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use hwbind_hardware::{Fingerprint, FingerprintProvider};
use hwbind_license::{
    Certificate, Ed25519Notary, LicenseContent, LicenseManager, LicenseNotary, NotaryError,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Fixed seed for a deterministic Ed25519 key pair.
pub const TEST_SEED: [u8; 32] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32,
];

/// Signing notary from [`TEST_SEED`].
pub fn test_notary() -> Ed25519Notary {
    Ed25519Notary::from_seed(&TEST_SEED)
}

/// Verify-only notary for [`TEST_SEED`]'s public key.
pub fn verify_only_notary() -> Ed25519Notary {
    Ed25519Notary::from_public_key(&test_notary().public_key()).unwrap()
}

pub fn fingerprint(cpu: &str, board: &str, ips: &[&str], macs: &[&str]) -> Fingerprint {
    Fingerprint {
        cpu_serial: cpu.to_string(),
        main_board_serial: board.to_string(),
        ip_addresses: ips.iter().map(|s| (*s).to_string()).collect(),
        mac_addresses: macs.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// The machine most tests run on.
pub fn machine() -> Fingerprint {
    fingerprint(
        "BFEBFBFF000906EA",
        "PF2ABCDE",
        &["192.168.1.20", "10.8.0.3"],
        &["00-15-5D-01-02-03"],
    )
}

/// Content valid from yesterday for `days` more days, bound to `bound`.
pub fn content_for(bound: &Fingerprint, days: i64) -> LicenseContent {
    let now = Utc::now();
    LicenseContent::new("hwbind-test")
        .with_holder("ACME Corp")
        .valid_between(now - Duration::days(1), now + Duration::days(days))
        .bound_to(bound)
        .unwrap()
}

/// Signs `content` with the test key and writes it to `dir/name`.
pub fn write_license(dir: &Path, name: &str, content: &LicenseContent) -> PathBuf {
    let certificate = test_notary().sign(content).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, certificate.as_bytes()).unwrap();
    path
}

/// Manager over the test key pair and a fixed machine.
pub fn manager_on(machine: Fingerprint) -> LicenseManager {
    LicenseManager::new(Arc::new(test_notary()), Arc::new(FixedProvider::new(machine)))
}

// ── Providers ────────────────────────────────────────────────────

/// Provider reporting a fixed, replaceable fingerprint.
pub struct FixedProvider {
    fingerprint: Mutex<Fingerprint>,
    pub calls: AtomicUsize,
}

impl FixedProvider {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint: Mutex::new(fingerprint),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, fingerprint: Fingerprint) {
        *self.fingerprint.lock().unwrap() = fingerprint;
    }
}

impl FingerprintProvider for FixedProvider {
    fn hardware_info(&self) -> Fingerprint {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fingerprint.lock().unwrap().clone()
    }
}

// ── Notaries ─────────────────────────────────────────────────────

/// Notary returning replaceable content and counting verifications.
pub struct CountingNotary {
    content: Mutex<LicenseContent>,
    failing: AtomicBool,
    pub verify_calls: AtomicUsize,
}

impl CountingNotary {
    pub fn new(content: LicenseContent) -> Self {
        Self {
            content: Mutex::new(content),
            failing: AtomicBool::new(false),
            verify_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_content(&self, content: LicenseContent) {
        *self.content.lock().unwrap() = content;
    }

    /// Makes every verification report a bad signature.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl LicenseNotary for CountingNotary {
    fn sign(&self, _content: &LicenseContent) -> Result<Certificate, NotaryError> {
        Ok(Certificate::from(b"stub".to_vec()))
    }

    fn verify(&self, _certificate: &Certificate) -> Result<LicenseContent, NotaryError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotaryError::Signature);
        }
        Ok(self.content.lock().unwrap().clone())
    }

    fn decode(&self, _bytes: &[u8]) -> Result<LicenseContent, NotaryError> {
        Ok(self.content.lock().unwrap().clone())
    }
}

/// Writes a placeholder certificate file for stub notaries.
pub fn stub_license_file(dir: &Path) -> PathBuf {
    let path = dir.join("stub.lic");
    std::fs::write(&path, b"stub").unwrap();
    path
}

// ── Log capture ──────────────────────────────────────────────────

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with logs captured on the current thread.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
