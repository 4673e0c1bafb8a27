//! Hardware fingerprint collection for machine-bound licenses.
//!
//! This crate answers one question: "which machine am I running on?"
//!
//! - CPU and mainboard serials come from OS utilities and system files,
//!   tried in a fixed order until one yields a value
//! - IP and MAC addresses come from the network interfaces that look like
//!   real, routable NICs (loopback, down, alias and container interfaces
//!   are skipped)
//!
//! # Design Principles
//!
//! - **Absence is a value**: a probe that fails, times out or prints nothing
//!   produces an empty field, never an error
//! - **Collect once**: hardware does not change while the process runs, so a
//!   provider probes the system a single time and serves the memoized result
//! - **Bounded**: every external command runs under a timeout

mod command;
mod config;
mod fingerprint;
mod host;
pub mod network;
pub mod probe;
mod provider;

pub use command::{ProbeBackend, SystemBackend};
pub use config::{ProbeConfig, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_EXCLUDED_PREFIXES};
pub use fingerprint::Fingerprint;
pub use host::HostInfo;
pub use network::InterfaceRecord;
pub use probe::{Extract, PlatformProbes, ProbeSource};
pub use provider::{provider_for_current_os, FingerprintCache, FingerprintProvider, ProbeProvider};
