//! Hardware-bound licensing.
//!
//! A license is signed content whose `extra` payload names the machine it
//! may run on. This crate handles:
//! - Installing a license file and checking its signature, subject and
//!   validity window
//! - Comparing the bound fingerprint with the running machine
//! - Serving repeated verifications from a short-lived success cache
//! - Authoring licenses for a given machine
//!
//! # Design Principles
//!
//! - **Fail closed**: a bound dimension the machine cannot report does not
//!   match
//! - **Never cache failure**: after any failed verification the next call
//!   verifies again, so a fixed environment is picked up immediately
//! - **One reason**: a hardware mismatch names only the first failing
//!   dimension
//!
//! # Certificate Format
//!
//! The bundled [`Ed25519Notary`] writes `base64url(payload).base64url(signature)`
//! where the payload is the JSON-encoded [`LicenseContent`]. Other formats
//! plug in through [`LicenseNotary`].

mod cache;
mod config;
mod content;
mod ed25519;
mod error;
mod manager;
mod matcher;
mod notary;
mod startup;

pub use cache::{VerificationCache, DEFAULT_CACHE_TTL};
pub use config::LicenseConfig;
pub use content::{Certificate, LicenseContent, PROTOCOL_VERSION};
pub use ed25519::{encode_key, read_key_file, Ed25519Notary};
pub use error::{HardwareField, LicenseError, LicenseResult};
pub use manager::{LicenseManager, LicenseState, DEFAULT_EXPIRY_WARNING_DAYS};
pub use matcher::{match_fingerprints, MatchResult};
pub use notary::{LicenseNotary, NotaryError};
pub use startup::{bootstrap, install_on_startup};
