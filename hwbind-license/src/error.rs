//! Error types for license installation and verification.

use chrono::{DateTime, Utc};
use hwbind_hardware::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::notary::NotaryError;

/// Hardware dimension a license can be bound to.
///
/// Declaration order is the order in which mismatches are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareField {
    /// IP address list.
    Ip,
    /// MAC address list.
    Mac,
    /// Mainboard serial.
    MainBoard,
    /// CPU serial.
    Cpu,
}

impl fmt::Display for HardwareField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ip => "IP address",
            Self::Mac => "MAC address",
            Self::MainBoard => "main-board serial",
            Self::Cpu => "CPU serial",
        })
    }
}

/// Licensing errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Verification requested with no license installed.
    #[error("license not installed")]
    NotInstalled,

    /// The certificate signature does not verify.
    #[error("license signature invalid")]
    InvalidSignature,

    /// The certificate is structurally broken.
    #[error("invalid license certificate: {0}")]
    InvalidCertificate(String),

    /// The license lacks hardware-binding data.
    #[error("malformed license: {0}")]
    Malformed(String),

    /// The machine does not match the license binding.
    #[error("{field} not authorized")]
    HardwareMismatch {
        /// First mismatching dimension.
        field: HardwareField,
    },

    /// License validity ended.
    #[error("license expired on {0}")]
    Expired(DateTime<Utc>),

    /// License validity has not started.
    #[error("license not valid before {0}")]
    NotYetValid(DateTime<Utc>),

    /// `not_before` is later than `not_after`.
    #[error("license start date is after its expiration date")]
    InvalidTimeWindow,

    /// License issued for a different product.
    #[error("license subject mismatch: expected {expected}, found {actual}")]
    SubjectMismatch {
        /// Configured subject.
        expected: String,
        /// Subject in the license.
        actual: String,
    },

    /// Installation failed; carries the machine's fingerprint for diagnosis.
    #[error("license installation failed: {source}")]
    Install {
        /// Underlying failure.
        #[source]
        source: Box<LicenseError>,
        /// Fingerprint of the machine the installation ran on.
        hardware: Box<Fingerprint>,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Wraps `cause` as an installation failure on `hardware`.
    #[must_use]
    pub fn install(cause: LicenseError, hardware: Fingerprint) -> Self {
        Self::Install {
            source: Box::new(cause),
            hardware: Box::new(hardware),
        }
    }

    /// Returns the underlying error, looking through `Install`.
    #[must_use]
    pub fn root_cause(&self) -> &LicenseError {
        match self {
            Self::Install { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the mismatching hardware dimension, if that is the cause.
    #[must_use]
    pub fn mismatched_field(&self) -> Option<HardwareField> {
        match self.root_cause() {
            Self::HardwareMismatch { field } => Some(*field),
            _ => None,
        }
    }
}

impl From<NotaryError> for LicenseError {
    fn from(err: NotaryError) -> Self {
        match err {
            NotaryError::Signature => Self::InvalidSignature,
            other => Self::InvalidCertificate(other.to_string()),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
