//! The signing/verification seam.

use thiserror::Error;

use crate::content::{Certificate, LicenseContent};

/// Failures reported by a notary.
#[derive(Debug, Error)]
pub enum NotaryError {
    /// Certificate bytes do not have the expected envelope shape.
    #[error("invalid certificate format: {0}")]
    Format(String),

    /// Signature does not match the payload.
    #[error("certificate signature invalid")]
    Signature,

    /// Payload is not valid license content.
    #[error("invalid certificate payload: {0}")]
    Payload(String),

    /// Notary holds no private key.
    #[error("notary cannot sign: {0}")]
    Signing(String),
}

/// Signs and verifies license certificates.
///
/// Implementations own the certificate format and key material; the rest of
/// the crate only sees [`LicenseContent`] and opaque [`Certificate`]s.
pub trait LicenseNotary: Send + Sync {
    /// Signs `content` into a certificate.
    fn sign(&self, content: &LicenseContent) -> Result<Certificate, NotaryError>;

    /// Checks the signature and returns the signed content.
    fn verify(&self, certificate: &Certificate) -> Result<LicenseContent, NotaryError>;

    /// Reads the content without checking the signature.
    fn decode(&self, bytes: &[u8]) -> Result<LicenseContent, NotaryError>;
}
