//! Ed25519 notary.
//!
//! Certificates use the format `base64url(payload).base64url(signature)`,
//! where the payload is the JSON-encoded [`LicenseContent`].
//!
//! The signature covers `payload_b64.as_bytes()` (the base64url-encoded
//! payload string, not the decoded JSON).

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use std::fs;
use std::path::Path;

use crate::content::{Certificate, LicenseContent};
use crate::error::{LicenseError, LicenseResult};
use crate::notary::{LicenseNotary, NotaryError};

/// Ed25519-backed [`LicenseNotary`].
///
/// Built from a public key it can only verify; built from a secret seed it
/// can also sign.
#[derive(Debug, Clone)]
pub struct Ed25519Notary {
    verifying_key: VerifyingKey,
    signing_key: Option<SigningKey>,
}

impl Ed25519Notary {
    /// Creates a verify-only notary from a 32-byte public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid curve point.
    pub fn from_public_key(public_key: &[u8; 32]) -> Result<Self, NotaryError> {
        let verifying_key = VerifyingKey::from_bytes(public_key)
            .map_err(|_| NotaryError::Format("invalid public key".to_string()))?;
        Ok(Self {
            verifying_key,
            signing_key: None,
        })
    }

    /// Creates a signing notary from a 32-byte secret seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self {
            verifying_key: signing_key.verifying_key(),
            signing_key: Some(signing_key),
        }
    }

    /// Generates a new random signing notary.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            verifying_key: signing_key.verifying_key(),
            signing_key: Some(signing_key),
        }
    }

    /// Loads a verify-only notary from a public key file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no valid key.
    pub fn from_public_key_file(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let key = read_key_file(path.as_ref())?;
        Self::from_public_key(&key).map_err(LicenseError::from)
    }

    /// Loads a signing notary from a secret seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no 32-byte seed.
    pub fn from_seed_file(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let seed = read_key_file(path.as_ref())?;
        Ok(Self::from_seed(&seed))
    }

    /// Returns the raw 32-byte public key.
    #[must_use]
    pub fn public_key(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Returns the raw 32-byte secret seed, if this notary can sign.
    #[must_use]
    pub fn seed(&self) -> Option<[u8; 32]> {
        self.signing_key.as_ref().map(SigningKey::to_bytes)
    }

    /// Returns true if this notary holds a secret key.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Reads a certificate's content without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a well-formed certificate.
    pub fn read_unverified(bytes: &[u8]) -> Result<LicenseContent, NotaryError> {
        let (payload_b64, _) = Self::split(bytes)?;
        Self::decode_payload(payload_b64)
    }

    /// Splits `payload.signature`.
    fn split(bytes: &[u8]) -> Result<(&str, &str), NotaryError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| NotaryError::Format("certificate is not UTF-8 text".to_string()))?
            .trim();

        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 2 {
            return Err(NotaryError::Format(
                "certificate must have exactly two parts separated by a dot".to_string(),
            ));
        }
        Ok((parts[0], parts[1]))
    }

    fn decode_payload(payload_b64: &str) -> Result<LicenseContent, NotaryError> {
        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| NotaryError::Format(format!("invalid payload base64: {e}")))?;

        serde_json::from_slice(&payload_json)
            .map_err(|e| NotaryError::Payload(format!("invalid payload JSON: {e}")))
    }
}

impl LicenseNotary for Ed25519Notary {
    fn sign(&self, content: &LicenseContent) -> Result<Certificate, NotaryError> {
        let signing_key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| NotaryError::Signing("no secret key loaded".to_string()))?;

        let payload_json =
            serde_json::to_vec(content).map_err(|e| NotaryError::Payload(e.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);
        let signature = signing_key.sign(payload_b64.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

        Ok(Certificate::from(format!("{payload_b64}.{signature_b64}")))
    }

    fn verify(&self, certificate: &Certificate) -> Result<LicenseContent, NotaryError> {
        let (payload_b64, signature_b64) = Self::split(certificate.as_bytes())?;

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| NotaryError::Format(format!("invalid signature base64: {e}")))?;
        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|_| NotaryError::Format("invalid signature length".to_string()))?;

        self.verifying_key
            .verify(payload_b64.as_bytes(), &signature)
            .map_err(|_| NotaryError::Signature)?;

        Self::decode_payload(payload_b64)
    }

    fn decode(&self, bytes: &[u8]) -> Result<LicenseContent, NotaryError> {
        Self::read_unverified(bytes)
    }
}

/// Encodes key bytes the way key files store them (standard base64).
#[must_use]
pub fn encode_key(key: &[u8; 32]) -> String {
    STANDARD.encode(key)
}

/// Reads a 32-byte key stored either raw or as base64 text.
///
/// # Errors
///
/// Returns [`LicenseError::Io`] if the file is unreadable and
/// [`LicenseError::Config`] if it holds no 32-byte key.
pub fn read_key_file(path: &Path) -> LicenseResult<[u8; 32]> {
    let bytes = fs::read(path)?;
    if let Ok(raw) = <[u8; 32]>::try_from(bytes.as_slice()) {
        return Ok(raw);
    }

    let text = String::from_utf8_lossy(&bytes);
    let decoded = STANDARD.decode(text.trim()).map_err(|e| {
        LicenseError::Config(format!("key file {} is not base64: {e}", path.display()))
    })?;
    <[u8; 32]>::try_from(decoded.as_slice()).map_err(|_| {
        LicenseError::Config(format!(
            "key file {} must hold 32 bytes, found {}",
            path.display(),
            decoded.len()
        ))
    })
}
