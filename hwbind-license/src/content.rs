//! License content and its signed envelope.

use chrono::{DateTime, Utc};
use hwbind_hardware::Fingerprint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LicenseError, LicenseResult};

/// Version of the content layout written by this crate.
pub const PROTOCOL_VERSION: &str = "1";

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_string()
}

/// The decoded, signed payload of a license.
///
/// The hardware binding lives in `extra` as a serialized [`Fingerprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseContent {
    /// Unique license identifier.
    pub license_id: Uuid,
    /// Content layout version.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Product the license is issued for.
    pub subject: String,
    /// Who issued the license.
    #[serde(default)]
    pub issuer: String,
    /// Who the license is issued to.
    #[serde(default)]
    pub holder: String,
    /// When the license was created.
    pub issued_at: DateTime<Utc>,
    /// Start of validity, if bounded.
    #[serde(default)]
    pub not_before: Option<DateTime<Utc>>,
    /// End of validity, if bounded.
    #[serde(default)]
    pub not_after: Option<DateTime<Utc>>,
    /// Free text shown to operators.
    #[serde(default)]
    pub info: Option<String>,
    /// Application payload; carries the bound fingerprint.
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

impl LicenseContent {
    /// Creates unbounded, unbound content for `subject`, issued now.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            license_id: Uuid::new_v4(),
            protocol_version: default_protocol_version(),
            subject: subject.into(),
            issuer: String::new(),
            holder: String::new(),
            issued_at: Utc::now(),
            not_before: None,
            not_after: None,
            info: None,
            extra: None,
        }
    }

    /// Sets the validity window.
    #[must_use]
    pub fn valid_between(mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self.not_after = Some(not_after);
        self
    }

    /// Sets the holder.
    #[must_use]
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Binds the license to `fingerprint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fingerprint cannot be serialized.
    pub fn bound_to(mut self, fingerprint: &Fingerprint) -> LicenseResult<Self> {
        self.extra = Some(serde_json::to_value(fingerprint)?);
        Ok(self)
    }

    /// Returns the fingerprint this license is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Malformed`] if `extra` is absent or is not a
    /// fingerprint record.
    pub fn bound_fingerprint(&self) -> LicenseResult<Fingerprint> {
        let extra = self
            .extra
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| LicenseError::Malformed("license carries no hardware binding".into()))?;

        if !extra.is_object() {
            return Err(LicenseError::Malformed(
                "hardware binding is not an object".into(),
            ));
        }
        serde_json::from_value(extra.clone())
            .map_err(|e| LicenseError::Malformed(format!("invalid hardware binding: {e}")))
    }

    /// Whole days from `now` until `not_after`, truncated toward zero.
    /// `None` for licenses without an end date.
    #[must_use]
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.not_after.map(|end| (end - now).num_days())
    }
}

/// A signed license as stored on disk. Opaque to everything but the notary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the certificate, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Certificate {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for Certificate {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}
