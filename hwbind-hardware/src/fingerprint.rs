//! The hardware record a license is bound to.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hardware identifiers of a machine.
///
/// Used both as the "expected" record embedded in a license and as the
/// "current" record collected from the running host. An empty field means
/// the dimension is unknown (current side) or unconstrained (expected side).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fingerprint {
    /// Platform-reported processor identifier.
    pub cpu_serial: String,
    /// Mainboard (baseboard) serial number.
    pub main_board_serial: String,
    /// Non-loopback, non-link-local host addresses, lower-cased.
    pub ip_addresses: Vec<String>,
    /// MAC addresses formatted `XX-XX-XX-XX-XX-XX`, upper-cased.
    pub mac_addresses: Vec<String>,
}

impl Fingerprint {
    /// Returns true if every field is empty.
    ///
    /// As an expected record this matches any machine.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.cpu_serial.trim().is_empty()
            && self.main_board_serial.trim().is_empty()
            && self.ip_addresses.is_empty()
            && self.mac_addresses.is_empty()
    }

    /// Returns a short, stable identifier for log lines.
    ///
    /// Base64 of the first 16 bytes of a SHA-256 over all fields.
    #[must_use]
    pub fn short_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.cpu_serial.as_bytes());
        hasher.update(b"|");
        hasher.update(self.main_board_serial.as_bytes());
        hasher.update(b"|");
        hasher.update(self.ip_addresses.join(",").as_bytes());
        hasher.update(b"|");
        hasher.update(self.mac_addresses.join(",").as_bytes());
        let hash = hasher.finalize();
        BASE64.encode(&hash[..16])
    }
}
