//! Lifecycle of the single installed license.

use chrono::{DateTime, Utc};
use hwbind_hardware::{Fingerprint, FingerprintProvider, HostInfo};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::content::{Certificate, LicenseContent};
use crate::error::{LicenseError, LicenseResult};
use crate::matcher::match_fingerprints;
use crate::notary::LicenseNotary;

/// Days before expiry from which a successful verification logs a warning.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 15;

/// Whether a license is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseState {
    /// Nothing installed, or the last install failed.
    Uninstalled,
    /// A certificate passed installation and is held for verification.
    Installed,
}

/// Installs, verifies and authors hardware-bound licenses.
///
/// Not synchronized; wrap in [`crate::VerificationCache`] to share between
/// threads.
pub struct LicenseManager {
    notary: Arc<dyn LicenseNotary>,
    provider: Arc<dyn FingerprintProvider>,
    subject: Option<String>,
    expiry_warning_days: i64,
    certificate: Option<Certificate>,
}

impl LicenseManager {
    /// Creates a manager with nothing installed.
    pub fn new(notary: Arc<dyn LicenseNotary>, provider: Arc<dyn FingerprintProvider>) -> Self {
        Self {
            notary,
            provider,
            subject: None,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            certificate: None,
        }
    }

    /// Requires installed licenses to carry this subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the expiry warning threshold in days.
    #[must_use]
    pub fn with_expiry_warning_days(mut self, days: i64) -> Self {
        self.expiry_warning_days = days;
        self
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LicenseState {
        if self.certificate.is_some() {
            LicenseState::Installed
        } else {
            LicenseState::Uninstalled
        }
    }

    /// Returns the fingerprint of the machine the process runs on.
    #[must_use]
    pub fn hardware_info(&self) -> Fingerprint {
        self.provider.hardware_info()
    }

    /// Installs the license file at `path`, replacing any installed license.
    ///
    /// The previous license is removed before the file is read, so a failed
    /// install leaves nothing installed.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Install`] wrapping the cause and carrying the
    /// current machine's fingerprint.
    pub fn install(&mut self, path: impl AsRef<Path>) -> LicenseResult<LicenseContent> {
        let path = path.as_ref();
        info!("Installing license from {}", path.display());
        self.uninstall();

        let result = fs::read(path)
            .map_err(LicenseError::from)
            .and_then(|bytes| self.install_inner(Certificate::from(bytes)));
        self.finish_install(result)
    }

    /// Installs an in-memory certificate, replacing any installed license.
    ///
    /// # Errors
    ///
    /// Same as [`LicenseManager::install`].
    pub fn install_certificate(&mut self, certificate: Certificate) -> LicenseResult<LicenseContent> {
        self.uninstall();
        let result = self.install_inner(certificate);
        self.finish_install(result)
    }

    fn install_inner(&mut self, certificate: Certificate) -> LicenseResult<LicenseContent> {
        let content = self.validate_certificate(&certificate, Utc::now())?;
        self.certificate = Some(certificate);
        Ok(content)
    }

    fn finish_install(&self, result: LicenseResult<LicenseContent>) -> LicenseResult<LicenseContent> {
        match result {
            Ok(content) => {
                info!(
                    "License {} installed for {} (holder: {}, expires: {})",
                    content.license_id,
                    content.subject,
                    if content.holder.is_empty() { "-" } else { content.holder.as_str() },
                    content
                        .not_after
                        .map_or_else(|| "never".to_string(), |t| t.to_rfc3339()),
                );
                Ok(content)
            }
            Err(e) => {
                error!("License installation failed: {}", e);
                let hardware = self.provider.hardware_info();
                let host = HostInfo::collect();
                info!(
                    "Hardware of {} ({} {}, {}): cpu={:?} board={:?} ips={:?} macs={:?}",
                    host.hostname,
                    host.os_name,
                    host.os_version,
                    host.arch,
                    hardware.cpu_serial,
                    hardware.main_board_serial,
                    hardware.ip_addresses,
                    hardware.mac_addresses,
                );
                Err(LicenseError::install(e, hardware))
            }
        }
    }

    /// Removes the installed license, if any.
    pub fn uninstall(&mut self) {
        if self.certificate.take().is_some() {
            info!("License uninstalled");
        }
    }

    /// Verifies the installed license against the current time and machine.
    ///
    /// Logs a warning when the license expires within the warning threshold.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::NotInstalled`] if nothing is installed, or the
    /// first violated check otherwise.
    pub fn verify(&self) -> LicenseResult<LicenseContent> {
        let certificate = self.certificate.as_ref().ok_or(LicenseError::NotInstalled)?;
        self.validate_certificate(certificate, Utc::now())
    }

    /// Signs `content` into a certificate.
    ///
    /// # Errors
    ///
    /// Rejects content that is already expired, has an inverted validity
    /// window or carries no hardware binding; also fails if the notary
    /// cannot sign.
    pub fn create(&self, content: &LicenseContent) -> LicenseResult<Certificate> {
        validate_time_window(content, Utc::now())?;
        content.bound_fingerprint()?;
        let certificate = self.notary.sign(content)?;
        info!("License {} created for {}", content.license_id, content.subject);
        Ok(certificate)
    }

    /// Reads license content without checking its signature or validity.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a certificate.
    pub fn decode(&self, bytes: &[u8]) -> LicenseResult<LicenseContent> {
        self.notary.decode(bytes).map_err(LicenseError::from)
    }

    fn validate_certificate(
        &self,
        certificate: &Certificate,
        now: DateTime<Utc>,
    ) -> LicenseResult<LicenseContent> {
        let content = self.notary.verify(certificate)?;
        self.validate(&content, now)?;
        Ok(content)
    }

    fn validate(&self, content: &LicenseContent, now: DateTime<Utc>) -> LicenseResult<()> {
        if let Some(expected) = &self.subject {
            if *expected != content.subject {
                return Err(LicenseError::SubjectMismatch {
                    expected: expected.clone(),
                    actual: content.subject.clone(),
                });
            }
        }
        validate_time_window(content, now)?;

        let expected = content.bound_fingerprint()?;
        let current = self.provider.hardware_info();
        let result = match_fingerprints(&expected, &current);
        if let Some(field) = result.first_mismatch() {
            debug!("License {} rejected: {} not authorized", content.license_id, field);
            return Err(LicenseError::HardwareMismatch { field });
        }

        if let Some(days) = content.days_until_expiry(now) {
            if (0..self.expiry_warning_days).contains(&days) {
                warn!(
                    "License {} for {} expires in {} days",
                    content.license_id, content.subject, days
                );
            }
        }
        Ok(())
    }
}

/// Checks `not_before <= not_after`, then that `now` lies inside the window.
fn validate_time_window(content: &LicenseContent, now: DateTime<Utc>) -> LicenseResult<()> {
    if let (Some(start), Some(end)) = (content.not_before, content.not_after) {
        if start > end {
            return Err(LicenseError::InvalidTimeWindow);
        }
    }
    if let Some(start) = content.not_before {
        if now < start {
            return Err(LicenseError::NotYetValid(start));
        }
    }
    if let Some(end) = content.not_after {
        if now > end {
            return Err(LicenseError::Expired(end));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let ok = LicenseContent::new("app").valid_between(now - Duration::days(1), now + Duration::days(1));
        assert!(validate_time_window(&ok, now).is_ok());

        let inverted = LicenseContent::new("app").valid_between(now + Duration::days(2), now + Duration::days(1));
        assert!(matches!(
            validate_time_window(&inverted, now),
            Err(LicenseError::InvalidTimeWindow)
        ));

        let future = LicenseContent::new("app").valid_between(now + Duration::days(1), now + Duration::days(2));
        assert!(matches!(
            validate_time_window(&future, now),
            Err(LicenseError::NotYetValid(_))
        ));

        let past = LicenseContent::new("app").valid_between(now - Duration::days(2), now - Duration::days(1));
        assert!(matches!(validate_time_window(&past, now), Err(LicenseError::Expired(_))));

        assert!(validate_time_window(&LicenseContent::new("app"), now).is_ok());
    }
}
