//! Operator commands for hardware-bound licenses.
//!
//! The `hwbind` binary is a thin argument parser over these functions.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use hwbind_hardware::{provider_for_current_os, Fingerprint, HostInfo, ProbeConfig};
use hwbind_license::{
    bootstrap, encode_key, Ed25519Notary, LicenseConfig, LicenseContent, LicenseManager,
};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// File name of the secret signing seed written by [`keygen`].
pub const SIGNING_KEY_FILE: &str = "license-signing.key";

/// File name of the public key written by [`keygen`].
pub const PUBLIC_KEY_FILE: &str = "license-public.key";

/// `<config dir>/hwbind/license.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hwbind").join("license.toml"))
}

// ── info ─────────────────────────────────────────────────────────

/// What `hwbind info` prints.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub fingerprint_id: String,
    pub hardware: Fingerprint,
    pub host: HostInfo,
}

/// Probes the current machine.
pub fn collect_info(config: ProbeConfig) -> InfoReport {
    let hardware = provider_for_current_os(config).hardware_info();
    InfoReport {
        fingerprint_id: hardware.short_id(),
        hardware,
        host: HostInfo::collect(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn list_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Host:        {} ({} {}, {})",
            self.host.hostname, self.host.os_name, self.host.os_version, self.host.arch
        )?;
        writeln!(f, "Fingerprint: {}", self.fingerprint_id)?;
        writeln!(f, "  CPU:       {}", or_dash(&self.hardware.cpu_serial))?;
        writeln!(f, "  Board:     {}", or_dash(&self.hardware.main_board_serial))?;
        writeln!(f, "  IPs:       {}", list_or_dash(&self.hardware.ip_addresses))?;
        write!(f, "  MACs:      {}", list_or_dash(&self.hardware.mac_addresses))
    }
}

// ── keygen ───────────────────────────────────────────────────────

/// Paths written by [`keygen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    pub signing_key: PathBuf,
    pub public_key: PathBuf,
}

/// Generates a license signing key pair into `out_dir`.
///
/// Refuses to overwrite an existing signing key.
pub fn keygen(out_dir: &Path) -> Result<KeyFiles> {
    let files = KeyFiles {
        signing_key: out_dir.join(SIGNING_KEY_FILE),
        public_key: out_dir.join(PUBLIC_KEY_FILE),
    };
    if files.signing_key.exists() {
        bail!(
            "{} already exists; refusing to overwrite",
            files.signing_key.display()
        );
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let notary = Ed25519Notary::generate();
    let seed = notary
        .seed()
        .context("Generated notary has no signing key")?;

    fs::write(&files.signing_key, format!("{}\n", encode_key(&seed)))
        .context("Failed to write signing key")?;
    restrict_permissions(&files.signing_key)?;
    fs::write(&files.public_key, format!("{}\n", encode_key(&notary.public_key())))
        .context("Failed to write public key")?;

    info!("Wrote key pair to {}", out_dir.display());
    Ok(files)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

// ── issue ────────────────────────────────────────────────────────

/// Explicit binding values; each one given replaces the base value.
#[derive(Debug, Clone, Default)]
pub struct BindingOverrides {
    pub cpu: Option<String>,
    pub board: Option<String>,
    pub ips: Vec<String>,
    pub macs: Vec<String>,
}

impl BindingOverrides {
    /// Applies the overrides on top of `base`.
    pub fn apply(&self, mut base: Fingerprint) -> Fingerprint {
        if let Some(cpu) = &self.cpu {
            base.cpu_serial = cpu.clone();
        }
        if let Some(board) = &self.board {
            base.main_board_serial = board.clone();
        }
        if !self.ips.is_empty() {
            base.ip_addresses = self.ips.clone();
        }
        if !self.macs.is_empty() {
            base.mac_addresses = self.macs.clone();
        }
        base
    }
}

/// A license to author.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub subject: String,
    pub holder: Option<String>,
    pub issuer: Option<String>,
    pub info: Option<String>,
    pub days: i64,
    pub binding: Fingerprint,
}

/// Signs a license valid from now for `request.days` and writes it to `out`.
pub fn issue(signing_key: &Path, request: &IssueRequest, out: &Path) -> Result<LicenseContent> {
    if request.days <= 0 {
        bail!("--days must be positive, got {}", request.days);
    }
    let notary = Ed25519Notary::from_seed_file(signing_key)
        .with_context(|| format!("Failed to load signing key {}", signing_key.display()))?;

    let now = Utc::now();
    let mut content = LicenseContent::new(request.subject.clone())
        .valid_between(now, now + Duration::days(request.days))
        .bound_to(&request.binding)?;
    if let Some(holder) = &request.holder {
        content = content.with_holder(holder.clone());
    }
    if let Some(issuer) = &request.issuer {
        content = content.with_issuer(issuer.clone());
    }
    content.info = request.info.clone();

    let manager = LicenseManager::new(
        Arc::new(notary),
        provider_for_current_os(ProbeConfig::default()),
    );
    let certificate = manager.create(&content)?;
    fs::write(out, certificate.as_bytes())
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!("Issued license {} to {}", content.license_id, out.display());
    Ok(content)
}

// ── verify / inspect ─────────────────────────────────────────────

/// Builds the configuration for `hwbind verify`.
///
/// Explicit license and key paths override whatever the file says.
pub fn resolve_config(
    config: Option<&Path>,
    license: Option<&Path>,
    public_key: Option<&Path>,
) -> Result<LicenseConfig> {
    let explicit = match (license, public_key) {
        (Some(license), Some(key)) => Some((license, key)),
        (None, None) => None,
        _ => bail!("--license and --public-key must be given together"),
    };

    let mut resolved = match (config, explicit) {
        (Some(path), _) => LicenseConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(_)) => LicenseConfig::default(),
        (None, None) => {
            let path = default_config_path()
                .context("No configuration directory on this platform")?;
            LicenseConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
    };

    if let Some((license, key)) = explicit {
        resolved.enabled = true;
        resolved.license_path = Some(license.to_path_buf());
        resolved.public_key_path = Some(key.to_path_buf());
    }
    Ok(resolved)
}

/// Installs and verifies the configured license once, returning the
/// content that passed verification.
pub fn verify(config: &LicenseConfig) -> Result<LicenseContent> {
    if !config.enabled {
        bail!("License checking is disabled in the configuration");
    }
    let cache = bootstrap(config)?;
    Ok(cache.verify_content()?)
}

/// Reads a license file without checking its signature.
pub fn inspect(license: &Path) -> Result<LicenseContent> {
    let bytes =
        fs::read(license).with_context(|| format!("Failed to read {}", license.display()))?;
    Ed25519Notary::read_unverified(&bytes)
        .with_context(|| format!("{} is not a license certificate", license.display()))
}

/// Human-readable summary of license content.
pub fn describe(content: &LicenseContent) -> String {
    let when = |t: Option<chrono::DateTime<Utc>>| {
        t.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
    };
    let mut lines = vec![
        format!("License:     {}", content.license_id),
        format!("Subject:     {}", content.subject),
        format!("Holder:      {}", or_dash(&content.holder)),
        format!("Issuer:      {}", or_dash(&content.issuer)),
        format!("Valid from:  {}", when(content.not_before)),
        format!("Valid until: {}", when(content.not_after)),
    ];
    match content.bound_fingerprint() {
        Ok(bound) if bound.is_unconstrained() => {
            lines.push("Bound to:    any machine".to_string());
        }
        Ok(bound) => {
            lines.push(format!("Bound to:    {}", bound.short_id()));
            lines.push(format!("  CPU:       {}", or_dash(&bound.cpu_serial)));
            lines.push(format!("  Board:     {}", or_dash(&bound.main_board_serial)));
            lines.push(format!("  IPs:       {}", list_or_dash(&bound.ip_addresses)));
            lines.push(format!("  MACs:      {}", list_or_dash(&bound.mac_addresses)));
        }
        Err(e) => lines.push(format!("Bound to:    invalid ({e})")),
    }
    if let Some(text) = &content.info {
        lines.push(format!("Info:        {text}"));
    }
    lines.join("\n")
}
