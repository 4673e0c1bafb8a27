//! hwbind: hardware-bound license tooling
//!
//! Usage:
//!   hwbind info [--json]
//!   hwbind keygen --out keys/
//!   hwbind issue --signing-key keys/license-signing.key --subject acme --bind-current --out acme.lic
//!   hwbind verify --license acme.lic --public-key keys/license-public.key
//!   hwbind inspect acme.lic

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hwbind_cli::{
    collect_info, describe, inspect, issue, keygen, resolve_config, verify, BindingOverrides,
    IssueRequest,
};
use hwbind_hardware::{provider_for_current_os, Fingerprint, ProbeConfig};
use hwbind_license::LicenseConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hwbind")]
#[command(about = "Hardware-bound license tooling")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print this machine's hardware fingerprint
    Info {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Read probe settings from this license config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a license signing key pair
    Keygen {
        /// Directory to write the key files to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Issue a license bound to a machine
    Issue {
        /// Secret key written by `keygen`
        #[arg(long)]
        signing_key: PathBuf,

        /// Product the license is for
        #[arg(long)]
        subject: String,

        /// Validity in days, starting now
        #[arg(long, default_value = "365")]
        days: i64,

        /// Licensee name
        #[arg(long)]
        holder: Option<String>,

        /// Issuer name
        #[arg(long)]
        issuer: Option<String>,

        /// Free text stored in the license
        #[arg(long)]
        info: Option<String>,

        /// Start from this machine's fingerprint
        #[arg(long)]
        bind_current: bool,

        /// Required CPU serial
        #[arg(long)]
        cpu: Option<String>,

        /// Required mainboard serial
        #[arg(long)]
        board: Option<String>,

        /// Accepted IP address (repeatable)
        #[arg(long = "ip")]
        ips: Vec<String>,

        /// Accepted MAC address (repeatable)
        #[arg(long = "mac")]
        macs: Vec<String>,

        /// Output license file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Install and verify a license on this machine
    Verify {
        /// License config file (defaults to the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// License file
        #[arg(long)]
        license: Option<PathBuf>,

        /// Public key file
        #[arg(long)]
        public_key: Option<PathBuf>,
    },

    /// Show a license's content without verifying it
    Inspect {
        /// License file
        license: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Info { json, config } => {
            let probes = match config {
                Some(path) => LicenseConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?
                    .hardware,
                None => ProbeConfig::default(),
            };
            let report = collect_info(probes);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::Keygen { out } => {
            let files = keygen(&out)?;
            println!("Signing key: {}", files.signing_key.display());
            println!("Public key:  {}", files.public_key.display());
        }
        Command::Issue {
            signing_key,
            subject,
            days,
            holder,
            issuer,
            info,
            bind_current,
            cpu,
            board,
            ips,
            macs,
            out,
        } => {
            let base = if bind_current {
                provider_for_current_os(ProbeConfig::default()).hardware_info()
            } else {
                Fingerprint::default()
            };
            let overrides = BindingOverrides {
                cpu,
                board,
                ips,
                macs,
            };
            let request = IssueRequest {
                subject,
                holder,
                issuer,
                info,
                days,
                binding: overrides.apply(base),
            };
            let content = issue(&signing_key, &request, &out)?;
            println!("{}", describe(&content));
            println!("Written to:  {}", out.display());
        }
        Command::Verify {
            config,
            license,
            public_key,
        } => {
            let config =
                resolve_config(config.as_deref(), license.as_deref(), public_key.as_deref())?;
            let content = verify(&config)?;
            println!("{}", describe(&content));
            println!("Status:      valid on this machine");
        }
        Command::Inspect { license } => {
            let content = inspect(&license)?;
            println!("{}", describe(&content));
        }
    }

    Ok(())
}
