//! Access to the operating system for probes.
//!
//! Every call here is allowed to fail; failure is reported as `None` (or an
//! empty list) and logged at debug level.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::network::{self, InterfaceRecord};

/// Upper bound on captured stdout per command.
const MAX_OUTPUT_BYTES: u64 = 64 * 1024;

/// Source of raw probe data.
///
/// [`SystemBackend`] talks to the real machine. Tests substitute canned
/// outputs to drive the fallback chains deterministically.
pub trait ProbeBackend: Send + Sync {
    /// Runs `program` with `args` and returns its stdout.
    ///
    /// Returns `None` if the program cannot be started, exits unsuccessfully
    /// or exceeds the timeout.
    fn run(&self, program: &str, args: &[&str]) -> Option<String>;

    /// Reads a file, returning `None` if it is missing or unreadable.
    fn read_file(&self, path: &str) -> Option<String>;

    /// Lists the network interfaces of the machine.
    fn interfaces(&self) -> Vec<InterfaceRecord>;
}

/// Probes the real machine, bounding each command by a timeout.
#[derive(Debug, Clone)]
pub struct SystemBackend {
    timeout: Duration,
}

impl SystemBackend {
    /// Creates a backend whose commands are killed after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ProbeBackend for SystemBackend {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let deadline = Instant::now() + self.timeout;
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                debug!("Probe command {} could not start: {}", program, e);
                return None;
            }
        };

        // Drain stdout concurrently so a chatty child never blocks on a full pipe.
        let stdout = child.stdout.take()?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf);
            let _ = tx.send(buf);
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                debug!(
                    "Probe command {} timed out after {}ms",
                    program,
                    self.timeout.as_millis()
                );
                // The reader is left to finish on its own.
                return None;
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                debug!("Probe command {} could not be awaited: {}", program, e);
                return None;
            }
        };

        if !status.success() {
            debug!("Probe command {} exited with {}", program, status);
            return None;
        }

        // A background process started by the probe may keep stdout open
        // after the probe itself exits; the read shares the same deadline.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let output = match rx.recv_timeout(remaining) {
            Ok(output) => output,
            Err(_) => {
                debug!(
                    "Probe command {} left its output open past {}ms",
                    program,
                    self.timeout.as_millis()
                );
                return None;
            }
        };
        Some(String::from_utf8_lossy(&output).into_owned())
    }

    fn read_file(&self, path: &str) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Probe file {} unreadable: {}", path, e);
                None
            }
        }
    }

    fn interfaces(&self) -> Vec<InterfaceRecord> {
        #[cfg(windows)]
        {
            let args = [
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                network::WINDOWS_ADAPTER_SCRIPT,
            ];
            match self.run("powershell", &args) {
                Some(output) => network::parse_windows_adapters(&output),
                None => Vec::new(),
            }
        }

        #[cfg(unix)]
        {
            network::unix_interfaces()
        }

        #[cfg(not(any(unix, windows)))]
        {
            Vec::new()
        }
    }
}
