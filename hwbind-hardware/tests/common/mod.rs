//! Shared test helpers for hardware tests.

#![allow(dead_code)]

use hwbind_hardware::{InterfaceRecord, ProbeBackend};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Backend serving canned command outputs and file contents.
#[derive(Default)]
pub struct FakeBackend {
    commands: HashMap<String, String>,
    files: HashMap<String, String>,
    interfaces: Vec<InterfaceRecord>,
    pub interface_calls: AtomicUsize,
    pub log: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers stdout for `program args...` (joined by spaces).
    pub fn command(mut self, invocation: &str, stdout: &str) -> Self {
        self.commands.insert(invocation.to_string(), stdout.to_string());
        self
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn interface(mut self, record: InterfaceRecord) -> Self {
        self.interfaces.push(record);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl ProbeBackend for FakeBackend {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut invocation = program.to_string();
        for arg in args {
            invocation.push(' ');
            invocation.push_str(arg);
        }
        self.log.lock().unwrap().push(invocation.clone());
        self.commands.get(&invocation).cloned()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.log.lock().unwrap().push(path.to_string());
        self.files.get(path).cloned()
    }

    fn interfaces(&self) -> Vec<InterfaceRecord> {
        self.interface_calls.fetch_add(1, Ordering::SeqCst);
        self.interfaces.clone()
    }
}

/// An up, physical interface with the given MAC and addresses.
pub fn nic(name: &str, mac: [u8; 6], addrs: &[&str]) -> InterfaceRecord {
    let mut record = InterfaceRecord::named(name);
    record.is_up = true;
    record.mac = Some(mac);
    record.addresses = addrs.iter().map(|a| a.parse::<IpAddr>().unwrap()).collect();
    record
}
