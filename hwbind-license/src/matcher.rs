//! Comparison of a license's bound fingerprint with the running machine.
//!
//! Every dimension follows the same rule: an empty expectation matches
//! anything. Serials compare case-insensitively. Address lists pass when
//! any expected entry is present on the machine.

use hwbind_hardware::Fingerprint;
use std::collections::HashSet;

use crate::error::HardwareField;

/// Per-dimension outcome of a fingerprint comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// IP address list matched.
    pub ip_ok: bool,
    /// MAC address list matched.
    pub mac_ok: bool,
    /// CPU serial matched.
    pub cpu_ok: bool,
    /// Mainboard serial matched.
    pub board_ok: bool,
}

impl MatchResult {
    /// True when every dimension matched.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.ip_ok && self.mac_ok && self.cpu_ok && self.board_ok
    }

    /// The first failing dimension, in IP, MAC, mainboard, CPU order.
    #[must_use]
    pub fn first_mismatch(&self) -> Option<HardwareField> {
        [
            (self.ip_ok, HardwareField::Ip),
            (self.mac_ok, HardwareField::Mac),
            (self.board_ok, HardwareField::MainBoard),
            (self.cpu_ok, HardwareField::Cpu),
        ]
        .into_iter()
        .find_map(|(ok, field)| (!ok).then_some(field))
    }
}

/// Compares `expected` (from the license) with `current` (from the machine).
#[must_use]
pub fn match_fingerprints(expected: &Fingerprint, current: &Fingerprint) -> MatchResult {
    MatchResult {
        ip_ok: any_present(&expected.ip_addresses, &current.ip_addresses),
        mac_ok: any_present(&expected.mac_addresses, &current.mac_addresses),
        cpu_ok: serial_matches(&expected.cpu_serial, &current.cpu_serial),
        board_ok: serial_matches(&expected.main_board_serial, &current.main_board_serial),
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn serial_matches(expected: &str, current: &str) -> bool {
    let expected = normalize(expected);
    expected.is_empty() || expected == normalize(current)
}

fn any_present(expected: &[String], current: &[String]) -> bool {
    if expected.is_empty() {
        return true;
    }
    let current: HashSet<String> = current.iter().map(|v| normalize(v)).collect();
    expected.iter().any(|v| current.contains(&normalize(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_order() {
        let all_bad = MatchResult {
            ip_ok: false,
            mac_ok: false,
            cpu_ok: false,
            board_ok: false,
        };
        assert_eq!(all_bad.first_mismatch(), Some(HardwareField::Ip));

        let cpu_and_board = MatchResult {
            ip_ok: true,
            mac_ok: true,
            ..all_bad
        };
        assert_eq!(cpu_and_board.first_mismatch(), Some(HardwareField::MainBoard));
        assert!(!cpu_and_board.is_authorized());
    }

    #[test]
    fn serial_rules() {
        assert!(serial_matches("", "anything"));
        assert!(serial_matches("  ", ""));
        assert!(serial_matches("abc123", "ABC123"));
        assert!(!serial_matches("abc123", ""));
        assert!(!serial_matches("abc123", "abc124"));
    }

    #[test]
    fn list_rules() {
        let list = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        assert!(any_present(&[], &list(&["10.0.0.1"])));
        assert!(any_present(&[], &[]));
        assert!(!any_present(&list(&["10.0.0.1"]), &[]));
        assert!(any_present(
            &list(&["10.0.0.9", "FE80::1"]),
            &list(&["fe80::1", "10.0.0.1"])
        ));
        assert!(any_present(&list(&["aa-bb-cc-dd-ee-ff"]), &list(&["AA-BB-CC-DD-EE-FF"])));
    }
}
