mod common;

use common::nic;
use hwbind_hardware::network::{address_qualifies, format_mac, interface_qualifies, summarize};
use hwbind_hardware::{InterfaceRecord, DEFAULT_EXCLUDED_PREFIXES};
use pretty_assertions::assert_eq;
use std::net::IpAddr;

fn default_prefixes() -> Vec<String> {
    DEFAULT_EXCLUDED_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn ip(text: &str) -> IpAddr {
    text.parse().unwrap()
}

// ── Address filter ───────────────────────────────────────────────

#[test]
fn routable_addresses_qualify() {
    assert!(address_qualifies(&ip("192.168.1.20")));
    assert!(address_qualifies(&ip("10.0.0.5")));
    assert!(address_qualifies(&ip("2001:db8::1")));
}

#[test]
fn loopback_link_local_multicast_rejected() {
    assert!(!address_qualifies(&ip("127.0.0.1")));
    assert!(!address_qualifies(&ip("::1")));
    assert!(!address_qualifies(&ip("169.254.10.1")));
    assert!(!address_qualifies(&ip("fe80::1")));
    assert!(!address_qualifies(&ip("224.0.0.1")));
    assert!(!address_qualifies(&ip("ff02::1")));
    assert!(!address_qualifies(&ip("0.0.0.0")));
}

// ── Interface filter ─────────────────────────────────────────────

#[test]
fn container_prefixes_rejected() {
    let prefixes = default_prefixes();
    for name in ["docker0", "veth12ab", "flannel.1", "cni0"] {
        let iface = nic(name, [2, 0, 0, 0, 0, 1], &["172.17.0.1"]);
        assert!(!interface_qualifies(&iface, &prefixes), "{name} should be excluded");
    }
    assert!(interface_qualifies(&nic("eth0", [2, 0, 0, 0, 0, 1], &[]), &prefixes));
}

#[test]
fn down_loopback_and_virtual_rejected() {
    let prefixes = default_prefixes();

    let mut down = nic("eth1", [2, 0, 0, 0, 0, 1], &["10.0.0.1"]);
    down.is_up = false;
    assert!(!interface_qualifies(&down, &prefixes));

    let mut lo = nic("lo", [0; 6], &["127.0.0.1"]);
    lo.is_loopback = true;
    assert!(!interface_qualifies(&lo, &prefixes));

    let mut alias = nic("eth0:1", [2, 0, 0, 0, 0, 1], &["10.0.0.2"]);
    alias.is_virtual = true;
    assert!(!interface_qualifies(&alias, &prefixes));
}

#[test]
fn custom_prefixes_replace_defaults() {
    let prefixes = vec!["wg".to_string()];
    assert!(!interface_qualifies(&nic("wg0", [2, 0, 0, 0, 0, 1], &[]), &prefixes));
    assert!(interface_qualifies(&nic("docker0", [2, 0, 0, 0, 0, 1], &[]), &prefixes));
}

// ── Summary ──────────────────────────────────────────────────────

#[test]
fn mac_format_is_upper_dashed() {
    assert_eq!(format_mac(&[0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]), "00-1A-2B-3C-4D-5E");
}

#[test]
fn summarize_keeps_only_qualifying_entries() {
    let mut lo = InterfaceRecord::named("lo");
    lo.is_up = true;
    lo.is_loopback = true;
    lo.addresses = vec![ip("127.0.0.1"), ip("::1")];

    let interfaces = vec![
        lo,
        nic("eth0", [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e], &["192.168.1.20", "fe80::21a:2bff:fe3c:4d5e", "2001:DB8::20"]),
        nic("docker0", [0x02, 0x42, 0xac, 0x11, 0x00, 0x02], &["172.17.0.1"]),
        nic("wlan0", [0xa4, 0x5e, 0x60, 0x00, 0x00, 0x01], &["169.254.3.3"]),
    ];

    let identity = summarize(&interfaces, &default_prefixes());
    assert_eq!(identity.ip_addresses, vec!["192.168.1.20", "2001:db8::20"]);
    // wlan0 only had a link-local address, so its MAC does not count.
    assert_eq!(identity.mac_addresses, vec!["00-1A-2B-3C-4D-5E"]);
}

#[test]
fn summarize_deduplicates() {
    let interfaces = vec![
        nic("bond0", [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e], &["10.1.1.1"]),
        nic("eth0", [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e], &["10.1.1.1", "10.1.1.2"]),
    ];
    let identity = summarize(&interfaces, &default_prefixes());
    assert_eq!(identity.ip_addresses, vec!["10.1.1.1", "10.1.1.2"]);
    assert_eq!(identity.mac_addresses, vec!["00-1A-2B-3C-4D-5E"]);
}

#[test]
fn summarize_skips_zero_mac() {
    let interfaces = vec![nic("tun0", [0; 6], &["10.8.0.2"])];
    let identity = summarize(&interfaces, &default_prefixes());
    assert_eq!(identity.ip_addresses, vec!["10.8.0.2"]);
    assert!(identity.mac_addresses.is_empty());
}

#[test]
fn summarize_empty_input() {
    let identity = summarize(&[], &default_prefixes());
    assert!(identity.ip_addresses.is_empty());
    assert!(identity.mac_addresses.is_empty());
}
