use hwbind_hardware::{Fingerprint, ProbeConfig, DEFAULT_COMMAND_TIMEOUT_MS};
use std::time::Duration;

fn sample() -> Fingerprint {
    Fingerprint {
        cpu_serial: "BFEBFBFF000906EA".into(),
        main_board_serial: "190436729901234".into(),
        ip_addresses: vec!["192.168.1.20".into()],
        mac_addresses: vec!["00-1A-2B-3C-4D-5E".into()],
    }
}

#[test]
fn default_fingerprint_is_unconstrained() {
    assert!(Fingerprint::default().is_unconstrained());
    assert!(!sample().is_unconstrained());
}

#[test]
fn blank_serials_count_as_unconstrained() {
    let fp = Fingerprint {
        cpu_serial: "   ".into(),
        ..Fingerprint::default()
    };
    assert!(fp.is_unconstrained());
}

#[test]
fn missing_fields_deserialize_as_empty() {
    let fp: Fingerprint = serde_json::from_str(r#"{"cpu_serial":"X"}"#).unwrap();
    assert_eq!(fp.cpu_serial, "X");
    assert!(fp.main_board_serial.is_empty());
    assert!(fp.ip_addresses.is_empty());
    assert!(fp.mac_addresses.is_empty());
}

#[test]
fn short_id_is_stable_and_sensitive() {
    let a = sample();
    assert_eq!(a.short_id(), sample().short_id());
    assert_eq!(a.short_id().len(), 24);

    let mut b = sample();
    b.cpu_serial = "OTHER".into();
    assert_ne!(a.short_id(), b.short_id());
}

#[test]
fn probe_config_defaults() {
    let config = ProbeConfig::default();
    assert_eq!(config.command_timeout(), Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS));
    assert_eq!(config.excluded_interface_prefixes, vec!["docker", "veth", "flannel", "cni"]);
}

#[test]
fn probe_config_partial_json() {
    let config: ProbeConfig = serde_json::from_str(r#"{"command_timeout_ms":250}"#).unwrap();
    assert_eq!(config.command_timeout(), Duration::from_millis(250));
    assert_eq!(config.excluded_interface_prefixes.len(), 4);
}
