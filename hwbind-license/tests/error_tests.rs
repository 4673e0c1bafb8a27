use chrono::{TimeZone, Utc};
use hwbind_hardware::Fingerprint;
use hwbind_license::{HardwareField, LicenseError, NotaryError};
use std::error::Error as _;

#[test]
fn error_display_not_installed() {
    assert_eq!(LicenseError::NotInstalled.to_string(), "license not installed");
}

#[test]
fn error_display_hardware_mismatch() {
    let cases = [
        (HardwareField::Ip, "IP address not authorized"),
        (HardwareField::Mac, "MAC address not authorized"),
        (HardwareField::MainBoard, "main-board serial not authorized"),
        (HardwareField::Cpu, "CPU serial not authorized"),
    ];
    for (field, expected) in cases {
        assert_eq!(LicenseError::HardwareMismatch { field }.to_string(), expected);
    }
}

#[test]
fn error_display_expired() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let msg = LicenseError::Expired(at).to_string();
    assert!(msg.contains("expired"));
    assert!(msg.contains("2025-01-01"));
}

#[test]
fn error_display_malformed() {
    let msg = LicenseError::Malformed("no binding".into()).to_string();
    assert!(msg.contains("malformed license"));
    assert!(msg.contains("no binding"));
}

#[test]
fn install_error_wraps_cause() {
    let err = LicenseError::install(
        LicenseError::HardwareMismatch {
            field: HardwareField::Mac,
        },
        Fingerprint::default(),
    );
    assert_eq!(
        err.to_string(),
        "license installation failed: MAC address not authorized"
    );
    assert_eq!(err.mismatched_field(), Some(HardwareField::Mac));
    assert!(err.source().is_some());
    assert!(matches!(
        err.root_cause(),
        LicenseError::HardwareMismatch { .. }
    ));
}

#[test]
fn root_cause_of_plain_error_is_itself() {
    let err = LicenseError::InvalidTimeWindow;
    assert!(matches!(err.root_cause(), LicenseError::InvalidTimeWindow));
    assert_eq!(err.mismatched_field(), None);
}

#[test]
fn notary_errors_map_into_license_errors() {
    assert!(matches!(
        LicenseError::from(NotaryError::Signature),
        LicenseError::InvalidSignature
    ));

    let mapped = LicenseError::from(NotaryError::Format("two parts".into()));
    match mapped {
        LicenseError::InvalidCertificate(msg) => assert!(msg.contains("two parts")),
        other => panic!("expected InvalidCertificate, got {other:?}"),
    }

    assert!(matches!(
        LicenseError::from(NotaryError::Payload("json".into())),
        LicenseError::InvalidCertificate(_)
    ));
}

#[test]
fn io_error_converts() {
    let err: LicenseError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(err, LicenseError::Io(_)));
    assert!(err.to_string().contains("gone"));
}

#[test]
fn hardware_field_serde() {
    let json = serde_json::to_string(&HardwareField::MainBoard).unwrap();
    assert_eq!(json, "\"main_board\"");
    let parsed: HardwareField = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, HardwareField::MainBoard);
}
