#![allow(dead_code)]

use certtrust::{CertificateRecord, ExtensionValue, TimeOfInterest, ValidationOptions};
use const_oid::db::rfc5912::ID_CE_CERTIFICATE_POLICIES;
use der::asn1::ObjectIdentifier;
use der::DateTime;

pub const NOT_BEFORE: u64 = 1_600_000_000;
pub const NOT_AFTER: u64 = 1_900_000_000;
pub const NOW: u64 = 1_700_000_000;

pub fn at(secs: u64) -> DateTime {
    TimeOfInterest::from_unix_secs(secs).unwrap().0
}

pub fn cert(subject: &str, issuer: &str, serial: &str) -> CertificateRecord {
    CertificateRecord::new(subject, issuer, serial)
        .with_validity(at(NOT_BEFORE), at(NOT_AFTER))
        .with_public_key(subject.as_bytes())
}

pub fn keyed(subject: &str, issuer: &str, serial: &str, key: &[u8]) -> CertificateRecord {
    cert(subject, issuer, serial).with_public_key(key)
}

pub fn with_policies(c: CertificateRecord, policies: &[&str]) -> CertificateRecord {
    c.with_extension(
        ID_CE_CERTIFICATE_POLICIES,
        ExtensionValue::List(policies.iter().map(|p| ExtensionValue::from(*p)).collect()),
    )
}

pub fn oid(s: &str) -> ObjectIdentifier {
    ObjectIdentifier::new(s).unwrap()
}

pub fn options_now() -> ValidationOptions {
    let mut vo = ValidationOptions::new();
    vo.set_time_of_interest(NOW);
    vo
}

/// leaf(E, issued by I), intermediate(I, issued by R), root(R, self-signed)
pub fn three_level() -> (CertificateRecord, CertificateRecord, CertificateRecord) {
    (
        cert("CN=E", "CN=I", "0E"),
        cert("CN=I", "CN=R", "01"),
        cert("CN=R", "CN=R", "00"),
    )
}
