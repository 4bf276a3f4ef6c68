//! Owned certificate field record

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use der::{asn1::ObjectIdentifier, DateTime};

use crate::{CertificateData, ExtensionValue};

/// `CertificateRecord` is a plain owned implementation of [`CertificateData`] for callers that
/// decode certificates with some other toolkit, or that want to describe certificates directly.
///
/// ```
/// use certtrust::{CertificateData, CertificateRecord};
///
/// let root = CertificateRecord::new("CN=Root", "CN=Root", "01").with_public_key(b"root key");
/// assert!(root.is_self_signed());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertificateRecord {
    /// Subject distinguished name
    pub subject_dn: String,
    /// Issuer distinguished name
    pub issuer_dn: String,
    /// Serial number
    pub serial_number: String,
    /// Start of the validity period
    pub not_before: Option<DateTime>,
    /// End of the validity period
    pub not_after: Option<DateTime>,
    /// Public key material
    pub public_key: Vec<u8>,
    /// Signature value
    pub signature: Vec<u8>,
    /// Signature algorithm
    pub signature_algorithm: Option<ObjectIdentifier>,
    /// Decoded extensions keyed by extension OID
    pub extensions: BTreeMap<ObjectIdentifier, ExtensionValue>,
}

impl CertificateRecord {
    /// Creates a record with the given names and serial number and no other fields set
    pub fn new(subject_dn: &str, issuer_dn: &str, serial_number: &str) -> Self {
        CertificateRecord {
            subject_dn: subject_dn.to_string(),
            issuer_dn: issuer_dn.to_string(),
            serial_number: serial_number.to_string(),
            ..Default::default()
        }
    }

    /// Sets the validity period
    pub fn with_validity(mut self, not_before: DateTime, not_after: DateTime) -> Self {
        self.not_before = Some(not_before);
        self.not_after = Some(not_after);
        self
    }

    /// Sets the public key
    pub fn with_public_key(mut self, public_key: &[u8]) -> Self {
        self.public_key = public_key.to_vec();
        self
    }

    /// Sets the signature value and algorithm
    pub fn with_signature(mut self, algorithm: ObjectIdentifier, signature: &[u8]) -> Self {
        self.signature_algorithm = Some(algorithm);
        self.signature = signature.to_vec();
        self
    }

    /// Adds or replaces an extension
    pub fn with_extension(mut self, oid: ObjectIdentifier, value: ExtensionValue) -> Self {
        self.extensions.insert(oid, value);
        self
    }
}

impl CertificateData for CertificateRecord {
    fn subject_dn(&self) -> &str {
        &self.subject_dn
    }

    fn issuer_dn(&self) -> &str {
        &self.issuer_dn
    }

    fn serial_number(&self) -> &str {
        &self.serial_number
    }

    fn not_before(&self) -> Option<DateTime> {
        self.not_before
    }

    fn not_after(&self) -> Option<DateTime> {
        self.not_after
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn signature_algorithm(&self) -> Option<ObjectIdentifier> {
        self.signature_algorithm
    }

    fn extension(&self, oid: &ObjectIdentifier) -> Option<&ExtensionValue> {
        self.extensions.get(oid)
    }
}

#[test]
fn certificate_record_test() {
    use const_oid::db::rfc5912::ID_CE_KEY_USAGE;
    use const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION;

    let rec = CertificateRecord::new("CN=Leaf", "CN=CA", "0A")
        .with_public_key(&[1, 2, 3])
        .with_signature(SHA_256_WITH_RSA_ENCRYPTION, &[9, 9])
        .with_extension(
            ID_CE_KEY_USAGE,
            ExtensionValue::List(alloc::vec![ExtensionValue::from("digitalSignature")]),
        );
    assert!(!rec.is_self_signed());
    assert!(rec.has_extension(&ID_CE_KEY_USAGE));
    assert!(rec.not_before().is_none());
    assert_eq!(Some(SHA_256_WITH_RSA_ENCRYPTION), rec.signature_algorithm());
    assert_eq!(&[1, 2, 3], rec.public_key());
}
