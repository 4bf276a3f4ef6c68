//! The certificate data contract

use der::{asn1::ObjectIdentifier, DateTime};

use crate::ExtensionValue;

/// `CertificateData` is the read-only view of a certificate used throughout this crate. Nothing here
/// parses certificate bytes; implementations supply already-decoded fields.
///
/// Names are compared as exact strings, so implementations must render distinguished names the same
/// way for a certificate's subject and for the issuer field of certificates it issued.
pub trait CertificateData {
    /// Subject distinguished name
    fn subject_dn(&self) -> &str;

    /// Issuer distinguished name
    fn issuer_dn(&self) -> &str;

    /// Serial number, rendered as text. Used as certificate identity by the chain builders and
    /// trust anchor matching.
    fn serial_number(&self) -> &str;

    /// Start of the validity period, if known
    fn not_before(&self) -> Option<DateTime>;

    /// End of the validity period, if known
    fn not_after(&self) -> Option<DateTime>;

    /// Public key material. Two certificates hold the same key iff these bytes are equal.
    fn public_key(&self) -> &[u8];

    /// Signature value
    fn signature(&self) -> &[u8];

    /// Signature algorithm identifier, if known
    fn signature_algorithm(&self) -> Option<ObjectIdentifier>;

    /// Returns the decoded value of the extension identified by `oid`, if present
    fn extension(&self, oid: &ObjectIdentifier) -> Option<&ExtensionValue>;

    /// Returns true if the extension identified by `oid` is present
    fn has_extension(&self, oid: &ObjectIdentifier) -> bool {
        self.extension(oid).is_some()
    }

    /// Returns true when the issuer name equals the subject name. This is a name check only; no
    /// signature is verified.
    fn is_self_signed(&self) -> bool {
        self.issuer_dn() == self.subject_dn()
    }
}
