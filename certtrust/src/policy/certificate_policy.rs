//! Certificate policy identifiers with optional qualifier metadata

use alloc::{string::String, string::ToString, vec::Vec};
use core::fmt;

use const_oid::db::rfc5280::ANY_POLICY;
use const_oid::db::rfc5912::ID_CE_CERTIFICATE_POLICIES;
use der::asn1::ObjectIdentifier;

use crate::{
    CertificateData, ExtensionValue, POLICY_FIELD_DISPLAY_TEXT, POLICY_FIELD_OID,
    POLICY_FIELD_QUALIFIER, POLICY_FIELD_URI,
};

/// `CertificatePolicy` is a policy OID asserted by a certificate plus optional qualifier metadata.
///
/// Two policies match when their OIDs are equal or when either OID is anyPolicy (2.5.29.32.0).
/// Qualifier metadata plays no part in matching.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificatePolicy {
    /// Policy identifier
    pub policy_oid: ObjectIdentifier,
    /// Identifier of the first policy qualifier, as dotted decimal text
    pub qualifier: Option<String>,
    /// CPS pointer
    pub policy_info_uri: Option<String>,
    /// Display text
    pub display_text: Option<String>,
}

impl CertificatePolicy {
    /// Creates a policy with no qualifier metadata
    pub fn new(policy_oid: ObjectIdentifier) -> Self {
        CertificatePolicy {
            policy_oid,
            qualifier: None,
            policy_info_uri: None,
            display_text: None,
        }
    }

    /// Creates the anyPolicy wildcard
    pub fn any_policy() -> Self {
        Self::new(ANY_POLICY)
    }

    /// Returns true if this is the anyPolicy wildcard
    pub fn is_any_policy(&self) -> bool {
        self.policy_oid == ANY_POLICY
    }

    /// Returns true if the OIDs are equal or either policy is anyPolicy
    pub fn matches(&self, other: &CertificatePolicy) -> bool {
        self.matches_oid(&other.policy_oid)
    }

    /// Returns true if `oid` equals the policy OID or either is anyPolicy
    pub fn matches_oid(&self, oid: &ObjectIdentifier) -> bool {
        self.policy_oid == *oid || self.is_any_policy() || *oid == ANY_POLICY
    }

    /// `from_extension_value` reads one item of a certificate policies extension. An `Oid` item, a
    /// `Text` item holding a dotted decimal OID, or a `Record` whose `oid` field is either of those
    /// yields a policy. Other shapes yield None.
    pub fn from_extension_value(value: &ExtensionValue) -> Option<Self> {
        match value {
            ExtensionValue::Record(_) => {
                let mut policy = Self::new(value.field(POLICY_FIELD_OID)?.to_oid()?);
                policy.qualifier = text_field(value, POLICY_FIELD_QUALIFIER);
                policy.policy_info_uri = text_field(value, POLICY_FIELD_URI);
                policy.display_text = text_field(value, POLICY_FIELD_DISPLAY_TEXT);
                Some(policy)
            }
            _ => value.to_oid().map(Self::new),
        }
    }
}

fn text_field(value: &ExtensionValue, name: &str) -> Option<String> {
    value
        .field(name)
        .and_then(|f| f.as_text())
        .map(|s| s.to_string())
}

impl From<ObjectIdentifier> for CertificatePolicy {
    fn from(policy_oid: ObjectIdentifier) -> Self {
        Self::new(policy_oid)
    }
}

impl fmt::Display for CertificatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.policy_oid)
    }
}

/// `policies_of` returns the policies asserted in the certificate policies extension of `cert`, in
/// extension order. Items with unrecognized shapes are skipped. A certificate without the extension,
/// or whose extension value is not a list, asserts no policies.
pub fn policies_of<C: CertificateData + ?Sized>(cert: &C) -> Vec<CertificatePolicy> {
    cert.extension(&ID_CE_CERTIFICATE_POLICIES)
        .and_then(|ext| ext.as_list())
        .map(|items| {
            items
                .iter()
                .filter_map(CertificatePolicy::from_extension_value)
                .collect()
        })
        .unwrap_or_default()
}
