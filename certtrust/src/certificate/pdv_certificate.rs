//! DER-backed implementation of [`CertificateData`]

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use const_oid::db::rfc5912::{
    ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_QT_CPS,
};
use der::{
    asn1::{Ia5String, ObjectIdentifier},
    DateTime, Decode, Encode,
};
use log::error;
use x509_cert::ext::pkix::{
    BasicConstraints, CertificatePolicies, ExtendedKeyUsage, KeyUsage, KeyUsages,
};
use x509_cert::Certificate;

use crate::{buffer_to_hex, CertificateData, ExtensionValue};

/// Field names used in the `Record` values produced for certificate policies
pub static POLICY_FIELD_OID: &str = "oid";
/// Policy qualifier identifier, rendered as dotted decimal text
pub static POLICY_FIELD_QUALIFIER: &str = "qualifier";
/// CPS pointer qualifier value
pub static POLICY_FIELD_URI: &str = "uri";
/// Display text for a policy. Not produced by [`PDVCertificate`], available to other producers.
pub static POLICY_FIELD_DISPLAY_TEXT: &str = "display_text";

/// `PDVCertificate` aggregates a binary, DER-encoded Certificate, the decoded Certificate and the
/// string and extension renderings exposed through [`CertificateData`].
///
/// Names are rendered per RFC 4514 by the `x509-cert` crate and serial numbers and public keys are
/// rendered as upper case hex. The public key material is the DER encoding of the
/// SubjectPublicKeyInfo, so algorithm parameters take part in key comparisons.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PDVCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    subject: String,
    issuer: String,
    serial: String,
    spki: Vec<u8>,
    extensions: BTreeMap<ObjectIdentifier, ExtensionValue>,
}

impl TryFrom<&[u8]> for PDVCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        PDVCertificate::assemble(enc_cert.to_vec(), cert)
    }
}

impl TryFrom<Certificate> for PDVCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        PDVCertificate::assemble(enc_cert, cert)
    }
}

impl PDVCertificate {
    fn assemble(encoded_cert: Vec<u8>, decoded_cert: Certificate) -> der::Result<Self> {
        let tbs = &decoded_cert.tbs_certificate;
        let subject = tbs.subject.to_string();
        let issuer = tbs.issuer.to_string();
        let serial = buffer_to_hex(tbs.serial_number.as_bytes());
        let spki = tbs.subject_public_key_info.to_der()?;

        let mut extensions = BTreeMap::new();
        if let Some(exts) = tbs.extensions.as_ref() {
            for ext in exts {
                let value = decode_extension(&ext.extn_id, ext.extn_value.as_bytes(), &subject);
                extensions.insert(ext.extn_id, value);
            }
        }

        Ok(PDVCertificate {
            encoded_cert,
            decoded_cert,
            subject,
            issuer,
            serial,
            spki,
            extensions,
        })
    }
}

/// `decode_extension` renders the extensions the validators consume as structured values and all
/// other extensions as opaque bytes. Extensions that fail to decode are also kept as bytes, so a
/// consumer sees the extension as present but finds no usable items in it.
fn decode_extension(oid: &ObjectIdentifier, value: &[u8], subject: &str) -> ExtensionValue {
    let decoded = match *oid {
        ID_CE_CERTIFICATE_POLICIES => CertificatePolicies::from_der(value).map(policies_value),
        ID_CE_KEY_USAGE => KeyUsage::from_der(value).map(|ku| {
            ExtensionValue::List(
                ku.0.into_iter()
                    .map(|bit| ExtensionValue::Text(key_usage_name(bit).to_string()))
                    .collect(),
            )
        }),
        ID_CE_EXT_KEY_USAGE => ExtendedKeyUsage::from_der(value)
            .map(|eku| ExtensionValue::List(eku.0.into_iter().map(ExtensionValue::Oid).collect())),
        ID_CE_BASIC_CONSTRAINTS => BasicConstraints::from_der(value).map(|bc| {
            let mut fields = BTreeMap::new();
            fields.insert("ca".to_string(), ExtensionValue::Bool(bc.ca));
            if let Some(pl) = bc.path_len_constraint {
                fields.insert("path_len".to_string(), ExtensionValue::Integer(i64::from(pl)));
            }
            ExtensionValue::Record(fields)
        }),
        _ => return ExtensionValue::Bytes(value.to_vec()),
    };

    match decoded {
        Ok(v) => v,
        Err(e) => {
            error!(
                "Failed to decode extension {} in certificate issued to {}: {}",
                oid, subject, e
            );
            ExtensionValue::Bytes(value.to_vec())
        }
    }
}

fn policies_value(policies: CertificatePolicies) -> ExtensionValue {
    let mut items = Vec::new();
    for pi in policies.0 {
        let mut fields = BTreeMap::new();
        fields.insert(
            POLICY_FIELD_OID.to_string(),
            ExtensionValue::Oid(pi.policy_identifier),
        );
        if let Some(qualifiers) = &pi.policy_qualifiers {
            if let Some(pqi) = qualifiers.first() {
                fields.insert(
                    POLICY_FIELD_QUALIFIER.to_string(),
                    ExtensionValue::Text(pqi.policy_qualifier_id.to_string()),
                );
            }
            let cps = qualifiers
                .iter()
                .filter(|pqi| pqi.policy_qualifier_id == ID_QT_CPS)
                .find_map(|pqi| pqi.qualifier.as_ref())
                .and_then(|q| q.decode_as::<Ia5String>().ok());
            if let Some(uri) = cps {
                fields.insert(
                    POLICY_FIELD_URI.to_string(),
                    ExtensionValue::Text(uri.to_string()),
                );
            }
        }
        items.push(ExtensionValue::Record(fields));
    }
    ExtensionValue::List(items)
}

/// Returns the RFC 5280 name of a key usage bit, i.e., `digitalSignature` or `cRLSign`
pub fn key_usage_name(bit: KeyUsages) -> &'static str {
    match bit {
        KeyUsages::DigitalSignature => "digitalSignature",
        KeyUsages::NonRepudiation => "nonRepudiation",
        KeyUsages::KeyEncipherment => "keyEncipherment",
        KeyUsages::DataEncipherment => "dataEncipherment",
        KeyUsages::KeyAgreement => "keyAgreement",
        KeyUsages::KeyCertSign => "keyCertSign",
        KeyUsages::CRLSign => "cRLSign",
        KeyUsages::EncipherOnly => "encipherOnly",
        KeyUsages::DecipherOnly => "decipherOnly",
    }
}

/// Inverse of [`key_usage_name`]. `contentCommitment` is accepted as an alias of `nonRepudiation`.
pub fn key_usage_from_name(name: &str) -> Option<KeyUsages> {
    match name {
        "digitalSignature" => Some(KeyUsages::DigitalSignature),
        "nonRepudiation" | "contentCommitment" => Some(KeyUsages::NonRepudiation),
        "keyEncipherment" => Some(KeyUsages::KeyEncipherment),
        "dataEncipherment" => Some(KeyUsages::DataEncipherment),
        "keyAgreement" => Some(KeyUsages::KeyAgreement),
        "keyCertSign" => Some(KeyUsages::KeyCertSign),
        "cRLSign" => Some(KeyUsages::CRLSign),
        "encipherOnly" => Some(KeyUsages::EncipherOnly),
        "decipherOnly" => Some(KeyUsages::DecipherOnly),
        _ => None,
    }
}

impl CertificateData for PDVCertificate {
    fn subject_dn(&self) -> &str {
        &self.subject
    }

    fn issuer_dn(&self) -> &str {
        &self.issuer
    }

    fn serial_number(&self) -> &str {
        &self.serial
    }

    fn not_before(&self) -> Option<DateTime> {
        Some(
            self.decoded_cert
                .tbs_certificate
                .validity
                .not_before
                .to_date_time(),
        )
    }

    fn not_after(&self) -> Option<DateTime> {
        Some(
            self.decoded_cert
                .tbs_certificate
                .validity
                .not_after
                .to_date_time(),
        )
    }

    fn public_key(&self) -> &[u8] {
        &self.spki
    }

    fn signature(&self) -> &[u8] {
        self.decoded_cert.signature.raw_bytes()
    }

    fn signature_algorithm(&self) -> Option<ObjectIdentifier> {
        Some(self.decoded_cert.signature_algorithm.oid)
    }

    fn extension(&self, oid: &ObjectIdentifier) -> Option<&ExtensionValue> {
        self.extensions.get(oid)
    }
}

#[test]
fn key_usage_names_round_trip() {
    for bit in [
        KeyUsages::DigitalSignature,
        KeyUsages::KeyCertSign,
        KeyUsages::CRLSign,
        KeyUsages::DecipherOnly,
    ] {
        assert_eq!(Some(bit), key_usage_from_name(key_usage_name(bit)));
    }
    assert_eq!(
        Some(KeyUsages::NonRepudiation),
        key_usage_from_name("contentCommitment")
    );
    assert_eq!(None, key_usage_from_name("serverAuth"));
}
