//! The validation_traits module features the capability traits injected into the validators, i.e.,
//! cryptographic signature verification and key usage checking.

use alloc::string::String;

use const_oid::db::rfc5280::ANY_EXTENDED_KEY_USAGE;
use const_oid::db::rfc5912::{ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE};
use der::asn1::ObjectIdentifier;
use flagset::FlagSet;
use log::error;
use x509_cert::ext::pkix::KeyUsages;

use crate::util::error::*;
use crate::{context_for, key_usage_from_name, CertificateData, ExtensionValue};

/// The [`SignatureVerifier`] trait is implemented by the cryptographic collaborator. Nothing in this
/// crate performs cryptographic math; when no verifier is configured the validators only check
/// chain structure and say so in their results.
pub trait SignatureVerifier {
    /// `verify_signature` returns Ok if the signature on `certificate` was produced using the private key
    /// corresponding to the public key in `issuer`.
    fn verify_signature(
        &self,
        certificate: &dyn CertificateData,
        issuer: &dyn CertificateData,
    ) -> Result<()>;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&dyn CertificateData, &dyn CertificateData) -> Result<()>,
{
    fn verify_signature(
        &self,
        certificate: &dyn CertificateData,
        issuer: &dyn CertificateData,
    ) -> Result<()> {
        self(certificate, issuer)
    }
}

/// The [`KeyUsageCheck`] trait is the extension point for key usage and extended key usage
/// enforcement. Expected values are key usage names (i.e., `digitalSignature`) and dotted decimal
/// extended key usage OIDs.
pub trait KeyUsageCheck {
    /// Returns Ok if `certificate` is acceptable for the expected usages
    fn check_key_usage(
        &self,
        certificate: &dyn CertificateData,
        expected_key_usage: &[String],
        expected_extended_key_usage: &[String],
    ) -> Result<()>;
}

/// `PermissiveKeyUsage` accepts every certificate. It is the default check used by
/// [`CertificateValidator`](crate::CertificateValidator).
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveKeyUsage;

impl KeyUsageCheck for PermissiveKeyUsage {
    fn check_key_usage(
        &self,
        _certificate: &dyn CertificateData,
        _expected_key_usage: &[String],
        _expected_extended_key_usage: &[String],
    ) -> Result<()> {
        Ok(())
    }
}

/// `StrictKeyUsage` fails when an expected usage is absent from a key usage or extended key usage
/// extension that is present. Absent extensions impose no restriction. The anyExtendedKeyUsage OID
/// satisfies every expected extended key usage.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictKeyUsage;

fn invalid_key_usage(certificate: &dyn CertificateData, detail: &str) -> Error {
    error!(
        "{} for certificate issued to {}",
        detail,
        certificate.subject_dn()
    );
    Error::validation(
        ValidationErrorKind::InvalidKeyUsage,
        context_for(certificate).with_detail(detail),
    )
}

fn list_items(value: &ExtensionValue) -> &[ExtensionValue] {
    value.as_list().unwrap_or_default()
}

impl KeyUsageCheck for StrictKeyUsage {
    fn check_key_usage(
        &self,
        certificate: &dyn CertificateData,
        expected_key_usage: &[String],
        expected_extended_key_usage: &[String],
    ) -> Result<()> {
        if !expected_key_usage.is_empty() {
            if let Some(ku) = certificate.extension(&ID_CE_KEY_USAGE) {
                let mut asserted = FlagSet::<KeyUsages>::default();
                for name in list_items(ku).iter().filter_map(ExtensionValue::as_text) {
                    if let Some(bit) = key_usage_from_name(name) {
                        asserted |= bit;
                    }
                }
                for name in expected_key_usage {
                    match key_usage_from_name(name) {
                        Some(bit) if asserted.contains(bit) => {}
                        Some(_) => {
                            return Err(invalid_key_usage(
                                certificate,
                                &alloc::format!("{} is not asserted in key usage extension", name),
                            ));
                        }
                        None => {
                            return Err(invalid_key_usage(
                                certificate,
                                &alloc::format!("unrecognized key usage name: {}", name),
                            ));
                        }
                    }
                }
            }
        }

        if !expected_extended_key_usage.is_empty() {
            if let Some(eku) = certificate.extension(&ID_CE_EXT_KEY_USAGE) {
                let asserted: alloc::vec::Vec<ObjectIdentifier> = list_items(eku)
                    .iter()
                    .filter_map(ExtensionValue::to_oid)
                    .collect();
                if asserted.contains(&ANY_EXTENDED_KEY_USAGE) {
                    return Ok(());
                }
                for oid_str in expected_extended_key_usage {
                    let found = ObjectIdentifier::new(oid_str)
                        .map(|oid| asserted.contains(&oid))
                        .unwrap_or(false);
                    if !found {
                        return Err(invalid_key_usage(
                            certificate,
                            &alloc::format!(
                                "{} is not asserted in extended key usage extension",
                                oid_str
                            ),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
