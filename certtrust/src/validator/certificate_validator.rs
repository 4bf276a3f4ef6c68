//! Per-certificate validation against a set of trust anchors

use alloc::{boxed::Box, format, string::String, vec::Vec};

use log::{debug, info};

use crate::util::error::*;
use crate::{
    build_path, find_issuer, valid_at_time, CertificateData, CycleGuard, KeyUsageCheck,
    PermissiveKeyUsage, SignatureVerifier, ValidationOptions, ValidationResult,
};

/// `CertificateValidator` checks a certificate against a list of trust anchors using a four stage
/// pipeline:
///
/// 1. validity period relative to the time of interest
/// 2. signature, for certificates that are not self-signed, using an issuer found among the
///    intermediates or the trust anchors
/// 3. key usage, when enabled by [`ValidationOptions`]
/// 4. chain, when enabled by [`ValidationOptions`]: the chain built towards the trust anchors must
///    end at a certificate whose serial number matches a trust anchor
///
/// The first stage that fails ends validation, so a failed result carries a single error.
///
/// Without a [`SignatureVerifier`] the signature stage only locates the issuer and records a warning
/// that no cryptographic verification was performed.
pub struct CertificateValidator<C> {
    trust_anchors: Vec<C>,
    options: ValidationOptions,
    signature_verifier: Option<Box<dyn SignatureVerifier + Send + Sync>>,
    key_usage_check: Box<dyn KeyUsageCheck + Send + Sync>,
}

impl<C: CertificateData> CertificateValidator<C> {
    /// Creates a validator with the given trust anchors and options, no signature verifier and the
    /// [`PermissiveKeyUsage`] check.
    pub fn new(trust_anchors: Vec<C>, options: ValidationOptions) -> Self {
        CertificateValidator {
            trust_anchors,
            options,
            signature_verifier: None,
            key_usage_check: Box::new(PermissiveKeyUsage),
        }
    }

    /// Sets the signature verifier used by the signature stage
    pub fn with_signature_verifier<V>(mut self, verifier: V) -> Self
    where
        V: SignatureVerifier + Send + Sync + 'static,
    {
        self.signature_verifier = Some(Box::new(verifier));
        self
    }

    /// Replaces the key usage check used by the key usage stage
    pub fn with_key_usage_check<K>(mut self, check: K) -> Self
    where
        K: KeyUsageCheck + Send + Sync + 'static,
    {
        self.key_usage_check = Box::new(check);
        self
    }

    /// Adds a trust anchor
    pub fn add_trust_anchor(&mut self, trust_anchor: C) -> &mut Self {
        self.trust_anchors.push(trust_anchor);
        self
    }

    /// Returns the trust anchors
    pub fn trust_anchors(&self) -> &[C] {
        &self.trust_anchors
    }

    /// Returns the options
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// `validate` runs the validation pipeline for `certificate`, using `intermediates` as candidate
    /// issuers ahead of the trust anchors. All failures are reported in the returned
    /// [`ValidationResult`]; nothing is returned as an error.
    pub fn validate(&self, certificate: &C, intermediates: &[C]) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Err(e) = self.check_validity(certificate, &mut result) {
            result.add_error(&validity_message(&e));
            return result;
        }

        if !certificate.is_self_signed()
            && !self.check_signature(certificate, intermediates, &mut result)
        {
            return result;
        }

        if self.options.get_validate_key_usage() && !self.check_key_usage(certificate, &mut result) {
            return result;
        }

        if self.options.get_validate_certificate_chain()
            && !self.check_chain(certificate, intermediates, &mut result)
        {
            return result;
        }

        info!("Validated certificate issued to {}", certificate.subject_dn());
        result.add_success("certificate validated");
        result
    }

    fn check_validity(&self, certificate: &C, result: &mut ValidationResult) -> Result<()> {
        let toi = self.options.get_time_of_interest_or_now();
        valid_at_time(certificate, &toi, true)?;
        result.add_info("certificate is within its validity period");
        Ok(())
    }

    fn check_signature(
        &self,
        certificate: &C,
        intermediates: &[C],
        result: &mut ValidationResult,
    ) -> bool {
        let issuer = match find_issuer(certificate, &[intermediates, self.trust_anchors.as_slice()]) {
            Some(issuer) => issuer,
            None => {
                result.add_error(&format!(
                    "issuer certificate not found: {}",
                    certificate.issuer_dn()
                ));
                return false;
            }
        };

        match &self.signature_verifier {
            Some(verifier) => match verifier.verify_signature(certificate, issuer) {
                Ok(()) => {
                    result.add_info("certificate signature verified");
                }
                Err(e) => {
                    result.add_error(&format!("certificate signature verification failed: {}", e));
                    return false;
                }
            },
            None => {
                debug!(
                    "No signature verifier configured, signature on certificate issued to {} was not verified",
                    certificate.subject_dn()
                );
                result.add_info(&format!("issuer certificate located: {}", issuer.subject_dn()));
                result.add_warning(
                    "no signature verifier configured, certificate signature was not cryptographically verified",
                );
            }
        }
        true
    }

    fn check_key_usage(&self, certificate: &C, result: &mut ValidationResult) -> bool {
        let expected_key_usage = self.options.get_expected_key_usage();
        let expected_extended_key_usage: Vec<String> =
            if self.options.get_validate_extended_key_usage() {
                self.options.get_expected_extended_key_usage()
            } else {
                Vec::new()
            };

        match self.key_usage_check.check_key_usage(
            certificate,
            &expected_key_usage,
            &expected_extended_key_usage,
        ) {
            Ok(()) => {
                result.add_info("key usage validated");
                true
            }
            Err(e) => {
                result.add_error(&format!("key usage validation failed: {}", e));
                false
            }
        }
    }

    fn check_chain(&self, certificate: &C, intermediates: &[C], result: &mut ValidationResult) -> bool {
        let path = build_path(
            certificate,
            &[intermediates, self.trust_anchors.as_slice()],
            CycleGuard::StopOnSameCertificate,
        );
        debug!(
            "Chain for {} ended with {:?}",
            certificate.subject_dn(),
            path.termination
        );

        let root = match path.certificates.last() {
            Some(root) => *root,
            None => {
                result.add_error("unable to build a complete certificate chain");
                return false;
            }
        };

        if !self.is_trust_anchor(root) {
            result.add_error("root certificate is not a trust anchor");
            return false;
        }

        result.add_info("certificate chain validated");
        true
    }

    fn is_trust_anchor(&self, certificate: &C) -> bool {
        self.trust_anchors
            .iter()
            .any(|ta| ta.serial_number() == certificate.serial_number())
    }
}

fn validity_message(err: &Error) -> String {
    match err {
        Error::Validation { kind, context } => match &context.detail {
            Some(detail) => format!("{}, {}", kind, detail),
            None => format!("{}", kind),
        },
        _ => format!("unexpected error during validity check: {}", err),
    }
}
