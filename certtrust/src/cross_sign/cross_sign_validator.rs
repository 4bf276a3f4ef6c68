//! Validation of the alternates in a [`CrossSignedCertificate`]

use alloc::{boxed::Box, format};

use log::{debug, info};

use crate::{
    build_path, find_issuer, valid_at_time, CertificateData, CrossSignedCertificate, CycleGuard,
    PathTermination, SignatureVerifier, ValidationOptions, ValidationResult,
};

/// `CrossSignValidator` checks that each alternate of a [`CrossSignedCertificate`] still matches its
/// primary, is within its validity period and chains to an issuer among the supplied trust anchors
/// and intermediates. Validation stops at the first alternate that fails.
///
/// Path signatures are checked only when a [`SignatureVerifier`] is configured.
#[derive(Default)]
pub struct CrossSignValidator {
    options: ValidationOptions,
    signature_verifier: Option<Box<dyn SignatureVerifier + Send + Sync>>,
}

impl CrossSignValidator {
    /// Creates a validator that evaluates validity at the current time and has no signature verifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that reads the time of interest from `options`
    pub fn with_options(options: ValidationOptions) -> Self {
        CrossSignValidator {
            options,
            signature_verifier: None,
        }
    }

    /// Sets the signature verifier applied to each link of a built path
    pub fn with_signature_verifier<V>(mut self, verifier: V) -> Self
    where
        V: SignatureVerifier + Send + Sync + 'static,
    {
        self.signature_verifier = Some(Box::new(verifier));
        self
    }

    /// `validate` checks every alternate of `cross_signed` in order. Issuers and paths are sought in
    /// `trust_anchors` then `intermediates`.
    pub fn validate<C: CertificateData>(
        &self,
        cross_signed: &CrossSignedCertificate<'_, C>,
        trust_anchors: &[C],
        intermediates: &[C],
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let alternates = cross_signed.cross_signed_certificates();
        if alternates.is_empty() {
            result.add_info("no cross-signed certificates to validate");
            return result;
        }

        let primary = cross_signed.primary_certificate();
        for alternate in alternates {
            if !self.validate_alternate(primary, *alternate, trust_anchors, intermediates, &mut result)
            {
                return result;
            }
        }

        info!(
            "Validated {} cross-signed certificates for {}",
            alternates.len(),
            primary.subject_dn()
        );
        result.add_success("all cross-signed certificates validated");
        result
    }

    fn validate_alternate<C: CertificateData>(
        &self,
        primary: &C,
        alternate: &C,
        trust_anchors: &[C],
        intermediates: &[C],
        result: &mut ValidationResult,
    ) -> bool {
        if alternate.public_key() != primary.public_key() {
            result.add_error("cross-signed certificate public key does not match the primary certificate");
            return false;
        }
        if alternate.subject_dn() != primary.subject_dn() {
            result.add_error("cross-signed certificate subject does not match the primary certificate");
            return false;
        }

        let toi = self.options.get_time_of_interest_or_now();
        if let Err(e) = valid_at_time(alternate, &toi, true) {
            debug!("Cross-signed certificate {} rejected: {}", alternate.serial_number(), e);
            result.add_error("cross-signed certificate is not within its validity period");
            return false;
        }

        let sources = [trust_anchors, intermediates];
        if find_issuer(alternate, &sources).is_none() {
            result.add_error(&format!(
                "issuer of cross-signed certificate not found: {}",
                alternate.issuer_dn()
            ));
            return false;
        }

        let path = build_path(alternate, &sources, CycleGuard::RejectRepeatedSerial);
        if matches!(
            path.termination,
            PathTermination::MissingIssuer | PathTermination::Cycle
        ) {
            result.add_error("unable to build a complete trust path for the cross-signed certificate");
            return false;
        }

        match &self.signature_verifier {
            Some(verifier) => {
                for pair in path.certificates.windows(2) {
                    if let Err(e) = verifier.verify_signature(pair[0], pair[1]) {
                        result.add_error(&format!(
                            "signature verification failed for cross-signed certificate path: {}",
                            e
                        ));
                        return false;
                    }
                }
            }
            None => {
                result.add_warning(
                    "no signature verifier configured, cross-signed certificate path was not cryptographically verified",
                );
            }
        }

        result.add_success(&format!(
            "cross-signed certificate validated: {}",
            alternate.issuer_dn()
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::error::*;
    use crate::{CertificateRecord, TimeOfInterest};
    use alloc::{string::ToString, vec, vec::Vec};

    fn toi(secs: u64) -> der::DateTime {
        TimeOfInterest::from_unix_secs(secs).unwrap().0
    }

    fn cert(subject: &str, issuer: &str, serial: &str, key: &[u8]) -> CertificateRecord {
        CertificateRecord::new(subject, issuer, serial)
            .with_validity(toi(1_000), toi(1_000_000))
            .with_public_key(key)
    }

    fn at(secs: u64) -> CrossSignValidator {
        let mut vo = ValidationOptions::new();
        vo.set_time_of_interest(secs);
        CrossSignValidator::with_options(vo)
    }

    #[test]
    fn no_alternates() {
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![]).unwrap();
        let result = at(5_000).validate(&group, &[], &[]);
        assert!(result.is_valid());
        assert_eq!(
            vec!["no cross-signed certificates to validate".to_string()],
            result.infos()
        );
    }

    #[test]
    fn alternate_paths() {
        let root1 = cert("CN=Root1", "CN=Root1", "r1", b"R1");
        let root2 = cert("CN=Root2", "CN=Root2", "r2", b"R2");
        let bridge = cert("CN=Bridge", "CN=Root2", "b1", b"B");
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let alt = cert("CN=CA", "CN=Bridge", "02", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&alt]).unwrap();

        let result = at(5_000).validate(&group, &[root1.clone(), root2.clone()], &[bridge.clone()]);
        assert!(result.is_valid());
        assert_eq!(1, result.warnings().len());
        assert_eq!(
            vec![
                "cross-signed certificate validated: CN=Bridge".to_string(),
                "all cross-signed certificates validated".to_string()
            ],
            result.successes()
        );

        // bridge is present but its issuer is not
        let result = at(5_000).validate(&group, &[root1.clone()], &[bridge.clone()]);
        assert!(!result.is_valid());
        assert!(result.contains_message("unable to build a complete trust path"));

        let result = at(5_000).validate(&group, &[root1.clone(), root2.clone()], &[]);
        assert!(!result.is_valid());
        assert_eq!(
            vec!["issuer of cross-signed certificate not found: CN=Bridge".to_string()],
            result.errors()
        );

        let result = at(2_000_000).validate(&group, &[root2], &[bridge]);
        assert!(!result.is_valid());
        assert_eq!(
            vec!["cross-signed certificate is not within its validity period".to_string()],
            result.errors()
        );
    }

    #[test]
    fn disabled_time_requires_bounds() {
        let root = cert("CN=Root2", "CN=Root2", "r2", b"R2");
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let alt = CertificateRecord::new("CN=CA", "CN=Root2", "02").with_public_key(b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&alt]).unwrap();

        let result = at(0).validate(&group, &[root.clone()], &[]);
        assert!(!result.is_valid());
        assert_eq!(
            vec!["cross-signed certificate is not within its validity period".to_string()],
            result.errors()
        );

        let bounded = cert("CN=CA", "CN=Root2", "02", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&bounded]).unwrap();
        assert!(at(0).validate(&group, &[root], &[]).is_valid());
    }

    #[test]
    fn repeated_serial_is_a_cycle() {
        let a = cert("CN=A", "CN=B", "01", b"A");
        let b = cert("CN=B", "CN=A", "01", b"B");
        let primary = cert("CN=CA", "CN=Root1", "10", b"K");
        let alt = cert("CN=CA", "CN=A", "11", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&alt]).unwrap();

        let result = at(5_000).validate(&group, &[], &[a, b]);
        assert!(!result.is_valid());
        assert!(result.contains_message("unable to build a complete trust path"));
    }

    #[test]
    fn verifier_applies_to_each_link() {
        let root = cert("CN=Root2", "CN=Root2", "r2", b"R2");
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let alt = cert("CN=CA", "CN=Root2", "02", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&alt]).unwrap();
        let anchors: Vec<CertificateRecord> = vec![root];

        let validator = at(5_000).with_signature_verifier(
            |_: &dyn CertificateData, _: &dyn CertificateData| -> Result<()> { Ok(()) },
        );
        let result = validator.validate(&group, &anchors, &[]);
        assert!(result.is_valid());
        assert!(result.warnings().is_empty());

        let validator = at(5_000).with_signature_verifier(
            |c: &dyn CertificateData, _: &dyn CertificateData| -> Result<()> {
                Err(Error::validation(
                    ValidationErrorKind::SignatureFailed,
                    ErrorContext::new().with_subject(c.subject_dn()),
                ))
            },
        );
        let result = validator.validate(&group, &anchors, &[]);
        assert!(!result.is_valid());
        assert!(result.contains_message("signature verification failed"));
    }
}
