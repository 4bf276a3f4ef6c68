//! Ordered certificate chains running from an end entity certificate towards a root

use alloc::{string::ToString, vec::Vec};

use log::{debug, warn};

use crate::util::error::*;
use crate::{
    build_path, context_for, log_error, CertificateData, CycleGuard, PathTermination,
    SignatureVerifier,
};

/// `CertificateChain` holds references to certificates ordered from the end entity certificate
/// (index 0) to the root or trust anchor (last index). Issuer/subject linkage is checked by
/// [`CertificateChain::validate_issuer_subject_chain`] and [`CertificateChain::verify_chain_integrity`]
/// but is not enforced on insertion.
#[derive(Clone, Debug)]
pub struct CertificateChain<'a, C> {
    certificates: Vec<&'a C>,
}

impl<'a, C> Default for CertificateChain<'a, C> {
    fn default() -> Self {
        CertificateChain {
            certificates: Vec::new(),
        }
    }
}

impl<'a, C: CertificateData> CertificateChain<'a, C> {
    /// Creates a chain from certificates already in leaf to root order
    pub fn new(certificates: Vec<&'a C>) -> Self {
        CertificateChain { certificates }
    }

    /// Appends a certificate to the root end of the chain
    pub fn add_certificate(&mut self, certificate: &'a C) -> &mut Self {
        self.certificates.push(certificate);
        self
    }

    /// Returns all certificates, leaf first
    pub fn certificates(&self) -> &[&'a C] {
        &self.certificates
    }

    /// Number of certificates in the chain
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Returns true if the chain holds no certificates
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Returns the certificate at index 0
    pub fn end_entity_certificate(&self) -> Option<&'a C> {
        self.certificates.first().copied()
    }

    /// Returns the certificate at the last index
    pub fn trust_anchor_certificate(&self) -> Option<&'a C> {
        self.certificates.last().copied()
    }

    /// Returns the certificates between the end entity and the trust anchor. Chains with two or fewer
    /// certificates have no intermediates.
    pub fn intermediate_certificates(&self) -> &[&'a C] {
        let len = self.certificates.len();
        if len <= 2 {
            &[]
        } else {
            &self.certificates[1..len - 1]
        }
    }

    /// Returns true if the issuer name of each certificate equals the subject name of the next.
    /// Chains with one or zero certificates are trivially linked.
    pub fn validate_issuer_subject_chain(&self) -> bool {
        self.certificates
            .windows(2)
            .all(|pair| pair[0].issuer_dn() == pair[1].subject_dn())
    }

    /// `verify_chain_integrity` checks that the chain is non-empty, that adjacent certificates are
    /// linked by name and that the last certificate is self-signed.
    ///
    /// No signature verifier is available here, so `verify_signatures` only results in a warning
    /// that no cryptographic check was made. Use [`CertificateChain::verify_chain_integrity_with`]
    /// to verify signatures.
    pub fn verify_chain_integrity(&self, verify_signatures: bool) -> Result<()> {
        if verify_signatures {
            warn!("Signature verification requested without a signature verifier, only chain structure is checked");
        }
        self.check_integrity(None)
    }

    /// `verify_chain_integrity_with` performs the checks of [`CertificateChain::verify_chain_integrity`]
    /// and also verifies the signature on each certificate using the public key of the next certificate.
    pub fn verify_chain_integrity_with(&self, verifier: &dyn SignatureVerifier) -> Result<()> {
        self.check_integrity(Some(verifier))
    }

    fn check_integrity(&self, verifier: Option<&dyn SignatureVerifier>) -> Result<()> {
        if self.certificates.is_empty() {
            let err = Error::validation(ValidationErrorKind::EmptyChain, ErrorContext::new());
            log_error("verify_chain_integrity", &err);
            return Err(err);
        }

        for pair in self.certificates.windows(2) {
            let (current, issuer) = (pair[0], pair[1]);
            if current.issuer_dn() != issuer.subject_dn() {
                let err = Error::validation(
                    ValidationErrorKind::IssuerNotFound,
                    context_for(current).with_issuer(current.issuer_dn()),
                );
                log_error("verify_chain_integrity", &err);
                return Err(err);
            }

            if let Some(verifier) = verifier {
                if let Err(e) = verifier.verify_signature(current, issuer) {
                    let err = Error::validation(
                        ValidationErrorKind::SignatureFailed,
                        context_for(current)
                            .with_issuer(issuer.subject_dn())
                            .with_detail(&e.to_string()),
                    );
                    log_error("verify_chain_integrity", &err);
                    return Err(err);
                }
            }
        }

        if let Some(root) = self.certificates.last() {
            if !root.is_self_signed() {
                let err = Error::validation(
                    ValidationErrorKind::RootNotSelfSigned,
                    context_for(*root).with_issuer(root.issuer_dn()),
                );
                log_error("verify_chain_integrity", &err);
                return Err(err);
            }
        }

        Ok(())
    }

    /// `build_from_certificates` builds a chain starting at `leaf` by repeatedly selecting the first
    /// certificate in `pool` whose subject name equals the issuer name of the last certificate in the
    /// chain. Certificates whose serial number is already in the chain are passed over.
    ///
    /// Building stops at a self-signed certificate or once the chain holds
    /// [`MAX_CHAIN_LENGTH`](crate::MAX_CHAIN_LENGTH) certificates. An
    /// [`ValidationErrorKind::IncompleteChain`] error is returned if an issuer cannot be found first.
    pub fn build_from_certificates(leaf: &'a C, pool: &'a [C]) -> Result<Self> {
        let path = build_path(leaf, &[pool], CycleGuard::SkipSerialInChain);
        match path.termination {
            PathTermination::SelfSigned | PathTermination::DepthLimit => {
                debug!(
                    "Built chain of length {} for {}",
                    path.certificates.len(),
                    leaf.subject_dn()
                );
                Ok(CertificateChain::new(path.certificates))
            }
            PathTermination::MissingIssuer | PathTermination::Cycle => {
                let err = Error::validation(ValidationErrorKind::IncompleteChain, context_for(leaf));
                log_error("build_from_certificates", &err);
                Err(err)
            }
        }
    }
}
