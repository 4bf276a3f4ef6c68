//! Certificate policy constraints evaluated over a built chain

use alloc::{collections::BTreeSet, format, vec::Vec};

use der::asn1::ObjectIdentifier;
use log::{debug, info};

use crate::{policies_of, CertificateChain, CertificateData, CertificatePolicy, ValidationResult};

/// `ObjectIdentifierSet` is a typedef for a set of policy OIDs
pub type ObjectIdentifierSet = BTreeSet<ObjectIdentifier>;

/// `PolicyValidator` checks the certificate policies asserted along a [`CertificateChain`].
///
/// The end entity certificate must assert a policy from the expected set (or anyPolicy) when any
/// expected policies are configured. When `require_explicit_policy` is set the end entity
/// certificate must assert at least one policy. When `require_policy_mapping` is set each policy
/// asserted by a certificate must be matched by a policy asserted by its issuer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyValidator {
    expected_policies: ObjectIdentifierSet,
    require_explicit_policy: bool,
    require_policy_mapping: bool,
}

impl Default for PolicyValidator {
    fn default() -> Self {
        PolicyValidator {
            expected_policies: ObjectIdentifierSet::new(),
            require_explicit_policy: true,
            require_policy_mapping: false,
        }
    }
}

impl PolicyValidator {
    /// Creates a validator with no expected policies that requires an explicit policy and does not
    /// require policy mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an expected policy OID
    pub fn add_expected_policy(&mut self, policy_oid: ObjectIdentifier) -> &mut Self {
        self.expected_policies.insert(policy_oid);
        self
    }

    /// `add_expected_policy_str` adds an expected policy given as dotted decimal text. Text that does
    /// not parse as an OID is ignored and false is returned.
    pub fn add_expected_policy_str(&mut self, policy_oid: &str) -> bool {
        match ObjectIdentifier::new(policy_oid) {
            Ok(oid) => {
                self.expected_policies.insert(oid);
                true
            }
            Err(e) => {
                debug!("Ignoring expected policy {}: {}", policy_oid, e);
                false
            }
        }
    }

    /// Returns the expected policy OIDs
    pub fn expected_policies(&self) -> &ObjectIdentifierSet {
        &self.expected_policies
    }

    /// Sets whether the end entity certificate must assert at least one policy
    pub fn set_require_explicit_policy(&mut self, require: bool) -> &mut Self {
        self.require_explicit_policy = require;
        self
    }

    /// Returns whether an explicit policy is required
    pub fn require_explicit_policy(&self) -> bool {
        self.require_explicit_policy
    }

    /// Sets whether policies must be matched between each certificate and its issuer
    pub fn set_require_policy_mapping(&mut self, require: bool) -> &mut Self {
        self.require_policy_mapping = require;
        self
    }

    /// Returns whether policy mapping is required
    pub fn require_policy_mapping(&self) -> bool {
        self.require_policy_mapping
    }

    /// `validate` evaluates the configured policy constraints over `chain`, recording messages in
    /// `result`. Returns true if all constraints are satisfied.
    pub fn validate<C: CertificateData>(
        &self,
        chain: &CertificateChain<'_, C>,
        result: &mut ValidationResult,
    ) -> bool {
        let leaf = match chain.end_entity_certificate() {
            Some(leaf) => leaf,
            None => {
                result.add_error("cannot validate empty chain");
                return false;
            }
        };

        if self.expected_policies.is_empty() && !self.require_explicit_policy {
            result.add_info("no policy constraints configured, policy validation skipped");
            return true;
        }

        let leaf_policies = policies_of(leaf);
        debug!(
            "Certificate issued to {} asserts {} policies",
            leaf.subject_dn(),
            leaf_policies.len()
        );

        if self.require_explicit_policy && leaf_policies.is_empty() {
            result.add_error("certificate has no policy extension but explicit policy is required");
            return false;
        }

        if !self.expected_policies.is_empty() && !self.leaf_matches_expected(&leaf_policies) {
            result.add_error("certificate policies do not match the expected policies");
            return false;
        }

        if self.require_policy_mapping && chain.len() > 1 {
            if !check_policy_mapping(chain.certificates(), result) {
                return false;
            }
            result.add_info("policy mapping validated");
        }

        info!("Validated policies for {}", leaf.subject_dn());
        result.add_info("policy validated");
        true
    }

    fn leaf_matches_expected(&self, leaf_policies: &[CertificatePolicy]) -> bool {
        leaf_policies
            .iter()
            .any(|p| p.is_any_policy() || self.expected_policies.contains(&p.policy_oid))
    }
}

fn check_policy_mapping<C: CertificateData>(
    certificates: &[&C],
    result: &mut ValidationResult,
) -> bool {
    for pair in certificates.windows(2) {
        let current_policies = policies_of(pair[0]);
        if current_policies.is_empty() {
            continue;
        }

        let issuer_policies: Vec<CertificatePolicy> = policies_of(pair[1]);
        if issuer_policies.is_empty() {
            debug!(
                "Issuer {} of {} asserts no policies",
                pair[1].subject_dn(),
                pair[0].subject_dn()
            );
            result.add_error("inconsistent policies in chain: issuer has no policies");
            return false;
        }

        if let Some(unmatched) = current_policies
            .iter()
            .find(|cp| !issuer_policies.iter().any(|ip| cp.matches(ip)))
        {
            result.add_error(&format!(
                "inconsistent policies in chain: policy {} is not compatible",
                unmatched
            ));
            return false;
        }
    }
    true
}
