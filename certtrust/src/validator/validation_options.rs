//! Structures and functions related to configuring certificate validation

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use log::error;
use serde::{Deserialize, Serialize};

use pkiprocmacros::*;

use crate::alloc::string::ToString;
use crate::TimeOfInterest;

#[cfg(feature = "std")]
use std::path::Path;

#[cfg(feature = "std")]
use crate::{Error, Result};

/// `Strings` is a typedef for a vector of String values.
pub type Strings = Vec<String>;

/// `ValidationOptions` is a map of option names to values that governs the checks performed by
/// [`CertificateValidator`](crate::CertificateValidator). Absent items take the default listed with
/// each key below. Options are set before validation and only read during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions(pub BTreeMap<String, ValidationOptionTypes>);

/// `ValidationOptionTypes` is used to define a variant map with the types of values that may appear
/// in [`ValidationOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOptionTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u64 values
    U64(u64),
    /// Represents String values
    String(String),
    /// Represents vectors of Strings
    Strings(Strings),
}

/// `VO_VALIDATE_CERTIFICATE_CHAIN` governs whether a chain is built and checked for termination at a
/// trust anchor. Default: true
pub static VO_VALIDATE_CERTIFICATE_CHAIN: &str = "voValidateCertificateChain";

/// `VO_VALIDATE_KEY_USAGE` governs whether the key usage check runs. Default: true
pub static VO_VALIDATE_KEY_USAGE: &str = "voValidateKeyUsage";

/// `VO_VALIDATE_EXTENDED_KEY_USAGE` governs whether extended key usage is checked. Default: true
pub static VO_VALIDATE_EXTENDED_KEY_USAGE: &str = "voValidateExtendedKeyUsage";

/// `VO_REQUIRE_COMPLETE_CERTIFICATE_CHAIN` is carried for callers; no validator reads it. Default: true
pub static VO_REQUIRE_COMPLETE_CERTIFICATE_CHAIN: &str = "voRequireCompleteCertificateChain";

/// `VO_ALLOW_SELF_SIGNED_CERTIFICATES` is carried for callers; no validator reads it. Default: false
pub static VO_ALLOW_SELF_SIGNED_CERTIFICATES: &str = "voAllowSelfSignedCertificates";

/// `VO_EXPECTED_KEY_USAGE` lists key usage names the target certificate is expected to assert, i.e.,
/// `digitalSignature`. Default: empty
pub static VO_EXPECTED_KEY_USAGE: &str = "voExpectedKeyUsage";

/// `VO_EXPECTED_EXTENDED_KEY_USAGE` lists dotted decimal extended key usage OIDs the target
/// certificate is expected to assert. Default: empty
pub static VO_EXPECTED_EXTENDED_KEY_USAGE: &str = "voExpectedExtendedKeyUsage";

/// `VO_CHECK_REVOCATION` is carried for callers; revocation checking is not performed. Default: false
pub static VO_CHECK_REVOCATION: &str = "voCheckRevocation";

/// `VO_VALIDATE_SUBJECT_ALTERNATIVE_NAME` is carried for callers; no validator reads it. Default: true
pub static VO_VALIDATE_SUBJECT_ALTERNATIVE_NAME: &str = "voValidateSubjectAlternativeName";

/// `VO_EXPECTED_HOSTNAME` is carried for callers; hostname matching is not performed. Default: none
pub static VO_EXPECTED_HOSTNAME: &str = "voExpectedHostname";

/// `VO_TIME_OF_INTEREST` is the time, as seconds since Unix epoch, at which validity periods are
/// evaluated. Zero disables the time comparison, but a certificate lacking a notBefore or notAfter
/// date is still rejected. Default: none, i.e., the current time with the `std` feature and a
/// disabled time of interest without it
pub static VO_TIME_OF_INTEREST: &str = "voTimeOfInterest";

//-----------------------------------------------------------------------------------------------
// Getters/setters for options
//-----------------------------------------------------------------------------------------------
vo_gets_and_sets_with_default!(VO_VALIDATE_CERTIFICATE_CHAIN, bool, true);
vo_gets_and_sets_with_default!(VO_VALIDATE_KEY_USAGE, bool, true);
vo_gets_and_sets_with_default!(VO_VALIDATE_EXTENDED_KEY_USAGE, bool, true);
vo_gets_and_sets_with_default!(VO_REQUIRE_COMPLETE_CERTIFICATE_CHAIN, bool, true);
vo_gets_and_sets_with_default!(VO_ALLOW_SELF_SIGNED_CERTIFICATES, bool, false);
vo_gets_and_sets_with_default!(VO_EXPECTED_KEY_USAGE, Strings, Vec::new());
vo_gets_and_sets_with_default!(VO_EXPECTED_EXTENDED_KEY_USAGE, Strings, Vec::new());
vo_gets_and_sets_with_default!(VO_CHECK_REVOCATION, bool, false);
vo_gets_and_sets_with_default!(VO_VALIDATE_SUBJECT_ALTERNATIVE_NAME, bool, true);
vo_gets_and_sets!(VO_EXPECTED_HOSTNAME, String);
vo_gets_and_sets!(VO_TIME_OF_INTEREST, u64);

impl ValidationOptions {
    /// Creates a new empty [`ValidationOptions`], i.e., all items take default values
    pub fn new() -> Self {
        Self::default()
    }

    /// `get_time_of_interest_or_now` returns the configured time of interest or, if none is configured
    /// or the configured value cannot be represented, the current time. Without the `std` feature
    /// the fallback is a disabled time of interest, i.e., validity periods are not compared to any
    /// time.
    pub fn get_time_of_interest_or_now(&self) -> TimeOfInterest {
        match self.get_time_of_interest() {
            Some(secs) => match TimeOfInterest::from_unix_secs(secs) {
                Ok(toi) => toi,
                Err(e) => {
                    error!(
                        "Configured time of interest {} is not usable ({}), using the current time",
                        secs,
                        e
                    );
                    TimeOfInterest::default()
                }
            },
            None => TimeOfInterest::default(),
        }
    }
}

#[cfg(feature = "std")]
impl ValidationOptions {
    /// Parses [`ValidationOptions`] from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            error!("Failed to parse validation options: {}", e);
            Error::ParseError
        })
    }

    /// Serializes [`ValidationOptions`] as a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            error!("Failed to serialize validation options: {}", e);
            Error::ParseError
        })
    }

    /// `from_file` reads JSON-encoded [`ValidationOptions`] from the named file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            error!(
                "Failed to read validation options from {}: {}",
                path.as_ref().display(),
                e
            );
            Error::from(e)
        })?;
        Self::from_json(&json)
    }
}

#[test]
fn test_default_gets_vo() {
    let vo = ValidationOptions::default();

    assert!(vo.get_validate_certificate_chain());
    assert!(vo.get_validate_key_usage());
    assert!(vo.get_validate_extended_key_usage());
    assert!(vo.get_require_complete_certificate_chain());
    assert!(!vo.get_allow_self_signed_certificates());
    assert!(vo.get_expected_key_usage().is_empty());
    assert!(vo.get_expected_extended_key_usage().is_empty());
    assert!(!vo.get_check_revocation());
    assert!(vo.get_validate_subject_alternative_name());
    assert!(vo.get_expected_hostname().is_none());
    assert!(vo.get_time_of_interest().is_none());
}

#[test]
fn test_gets_and_sets_vo() {
    let mut vo = ValidationOptions::new();
    vo.set_validate_key_usage(false);
    vo.set_expected_key_usage(alloc::vec!["digitalSignature".to_string()]);
    vo.set_expected_hostname("www.example.com".to_string());
    vo.set_time_of_interest(1_700_000_000);

    assert!(!vo.get_validate_key_usage());
    assert_eq!(
        alloc::vec!["digitalSignature".to_string()],
        vo.get_expected_key_usage()
    );
    assert_eq!(
        Some("www.example.com".to_string()),
        vo.get_expected_hostname()
    );
    assert_eq!(1_700_000_000, vo.get_time_of_interest_or_now().as_unix_secs());

    // a value of the wrong type falls back to the default
    vo.0.insert(
        VO_VALIDATE_CERTIFICATE_CHAIN.to_string(),
        ValidationOptionTypes::U64(0),
    );
    assert!(vo.get_validate_certificate_chain());
}
