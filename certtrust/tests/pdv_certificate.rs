mod common;

use core::time::Duration;
use std::str::FromStr;

use certtrust::*;
use common::*;
use const_oid::db::rfc5280::ID_KP_SERVER_AUTH;
use const_oid::db::rfc5912::{
    ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_KEY_IDENTIFIER, ID_EC_PUBLIC_KEY, ID_QT_CPS, SHA_256_WITH_RSA_ENCRYPTION,
};
use der::asn1::{Any, BitString, Ia5String, ObjectIdentifier, OctetString, UtcTime};
use der::Encode;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::ext::pkix::certpolicy::{PolicyInformation, PolicyQualifierInfo};
use x509_cert::ext::pkix::{
    BasicConstraints, CertificatePolicies, ExtendedKeyUsage, KeyUsage, KeyUsages,
};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

const POLICY: &str = "2.16.840.1.101.3.2.1.48.1";

fn extension<T: Encode>(extn_id: ObjectIdentifier, value: &T) -> Extension {
    Extension {
        extn_id,
        critical: false,
        extn_value: OctetString::new(value.to_der().unwrap()).unwrap(),
    }
}

fn utc(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

fn make_cert(subject: &str, issuer: &str, serial: u8, key: &[u8], exts: Vec<Extension>) -> Certificate {
    let algorithm = AlgorithmIdentifierOwned {
        oid: SHA_256_WITH_RSA_ENCRYPTION,
        parameters: None,
    };
    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[serial]).unwrap(),
        signature: algorithm.clone(),
        issuer: Name::from_str(issuer).unwrap(),
        validity: Validity {
            not_before: utc(NOT_BEFORE),
            not_after: utc(NOT_AFTER),
        },
        subject: Name::from_str(subject).unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: ID_EC_PUBLIC_KEY,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(key).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: if exts.is_empty() { None } else { Some(exts) },
    };
    Certificate {
        tbs_certificate,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&[0x5A; 16]).unwrap(),
    }
}

fn leaf_certificate() -> Certificate {
    let cps = PolicyQualifierInfo {
        policy_qualifier_id: ID_QT_CPS,
        qualifier: Some(Any::encode_from(&Ia5String::new("https://example.com/cps").unwrap()).unwrap()),
    };
    let policies = CertificatePolicies(vec![PolicyInformation {
        policy_identifier: ObjectIdentifier::new_unwrap(POLICY),
        policy_qualifiers: Some(vec![cps]),
    }]);
    make_cert(
        "CN=Leaf",
        "CN=Root",
        0x0E,
        &[4, 1, 2, 3],
        vec![
            extension(ID_CE_CERTIFICATE_POLICIES, &policies),
            extension(
                ID_CE_KEY_USAGE,
                &KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment),
            ),
            extension(ID_CE_EXT_KEY_USAGE, &ExtendedKeyUsage(vec![ID_KP_SERVER_AUTH])),
            extension(ID_CE_SUBJECT_KEY_IDENTIFIER, &OctetString::new(vec![1, 2, 3]).unwrap()),
        ],
    )
}

fn root_certificate() -> Certificate {
    make_cert(
        "CN=Root",
        "CN=Root",
        0x01,
        &[4, 9, 9, 9],
        vec![extension(
            ID_CE_BASIC_CONSTRAINTS,
            &BasicConstraints {
                ca: true,
                path_len_constraint: Some(0),
            },
        )],
    )
}

#[test]
fn decoded_fields() {
    let decoded = leaf_certificate();
    let encoded = decoded.to_der().unwrap();
    let leaf = PDVCertificate::try_from(encoded.as_slice()).unwrap();
    assert_eq!(leaf, PDVCertificate::try_from(decoded.clone()).unwrap());
    assert_eq!(encoded, leaf.encoded_cert);

    assert_eq!("CN=Leaf", leaf.subject_dn());
    assert_eq!("CN=Root", leaf.issuer_dn());
    assert_eq!("0E", leaf.serial_number());
    assert!(!leaf.is_self_signed());
    assert_eq!(
        decoded.tbs_certificate.subject_public_key_info.to_der().unwrap(),
        leaf.public_key()
    );
    assert_eq!(&[0x5A; 16], leaf.signature());
    assert_eq!(Some(SHA_256_WITH_RSA_ENCRYPTION), leaf.signature_algorithm());
    assert_eq!(
        NOT_BEFORE,
        leaf.not_before().unwrap().unix_duration().as_secs()
    );
    assert_eq!(NOT_AFTER, leaf.not_after().unwrap().unix_duration().as_secs());
}

#[test]
fn decoded_extensions() {
    let leaf = PDVCertificate::try_from(leaf_certificate()).unwrap();

    let policies = policies_of(&leaf);
    assert_eq!(1, policies.len());
    assert_eq!(ObjectIdentifier::new_unwrap(POLICY), policies[0].policy_oid);
    assert_eq!(Some(ID_QT_CPS.to_string()), policies[0].qualifier);
    assert_eq!(
        Some("https://example.com/cps".to_string()),
        policies[0].policy_info_uri
    );

    let ku: Vec<&str> = leaf
        .extension(&ID_CE_KEY_USAGE)
        .and_then(|v| v.as_list())
        .unwrap()
        .iter()
        .filter_map(|v| v.as_text())
        .collect();
    assert_eq!(vec!["digitalSignature", "keyEncipherment"], ku);

    assert_eq!(
        Some(&ExtensionValue::List(vec![ExtensionValue::Oid(ID_KP_SERVER_AUTH)])),
        leaf.extension(&ID_CE_EXT_KEY_USAGE)
    );
    assert!(matches!(
        leaf.extension(&ID_CE_SUBJECT_KEY_IDENTIFIER),
        Some(ExtensionValue::Bytes(_))
    ));
    assert!(!leaf.has_extension(&ID_CE_BASIC_CONSTRAINTS));

    let root = PDVCertificate::try_from(root_certificate()).unwrap();
    assert!(root.is_self_signed());
    let bc = root.extension(&ID_CE_BASIC_CONSTRAINTS).unwrap();
    assert_eq!(Some(&ExtensionValue::Bool(true)), bc.field("ca"));
    assert_eq!(Some(&ExtensionValue::Integer(0)), bc.field("path_len"));
}

#[test]
fn validate_decoded_chain() {
    let leaf = PDVCertificate::try_from(leaf_certificate()).unwrap();
    let root = PDVCertificate::try_from(root_certificate()).unwrap();

    let pool = vec![root.clone()];
    let chain = CertificateChain::build_from_certificates(&leaf, &pool).unwrap();
    assert_eq!(2, chain.len());
    assert!(chain.verify_chain_integrity(false).is_ok());

    let mut vo = options_now();
    vo.set_expected_key_usage(vec!["digitalSignature".to_string()]);
    vo.set_expected_extended_key_usage(vec![ID_KP_SERVER_AUTH.to_string()]);
    let validator =
        CertificateValidator::new(vec![root], vo).with_key_usage_check(StrictKeyUsage);
    let result = validator.validate(&leaf, &[]);
    assert!(result.is_valid(), "{:?}", result);

    let mut pv = PolicyValidator::new();
    pv.add_expected_policy(ObjectIdentifier::new_unwrap(POLICY));
    let mut result = ValidationResult::new();
    assert!(pv.validate(&chain, &mut result));
}

#[test]
fn malformed_input() {
    let err = PDVCertificate::try_from([0x30u8, 0x03, 0x02, 0x01].as_slice()).unwrap_err();
    let err: Error = err.into();
    assert!(matches!(err, Error::Asn1Error(_)));
}

#[test]
fn malformed_extension_is_kept_as_bytes() {
    let mut decoded = leaf_certificate();
    let bogus = extension(ID_CE_KEY_USAGE, &OctetString::new(vec![1]).unwrap());
    decoded.tbs_certificate.extensions = Some(vec![bogus]);
    let leaf = PDVCertificate::try_from(decoded).unwrap();
    assert!(matches!(
        leaf.extension(&ID_CE_KEY_USAGE),
        Some(ExtensionValue::Bytes(_))
    ));
}
