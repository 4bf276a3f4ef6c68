//! Groups of certificates that share a subject and public key but were issued by different CAs

use alloc::{
    collections::{btree_map::Entry, BTreeMap},
    format,
    string::String,
    vec::Vec,
};

use log::debug;

use crate::util::error::*;
use crate::util::logging::log_error;
use crate::{buffer_to_hex, context_for, CertificateData};

/// `CrossSignedCertificate` groups a primary certificate with alternate certificates that carry the
/// same subject name and public key but were issued by different issuers.
///
/// Every alternate is checked when it is added. An alternate that does not share the primary's public
/// key and subject name, or that shares the primary's issuer name, is rejected and the group is left
/// unchanged.
#[derive(Clone, Debug)]
#[readonly::make]
pub struct CrossSignedCertificate<'a, C> {
    /// `primary` is the first certificate seen for the subject and public key
    #[readonly]
    pub primary: &'a C,
    /// `alternates` holds the cross-signed certificates in the order they were added
    #[readonly]
    pub alternates: Vec<&'a C>,
}

impl<'a, C: CertificateData> CrossSignedCertificate<'a, C> {
    /// Creates a group from a primary certificate and its alternates. Fails on the first alternate
    /// that violates the grouping rules.
    pub fn new(primary: &'a C, alternates: Vec<&'a C>) -> Result<Self> {
        let mut group = CrossSignedCertificate {
            primary,
            alternates: Vec::with_capacity(alternates.len()),
        };
        for alternate in alternates {
            group.add_cross_signed_certificate(alternate)?;
        }
        Ok(group)
    }

    /// `add_cross_signed_certificate` appends `alternate` after checking that it shares the primary's
    /// public key and subject name and was issued by a different issuer.
    pub fn add_cross_signed_certificate(&mut self, alternate: &'a C) -> Result<&mut Self> {
        check_alternate(self.primary, alternate)?;
        self.alternates.push(alternate);
        Ok(self)
    }

    /// Returns the primary certificate
    pub fn primary_certificate(&self) -> &'a C {
        self.primary
    }

    /// Returns the alternates in the order they were added
    pub fn cross_signed_certificates(&self) -> &[&'a C] {
        &self.alternates
    }

    /// Returns true if the group has at least one alternate
    pub fn has_cross_signed_certificates(&self) -> bool {
        !self.alternates.is_empty()
    }

    /// `certificate_by_issuer` returns the first alternate issued by `issuer_dn`, or the primary if it
    /// was issued by `issuer_dn`.
    pub fn certificate_by_issuer(&self, issuer_dn: &str) -> Option<&'a C> {
        self.alternates
            .iter()
            .copied()
            .find(|c| c.issuer_dn() == issuer_dn)
            .or_else(|| Some(self.primary).filter(|p| p.issuer_dn() == issuer_dn))
    }

    /// Returns true if any certificate in the group was issued by `issuer_dn`
    pub fn has_certificate_from_issuer(&self, issuer_dn: &str) -> bool {
        self.certificate_by_issuer(issuer_dn).is_some()
    }

    /// `detect_from_certificates` groups `certificates` by public key and subject name. The first
    /// certificate seen for a group becomes its primary and later ones are added as alternates. Every
    /// certificate lands in exactly one group.
    ///
    /// The returned map is keyed by the hex encoded public key and the subject name separated by `|`.
    /// An error is returned if an alternate repeats the issuer of its group's primary.
    pub fn detect_from_certificates(certificates: &'a [C]) -> Result<BTreeMap<String, Self>> {
        let mut groups: BTreeMap<String, Self> = BTreeMap::new();
        for cert in certificates {
            match groups.entry(group_key(cert)) {
                Entry::Occupied(mut group) => {
                    group.get_mut().add_cross_signed_certificate(cert)?;
                }
                Entry::Vacant(slot) => {
                    slot.insert(CrossSignedCertificate {
                        primary: cert,
                        alternates: Vec::new(),
                    });
                }
            }
        }
        debug!(
            "Detected {} certificate groups among {} certificates",
            groups.len(),
            certificates.len()
        );
        Ok(groups)
    }
}

/// Returns the key under which [`CrossSignedCertificate::detect_from_certificates`] groups `cert`
pub fn group_key<C: CertificateData + ?Sized>(cert: &C) -> String {
    format!("{}|{}", buffer_to_hex(cert.public_key()), cert.subject_dn())
}

fn check_alternate<C: CertificateData>(primary: &C, alternate: &C) -> Result<()> {
    let kind = if alternate.public_key() != primary.public_key() {
        ValidationErrorKind::PublicKeyMismatch
    } else if alternate.subject_dn() != primary.subject_dn() {
        ValidationErrorKind::SubjectMismatch
    } else if alternate.issuer_dn() == primary.issuer_dn() {
        ValidationErrorKind::SameIssuer
    } else {
        return Ok(());
    };

    let err = Error::validation(
        kind,
        context_for(alternate)
            .with_issuer(alternate.issuer_dn())
            .with_detail(&format!("primary subject: {}", primary.subject_dn())),
    );
    log_error("add_cross_signed_certificate", &err);
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertificateRecord;
    use alloc::vec;

    fn cert(subject: &str, issuer: &str, serial: &str, key: &[u8]) -> CertificateRecord {
        CertificateRecord::new(subject, issuer, serial).with_public_key(key)
    }

    #[test]
    fn insertion_rules() {
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let alt = cert("CN=CA", "CN=Root2", "02", b"K");
        let other_key = cert("CN=CA", "CN=Root2", "03", b"K2");
        let other_subject = cert("CN=Other", "CN=Root2", "04", b"K");
        let same_issuer = cert("CN=CA", "CN=Root1", "05", b"K");

        let mut group = CrossSignedCertificate::new(&primary, vec![]).unwrap();
        assert!(!group.has_cross_signed_certificates());
        group.add_cross_signed_certificate(&alt).unwrap();

        for (bad, kind) in [
            (&other_key, ValidationErrorKind::PublicKeyMismatch),
            (&other_subject, ValidationErrorKind::SubjectMismatch),
            (&same_issuer, ValidationErrorKind::SameIssuer),
        ] {
            let err = group.add_cross_signed_certificate(bad).unwrap_err();
            assert_eq!(Some(kind), err.kind());
            assert_eq!(Some(bad.serial_number.clone()), err.context().unwrap().serial_number.clone());
            assert_eq!(1, group.cross_signed_certificates().len());
        }

        let err = CrossSignedCertificate::new(&primary, vec![&alt, &other_key]).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::PublicKeyMismatch), err.kind());
    }

    #[test]
    fn lookup_by_issuer() {
        let primary = cert("CN=CA", "CN=Root1", "01", b"K");
        let alt = cert("CN=CA", "CN=Root2", "02", b"K");
        let group = CrossSignedCertificate::new(&primary, vec![&alt]).unwrap();

        assert_eq!("01", group.primary_certificate().serial_number());
        assert_eq!("01", group.primary.serial_number());
        assert_eq!(
            Some("02"),
            group.certificate_by_issuer("CN=Root2").map(|c| c.serial_number())
        );
        assert_eq!(
            Some("01"),
            group.certificate_by_issuer("CN=Root1").map(|c| c.serial_number())
        );
        assert!(group.has_certificate_from_issuer("CN=Root2"));
        assert!(!group.has_certificate_from_issuer("CN=Root3"));
    }

    #[test]
    fn detection_groups() {
        let pool = vec![
            cert("CN=S", "CN=I1", "01", b"K"),
            cert("CN=S2", "CN=I3", "03", b"K2"),
            cert("CN=S", "CN=I2", "02", b"K"),
            cert("CN=S", "CN=I4", "04", b"K9"),
        ];
        let groups = CrossSignedCertificate::detect_from_certificates(&pool).unwrap();
        assert_eq!(3, groups.len());

        let ks = &groups[&group_key(&pool[0])];
        assert_eq!("01", ks.primary_certificate().serial_number());
        assert_eq!(1, ks.cross_signed_certificates().len());
        assert_eq!("02", ks.cross_signed_certificates()[0].serial_number());
        assert!(!groups[&group_key(&pool[1])].has_cross_signed_certificates());
        assert!(!groups[&group_key(&pool[3])].has_cross_signed_certificates());
        assert_eq!(
            format!("{}|CN=S", buffer_to_hex(b"K")),
            group_key(&pool[0])
        );

        let duplicates = vec![
            cert("CN=S", "CN=I1", "01", b"K"),
            cert("CN=S", "CN=I1", "02", b"K"),
        ];
        let err = CrossSignedCertificate::detect_from_certificates(&duplicates).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::SameIssuer), err.kind());
    }
}
