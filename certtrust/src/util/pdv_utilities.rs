//! Utility functions shared by the chain builders and validators

use alloc::{
    format,
    string::{String, ToString},
};
use core::str;

use subtle_encoding::hex;

use crate::{
    log_error_for_subject, CertificateData, Error, ErrorContext, Result, TimeOfInterest,
    ValidationErrorKind,
};

/// `buffer_to_hex` takes a byte array and returns a string featuring upper case ASCII hex characters (without
/// commas, spaces, or brackets).
/// ```
/// use certtrust::buffer_to_hex;
/// let buf :[u8; 3] = [1,2,3];
/// let bufhex = buffer_to_hex(&buf);
/// assert_eq!(bufhex, "010203");
/// ```
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    let hex = hex::encode_upper(buffer);
    let r = str::from_utf8(hex.as_slice());
    if let Ok(s) = r {
        s.to_string()
    } else {
        "".to_string()
    }
}

/// `context_for` returns an [`ErrorContext`] populated with the subject name and serial number of
/// the given certificate.
pub fn context_for<C: CertificateData + ?Sized>(cert: &C) -> ErrorContext {
    ErrorContext::new()
        .with_subject(cert.subject_dn())
        .with_serial_number(cert.serial_number())
}

/// `valid_at_time` evaluates the validity period of a certificate relative to the time of interest.
/// It returns the number of seconds until the certificate expires, or 0 when the time of interest
/// is disabled. A certificate lacking either bound is invalid whether or not the time of interest is
/// disabled.
pub fn valid_at_time<C: CertificateData + ?Sized>(
    target: &C,
    toi: &TimeOfInterest,
    stifle_log: bool,
) -> Result<u64> {
    let (nb, na) = match (target.not_before(), target.not_after()) {
        (Some(nb), Some(na)) => (nb, na),
        _ => {
            if !stifle_log {
                log_error_for_subject(target.subject_dn(), "validity period is incomplete");
            }
            return Err(Error::validation(
                ValidationErrorKind::IncompleteValidity,
                context_for(target),
            ));
        }
    };

    if toi.is_disabled() {
        return Ok(0);
    }

    if *toi < nb {
        if !stifle_log {
            log_error_for_subject(target.subject_dn(), "certificate is not yet valid, i.e., not_before is after the configured time of interest");
        }
        return Err(Error::validation(
            ValidationErrorKind::NotYetValid,
            context_for(target).with_detail(&format!("not before: {}", nb)),
        ));
    }

    if *toi > na {
        if !stifle_log {
            log_error_for_subject(
                target.subject_dn(),
                format!(
                    "certificate is expired relative to the configured time of interest: {}",
                    na
                )
                .as_str(),
            );
        }
        return Err(Error::validation(
            ValidationErrorKind::Expired,
            context_for(target).with_detail(&format!("not after: {}", na)),
        ));
    }

    let na_secs = na.unix_duration().as_secs();
    Ok(na_secs.saturating_sub(toi.as_unix_secs()))
}

/// `find_issuer` returns the first certificate whose subject name equals the issuer name of `target`,
/// searching each of `sources` in the order given.
pub fn find_issuer<'a, C: CertificateData + ?Sized, I: CertificateData>(
    target: &C,
    sources: &[&'a [I]],
) -> Option<&'a I> {
    let issuer_dn = target.issuer_dn();
    sources
        .iter()
        .flat_map(|source| source.iter())
        .find(|candidate| candidate.subject_dn() == issuer_dn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertificateRecord;
    use alloc::vec;

    fn toi(secs: u64) -> TimeOfInterest {
        TimeOfInterest::from_unix_secs(secs).unwrap()
    }

    fn cert_valid_between(nb: u64, na: u64) -> CertificateRecord {
        CertificateRecord::new("CN=Leaf", "CN=CA", "01")
            .with_validity(toi(nb).0, toi(na).0)
    }

    #[test]
    fn valid_at_time_test() {
        let cert = cert_valid_between(1_000_000, 2_000_000);
        assert_eq!(500_000, valid_at_time(&cert, &toi(1_500_000), true).unwrap());

        let err = valid_at_time(&cert, &toi(999_999), true).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::NotYetValid), err.kind());

        let err = valid_at_time(&cert, &toi(2_000_001), true).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::Expired), err.kind());
        assert_eq!(
            Some("CN=Leaf"),
            err.context().and_then(|c| c.subject.as_deref())
        );

        // bounds are inclusive
        assert!(valid_at_time(&cert, &toi(2_000_000), true).is_ok());
        assert!(valid_at_time(&cert, &toi(1_000_000), true).is_ok());

        assert_eq!(
            0,
            valid_at_time(&cert, &TimeOfInterest::disabled(), true).unwrap()
        );
    }

    #[test]
    fn valid_at_time_incomplete() {
        let cert = CertificateRecord::new("CN=Leaf", "CN=CA", "01");
        let err = valid_at_time(&cert, &toi(1_500_000), true).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::IncompleteValidity), err.kind());

        // absent bounds are reported even when time checks are disabled
        let err = valid_at_time(&cert, &TimeOfInterest::disabled(), true).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::IncompleteValidity), err.kind());

        let mut half_open = cert_valid_between(1_000_000, 2_000_000);
        half_open.not_after = None;
        let err = valid_at_time(&half_open, &TimeOfInterest::disabled(), true).unwrap_err();
        assert_eq!(Some(ValidationErrorKind::IncompleteValidity), err.kind());
    }

    #[test]
    fn find_issuer_test() {
        let leaf = CertificateRecord::new("CN=Leaf", "CN=CA", "01");
        let ca1 = CertificateRecord::new("CN=CA", "CN=Root", "02");
        let ca2 = CertificateRecord::new("CN=CA", "CN=Other Root", "03");
        let other = CertificateRecord::new("CN=Other", "CN=Root", "04");
        let intermediates = vec![other.clone(), ca1];
        let anchors = vec![ca2];

        let found = find_issuer(&leaf, &[intermediates.as_slice(), anchors.as_slice()]).unwrap();
        assert_eq!("02", found.serial_number());

        let found = find_issuer(&leaf, &[anchors.as_slice(), intermediates.as_slice()]).unwrap();
        assert_eq!("03", found.serial_number());

        assert!(find_issuer(&other, &[anchors.as_slice()]).is_none());
    }
}
