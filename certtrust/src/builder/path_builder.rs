//! Bounded issuer-chasing path builder shared by [`CertificateChain`](crate::CertificateChain),
//! [`CertificateValidator`](crate::CertificateValidator) and
//! [`CrossSignValidator`](crate::CrossSignValidator).

use alloc::{vec, vec::Vec};
use core::ptr;

use log::debug;

use crate::CertificateData;

/// Maximum number of certificates in a built path, including the starting certificate
pub const MAX_CHAIN_LENGTH: usize = 10;

/// `CycleGuard` selects how the builder reacts when the issuer it would append is already part of the
/// path being built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleGuard {
    /// Skip any candidate whose serial number already appears in the path and keep looking for
    /// another candidate.
    SkipSerialInChain,
    /// Stop building when the first candidate is the same certificate object as one already in the path.
    /// The partial path is kept.
    StopOnSameCertificate,
    /// Treat a first candidate whose serial number already appears in the path as a cycle.
    RejectRepeatedSerial,
}

/// Reason the builder stopped
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathTermination {
    /// The last certificate in the path is self-signed
    SelfSigned,
    /// The path reached [`MAX_CHAIN_LENGTH`] certificates
    DepthLimit,
    /// No acceptable issuer was available for the last certificate in the path
    MissingIssuer,
    /// The next issuer would have repeated a certificate already in the path
    Cycle,
}

/// Output of [`build_path`]
#[derive(Clone, Debug)]
pub struct BuiltPath<'a, C> {
    /// Certificates from the starting certificate towards the root
    pub certificates: Vec<&'a C>,
    /// Why building stopped
    pub termination: PathTermination,
}

fn serial_in_path<C: CertificateData>(path: &[&C], candidate: &C) -> bool {
    path.iter()
        .any(|c| c.serial_number() == candidate.serial_number())
}

/// `build_path` starts a path with `leaf` and repeatedly appends an issuer of the last certificate
/// until the last certificate is self-signed, the path holds [`MAX_CHAIN_LENGTH`] certificates, no
/// issuer is available, or `guard` reports a cycle.
///
/// Issuer candidates are certificates whose subject name equals the issuer name of the last
/// certificate in the path, taken from `sources` in order and from each source in order. The
/// first acceptable candidate wins.
pub fn build_path<'a, C: CertificateData>(
    leaf: &'a C,
    sources: &[&'a [C]],
    guard: CycleGuard,
) -> BuiltPath<'a, C> {
    let mut certificates = vec![leaf];
    let mut current = leaf;

    let termination = loop {
        if current.is_self_signed() {
            break PathTermination::SelfSigned;
        }
        if certificates.len() >= MAX_CHAIN_LENGTH {
            break PathTermination::DepthLimit;
        }

        let issuer_dn = current.issuer_dn();
        let mut candidates = sources
            .iter()
            .flat_map(|source| source.iter())
            .filter(|c| c.subject_dn() == issuer_dn);

        let next = match guard {
            CycleGuard::SkipSerialInChain => {
                match candidates.find(|c| !serial_in_path(&certificates, *c)) {
                    Some(c) => c,
                    None => break PathTermination::MissingIssuer,
                }
            }
            CycleGuard::StopOnSameCertificate => match candidates.next() {
                Some(c) if certificates.iter().any(|p| ptr::eq(*p, c)) => {
                    break PathTermination::Cycle
                }
                Some(c) => c,
                None => break PathTermination::MissingIssuer,
            },
            CycleGuard::RejectRepeatedSerial => match candidates.next() {
                Some(c) if serial_in_path(&certificates, c) => break PathTermination::Cycle,
                Some(c) => c,
                None => break PathTermination::MissingIssuer,
            },
        };

        certificates.push(next);
        current = next;
    };

    debug!(
        "Built path of length {} for {} ({:?})",
        certificates.len(),
        leaf.subject_dn(),
        termination
    );

    BuiltPath {
        certificates,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertificateRecord;
    use alloc::{format, string::ToString};

    fn cert(subject: &str, issuer: &str, serial: &str) -> CertificateRecord {
        CertificateRecord::new(subject, issuer, serial)
    }

    fn serials<'a, C: CertificateData>(path: &BuiltPath<'a, C>) -> Vec<&'a str> {
        path.certificates.iter().map(|&c| c.serial_number()).collect()
    }

    #[test]
    fn builds_to_self_signed_root() {
        let leaf = cert("CN=Leaf", "CN=CA", "01");
        let pool = vec![
            cert("CN=Root", "CN=Root", "03"),
            cert("CN=CA", "CN=Root", "02"),
        ];
        for guard in [
            CycleGuard::SkipSerialInChain,
            CycleGuard::StopOnSameCertificate,
            CycleGuard::RejectRepeatedSerial,
        ] {
            let path = build_path(&leaf, &[pool.as_slice()], guard);
            assert_eq!(PathTermination::SelfSigned, path.termination);
            assert_eq!(vec!["01", "02", "03"], serials(&path));
        }
    }

    #[test]
    fn missing_issuer() {
        let leaf = cert("CN=Leaf", "CN=CA", "01");
        let pool = vec![cert("CN=Other", "CN=Root", "02")];
        let path = build_path(&leaf, &[pool.as_slice()], CycleGuard::SkipSerialInChain);
        assert_eq!(PathTermination::MissingIssuer, path.termination);
        assert_eq!(1, path.certificates.len());
    }

    #[test]
    fn depth_is_bounded() {
        // a long line of CAs with no root
        let pool: Vec<CertificateRecord> = (0..20)
            .map(|i| {
                cert(
                    &format!("CN=CA{}", i),
                    &format!("CN=CA{}", i + 1),
                    &format!("{:02}", i + 1),
                )
            })
            .collect();
        let leaf = cert("CN=Leaf", "CN=CA0", "00");
        for guard in [
            CycleGuard::SkipSerialInChain,
            CycleGuard::StopOnSameCertificate,
            CycleGuard::RejectRepeatedSerial,
        ] {
            let path = build_path(&leaf, &[pool.as_slice()], guard);
            assert_eq!(PathTermination::DepthLimit, path.termination);
            assert_eq!(MAX_CHAIN_LENGTH, path.certificates.len());
        }
    }

    #[test]
    fn cycle_guards() {
        // A and B issue each other
        let leaf = cert("CN=Leaf", "CN=A", "01");
        let pool = vec![cert("CN=A", "CN=B", "0A"), cert("CN=B", "CN=A", "0B")];

        let path = build_path(&leaf, &[pool.as_slice()], CycleGuard::SkipSerialInChain);
        assert_eq!(PathTermination::MissingIssuer, path.termination);
        assert_eq!(vec!["01", "0A", "0B"], serials(&path));

        let path = build_path(&leaf, &[pool.as_slice()], CycleGuard::StopOnSameCertificate);
        assert_eq!(PathTermination::Cycle, path.termination);
        assert_eq!(vec!["01", "0A", "0B"], serials(&path));

        let path = build_path(&leaf, &[pool.as_slice()], CycleGuard::RejectRepeatedSerial);
        assert_eq!(PathTermination::Cycle, path.termination);
    }

    #[test]
    fn skip_prefers_unused_candidate() {
        let leaf = cert("CN=Leaf", "CN=A", "01");
        // the second CN=A certificate breaks the loop by chaining to a root
        let pool = vec![
            cert("CN=A", "CN=B", "0A"),
            cert("CN=B", "CN=A", "0B"),
            cert("CN=A", "CN=Root", "0C"),
            cert("CN=Root", "CN=Root", "FF"),
        ];
        let path = build_path(&leaf, &[pool.as_slice()], CycleGuard::SkipSerialInChain);
        assert_eq!(PathTermination::SelfSigned, path.termination);
        assert_eq!(vec!["01", "0A", "0B", "0C", "FF"], serials(&path));
    }

    #[test]
    fn sources_searched_in_order() {
        let leaf = cert("CN=Leaf", "CN=CA", "01");
        let first = vec![cert("CN=CA", "CN=CA", "AA")];
        let second = vec![cert("CN=CA", "CN=CA", "BB")];
        let path = build_path(
            &leaf,
            &[first.as_slice(), second.as_slice()],
            CycleGuard::StopOnSameCertificate,
        );
        assert_eq!("AA", path.certificates[1].serial_number());
        assert_eq!("CN=CA", path.certificates[1].subject_dn().to_string());
    }
}
