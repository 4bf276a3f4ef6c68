//! Error types

use alloc::string::String;
use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// `ValidationErrorKind` classifies structural failures raised while building or checking a
/// certificate chain. Each kind carries a stable numeric code (see [`ValidationErrorKind::code`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum ValidationErrorKind {
    /// Expired occurs when the time of interest is after a certificate's notAfter date.
    Expired,
    /// NotYetValid occurs when the time of interest is before a certificate's notBefore date.
    NotYetValid,
    /// SignatureFailed occurs when the configured signature verifier rejects the signature on a
    /// certificate relative to the public key of its issuer.
    SignatureFailed,
    /// IssuerNotFound occurs when the issuer name of a certificate does not match the subject name
    /// of the next certificate in a chain.
    IssuerNotFound,
    /// IncompleteChain occurs when no issuer can be found for a certificate while building a chain
    /// from a pool of certificates.
    IncompleteChain,
    /// InvalidKeyUsage occurs when a key usage or extended key usage check rejects a certificate.
    InvalidKeyUsage,
    /// EmptyChain occurs when an operation requiring at least one certificate is given an empty chain.
    EmptyChain,
    /// RootNotSelfSigned occurs when the last certificate in a chain is not self-signed.
    RootNotSelfSigned,
    /// PublicKeyMismatch occurs when a cross-signed certificate does not share the public key of the
    /// primary certificate.
    PublicKeyMismatch,
    /// SubjectMismatch occurs when a cross-signed certificate does not share the subject name of the
    /// primary certificate.
    SubjectMismatch,
    /// SameIssuer occurs when a certificate offered as a cross-signed alternate has the same issuer
    /// as the primary certificate.
    SameIssuer,
    /// IncompleteValidity occurs when a certificate lacks a notBefore or notAfter date.
    IncompleteValidity,
}

impl ValidationErrorKind {
    /// Returns the numeric taxonomy code associated with the kind.
    pub fn code(&self) -> u16 {
        match self {
            ValidationErrorKind::Expired => 1001,
            ValidationErrorKind::NotYetValid => 1002,
            ValidationErrorKind::SignatureFailed => 1003,
            ValidationErrorKind::IssuerNotFound => 1004,
            ValidationErrorKind::IncompleteChain => 1005,
            ValidationErrorKind::InvalidKeyUsage => 1006,
            ValidationErrorKind::EmptyChain => 1007,
            ValidationErrorKind::RootNotSelfSigned => 1008,
            ValidationErrorKind::PublicKeyMismatch => 1009,
            ValidationErrorKind::SubjectMismatch => 1010,
            ValidationErrorKind::SameIssuer => 1011,
            ValidationErrorKind::IncompleteValidity => 1012,
        }
    }
}

/// `ErrorContext` carries the certificate details associated with a [`ValidationErrorKind`]. All
/// fields are optional; `detail` holds kind-specific information such as a date or usage name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorContext {
    /// Subject name of the certificate being processed
    pub subject: Option<String>,
    /// Serial number of the certificate being processed
    pub serial_number: Option<String>,
    /// Issuer name that was sought or that caused the failure
    pub issuer: Option<String>,
    /// Additional kind-specific information
    pub detail: Option<String>,
}

impl ErrorContext {
    /// Creates an empty [`ErrorContext`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subject name
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the serial number
    pub fn with_serial_number(mut self, serial_number: &str) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Sets the issuer name
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the kind-specific detail
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A structural validation failure with the certificate context that produced it
    Validation {
        /// Classification of the failure
        kind: ValidationErrorKind,
        /// Certificate details associated with the failure
        context: ErrorContext,
    },
    /// An artifact could not be parsed
    ParseError,
    /// Asn1Error is used to propagate error information from the x509 crate.
    Asn1Error(der::Error),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    #[cfg(feature = "std")]
    StdIoError(std::io::ErrorKind),
}

impl Error {
    /// Creates an [`Error::Validation`] value from a kind and context
    pub fn validation(kind: ValidationErrorKind, context: ErrorContext) -> Self {
        Error::Validation { kind, context }
    }

    /// Returns the [`ValidationErrorKind`] for [`Error::Validation`] values and None otherwise
    pub fn kind(&self) -> Option<ValidationErrorKind> {
        match self {
            Error::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the [`ErrorContext`] for [`Error::Validation`] values and None otherwise
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. } => Some(context),
            _ => None,
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::Expired => write!(f, "certificate has expired"),
            ValidationErrorKind::NotYetValid => write!(f, "certificate is not yet valid"),
            ValidationErrorKind::SignatureFailed => {
                write!(f, "certificate signature verification failed")
            }
            ValidationErrorKind::IssuerNotFound => write!(f, "issuer certificate not found"),
            ValidationErrorKind::IncompleteChain => write!(f, "certificate chain is incomplete"),
            ValidationErrorKind::InvalidKeyUsage => write!(f, "invalid key usage"),
            ValidationErrorKind::EmptyChain => write!(f, "certificate chain is empty"),
            ValidationErrorKind::RootNotSelfSigned => {
                write!(f, "root certificate of the chain is not self-signed")
            }
            ValidationErrorKind::PublicKeyMismatch => write!(
                f,
                "public key of the cross-signed certificate does not match the primary certificate"
            ),
            ValidationErrorKind::SubjectMismatch => write!(
                f,
                "subject of the cross-signed certificate does not match the primary certificate"
            ),
            ValidationErrorKind::SameIssuer => write!(
                f,
                "cross-signed certificate has the same issuer as the primary certificate"
            ),
            ValidationErrorKind::IncompleteValidity => {
                write!(f, "certificate validity period is incomplete")
            }
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(issuer) = &self.issuer {
            write!(f, "issuer: {}", issuer)?;
            sep = ", ";
        }
        if let Some(subject) = &self.subject {
            write!(f, "{}subject: {}", sep, subject)?;
            sep = ", ";
        }
        if let Some(serial_number) = &self.serial_number {
            write!(f, "{}serial number: {}", sep, serial_number)?;
            sep = ", ";
        }
        if let Some(detail) = &self.detail {
            write!(f, "{}{}", sep, detail)?;
        }
        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation { kind, context } => {
                if context == &ErrorContext::default() {
                    write!(f, "{} [{}]", kind, kind.code())
                } else {
                    write!(f, "{} [{}] ({})", kind, kind.code(), context)
                }
            }
            Error::ParseError => write!(f, "ParseError"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
            #[cfg(feature = "std")]
            Error::StdIoError(err) => write!(f, "StdError: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[test]
fn error_test() {
    use alloc::format;

    assert_eq!("ParseError", format!("{}", Error::ParseError));

    let e = Error::validation(ValidationErrorKind::Expired, ErrorContext::new());
    assert_eq!(
        format!("{}", e),
        "certificate has expired [1001]".to_string()
    );
    assert_eq!(Some(ValidationErrorKind::Expired), e.kind());

    let e = Error::validation(
        ValidationErrorKind::IssuerNotFound,
        ErrorContext::new()
            .with_issuer("CN=Missing CA")
            .with_subject("CN=Leaf")
            .with_serial_number("0A"),
    );
    assert_eq!(
        format!("{}", e),
        "issuer certificate not found [1004] (issuer: CN=Missing CA, subject: CN=Leaf, serial number: 0A)"
            .to_string()
    );
    assert_eq!(Some("0A"), e.context().and_then(|c| c.serial_number.as_deref()));
    assert!(Error::ParseError.kind().is_none());
}

#[test]
fn error_codes_are_distinct() {
    use alloc::collections::BTreeSet;

    let kinds = [
        ValidationErrorKind::Expired,
        ValidationErrorKind::NotYetValid,
        ValidationErrorKind::SignatureFailed,
        ValidationErrorKind::IssuerNotFound,
        ValidationErrorKind::IncompleteChain,
        ValidationErrorKind::InvalidKeyUsage,
        ValidationErrorKind::EmptyChain,
        ValidationErrorKind::RootNotSelfSigned,
        ValidationErrorKind::PublicKeyMismatch,
        ValidationErrorKind::SubjectMismatch,
        ValidationErrorKind::SameIssuer,
        ValidationErrorKind::IncompleteValidity,
    ];
    let codes: BTreeSet<u16> = kinds.iter().map(|k| k.code()).collect();
    assert_eq!(kinds.len(), codes.len());
}
