//! Logging support

use log::{debug, error, info, warn};

use crate::util::error::Error;

/// Enum that describes level associated with a log message
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    /// Common error logging level
    Error,
    /// Common info logging level
    Info,
    /// Common warn logging level
    Warn,
    /// Common debug logging level
    Debug,
}

/// `log_message` forwards a message to the `log` facade at the given level. No logger is installed
/// by this crate; applications choose an implementation.
pub fn log_message(level: LogLevel, message: &str) {
    match level {
        LogLevel::Error => error!("{}", message),
        LogLevel::Warn => warn!("{}", message),
        LogLevel::Info => info!("{}", message),
        LogLevel::Debug => debug!("{}", message),
    }
}

/// `log_error_for_subject` logs an error message prefixed with the subject name of the certificate
/// being processed.
pub fn log_error_for_subject(subject: &str, msg: &str) {
    error!("{} for certificate issued to {}", msg, subject);
}

/// `log_error` logs the display form of an [`Error`] alongside the operation that produced it.
pub(crate) fn log_error(operation: &str, err: &Error) {
    error!("{} failed: {}", operation, err);
}
