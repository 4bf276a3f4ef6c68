//! Accumulated outcome of a validation operation

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use serde::{Deserialize, Serialize};

use crate::{log_message, LogLevel};

/// Kind of a message recorded in a [`ValidationResult`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    /// A check passed in a way worth reporting to the caller
    Success,
    /// Informational detail about a check
    Info,
    /// A check was skipped or weakened
    Warning,
    /// A check failed
    Error,
}

/// `ValidationResult` collects success, info, warning and error messages produced by a validator
/// along with an aggregate valid flag. A result is valid only while the flag is set and no error has
/// been recorded.
///
/// Results are owned by the validator that produces them and returned by value. Results from
/// independent checks are combined with [`ValidationResult::merge`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    valid: bool,
    successes: Vec<String>,
    infos: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::with_valid(true)
    }
}

impl ValidationResult {
    /// Creates an empty, valid result
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty result with the given initial flag
    pub fn with_valid(valid: bool) -> Self {
        ValidationResult {
            valid,
            successes: Vec::new(),
            infos: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Returns true if the flag is set and no errors have been recorded
    pub fn is_valid(&self) -> bool {
        self.valid && self.errors.is_empty()
    }

    /// Sets the flag. Recorded errors still make the result invalid.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Records an error and clears the flag. Errors are also logged.
    pub fn add_error(&mut self, message: &str) -> &mut Self {
        log_message(LogLevel::Error, message);
        self.errors.push(message.to_string());
        self.valid = false;
        self
    }

    /// Records a warning
    pub fn add_warning(&mut self, message: &str) -> &mut Self {
        self.warnings.push(message.to_string());
        self
    }

    /// Records an informational message
    pub fn add_info(&mut self, message: &str) -> &mut Self {
        self.infos.push(message.to_string());
        self
    }

    /// Records a success message
    pub fn add_success(&mut self, message: &str) -> &mut Self {
        self.successes.push(message.to_string());
        self
    }

    /// Error messages in the order recorded
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warning messages in the order recorded
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Informational messages in the order recorded
    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    /// Success messages in the order recorded
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// `all_messages` returns every message tagged with its kind, grouped as successes, infos,
    /// warnings then errors.
    pub fn all_messages(&self) -> Vec<(MessageKind, &str)> {
        let groups = [
            (MessageKind::Success, &self.successes),
            (MessageKind::Info, &self.infos),
            (MessageKind::Warning, &self.warnings),
            (MessageKind::Error, &self.errors),
        ];
        groups
            .into_iter()
            .flat_map(|(kind, msgs)| msgs.iter().map(move |m| (kind, m.as_str())))
            .collect()
    }

    /// Returns true if any message of any kind contains `needle`
    pub fn contains_message(&self, needle: &str) -> bool {
        self.all_messages().iter().any(|(_, m)| m.contains(needle))
    }

    /// Removes all messages and sets the flag
    pub fn clear(&mut self) -> &mut Self {
        self.valid = true;
        self.successes.clear();
        self.infos.clear();
        self.warnings.clear();
        self.errors.clear();
        self
    }

    /// `merge` appends each message list of `other` to the corresponding list of this result. The
    /// flag becomes the conjunction of this flag and the validity of `other`.
    pub fn merge(&mut self, other: &ValidationResult) -> &mut Self {
        self.valid = self.valid && other.is_valid();
        self.successes.extend_from_slice(&other.successes);
        self.infos.extend_from_slice(&other.infos);
        self.warnings.extend_from_slice(&other.warnings);
        self.errors.extend_from_slice(&other.errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn flag_and_errors() {
        let mut r = ValidationResult::new();
        assert!(r.is_valid());
        r.add_info("checked").add_warning("skipped").add_success("done");
        assert!(r.is_valid());

        r.add_error("failed");
        assert!(!r.is_valid());

        // setting the flag does not hide recorded errors
        r.set_valid(true);
        assert!(!r.is_valid());

        r.clear();
        assert!(r.is_valid());
        assert!(r.all_messages().is_empty());

        let r = ValidationResult::with_valid(false);
        assert!(!r.is_valid());
        assert!(r.errors().is_empty());
    }

    #[test]
    fn all_messages_grouped() {
        let mut r = ValidationResult::new();
        r.add_error("e1");
        r.add_info("i1");
        r.add_success("s1");
        r.add_warning("w1");
        r.add_info("i2");
        assert_eq!(
            vec![
                (MessageKind::Success, "s1"),
                (MessageKind::Info, "i1"),
                (MessageKind::Info, "i2"),
                (MessageKind::Warning, "w1"),
                (MessageKind::Error, "e1"),
            ],
            r.all_messages()
        );
        assert!(r.contains_message("w1"));
        assert!(!r.contains_message("x1"));
    }

    #[test]
    fn merge_is_associative() {
        let mut a = ValidationResult::new();
        a.add_info("a");
        let mut b = ValidationResult::new();
        b.add_error("b");
        let mut c = ValidationResult::with_valid(true);
        c.add_success("c");

        let mut left = a.clone();
        left.merge(&b).merge(&c);

        let mut bc = b.clone();
        bc.merge(&c);
        let mut right = a.clone();
        right.merge(&bc);

        assert_eq!(left, right);
        assert!(!left.is_valid());
        assert_eq!(vec!["a".to_string()], left.infos());
        assert_eq!(vec!["b".to_string()], left.errors());
        assert_eq!(vec!["c".to_string()], left.successes());

        let mut valid = ValidationResult::new();
        valid.merge(&ValidationResult::new());
        assert!(valid.is_valid());
        valid.merge(&ValidationResult::with_valid(false));
        assert!(!valid.is_valid());
    }
}
