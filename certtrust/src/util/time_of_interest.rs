//! Utils to define the time of interest when validating certificate

use core::{cmp::Ordering, fmt, time::Duration};

use der::DateTime;

/// Time of interest for the validation of a certificate, i.e., the moment at which validity periods
/// are evaluated. Outside of tests this is usually the current time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeOfInterest {
    /// Make [`TimeOfInterest`] where checks are disabled
    pub fn disabled() -> Self {
        TimeOfInterest(
            DateTime::from_unix_duration(Duration::ZERO)
                // NOTE(safety): only values before 1970 or values after 9999 would be throwing errors
                .expect("Could not create a DateTime from Unix Epoch"),
        )
    }

    /// Should time checks be disabled?
    pub fn is_disabled(&self) -> bool {
        self.0.unix_duration() == Duration::ZERO
    }

    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(DateTime::from_unix_duration(Duration::from_secs(v))?))
    }

    /// Return Unix epoch (in seconds) for this value
    pub fn as_unix_secs(&self) -> u64 {
        self.0.unix_duration().as_secs()
    }
}

/// Without `std` there is no clock to read, so the default disables time checks
#[cfg(not(feature = "std"))]
impl Default for TimeOfInterest {
    fn default() -> Self {
        Self::disabled()
    }
}

impl From<DateTime> for TimeOfInterest {
    fn from(dt: DateTime) -> Self {
        TimeOfInterest(dt)
    }
}

impl PartialEq<DateTime> for TimeOfInterest {
    fn eq(&self, other: &DateTime) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<DateTime> for TimeOfInterest {
    fn partial_cmp(&self, other: &DateTime) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialEq<x509_cert::time::Time> for TimeOfInterest {
    fn eq(&self, other: &x509_cert::time::Time) -> bool {
        self.0.eq(&other.to_date_time())
    }
}

impl PartialOrd<x509_cert::time::Time> for TimeOfInterest {
    fn partial_cmp(&self, other: &x509_cert::time::Time) -> Option<Ordering> {
        self.0.partial_cmp(&other.to_date_time())
    }
}

#[cfg(feature = "std")]
mod std {
    use super::*;

    impl TimeOfInterest {
        /// Creates a [`TimeOfInterest`] for the current time, falling back to a disabled value if
        /// the system clock is outside the range representable by [`DateTime`].
        pub fn now() -> Self {
            match DateTime::from_system_time(::std::time::SystemTime::now()) {
                Ok(dt) => Self(dt),
                Err(e) => {
                    log::error!("Unable to represent current time, disabling time checks: {}", e);
                    Self::disabled()
                }
            }
        }
    }

    impl Default for TimeOfInterest {
        fn default() -> Self {
            Self::now()
        }
    }
}

#[test]
fn time_of_interest_ordering() {
    let early = TimeOfInterest::from_unix_secs(1_000_000).unwrap();
    let late = TimeOfInterest::from_unix_secs(2_000_000).unwrap();
    assert!(early < late);
    assert!(early < late.0);
    assert_eq!(1_000_000, early.as_unix_secs());
    assert!(!early.is_disabled());
    assert!(TimeOfInterest::disabled().is_disabled());
}
