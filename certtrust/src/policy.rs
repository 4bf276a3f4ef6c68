//! Certificate policy matching and chain policy constraints

pub mod certificate_policy;
pub mod policy_validator;

pub use crate::{policy::certificate_policy::*, policy::policy_validator::*};
