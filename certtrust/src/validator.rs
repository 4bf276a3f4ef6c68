//! Certificate validation pipeline, its options and its results

pub mod certificate_validator;
pub mod validation_options;
pub mod validation_result;

pub use crate::{
    validator::certificate_validator::*, validator::validation_options::*,
    validator::validation_result::*,
};
