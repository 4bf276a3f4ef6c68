//! Capability traits injected into the validators

pub mod validation_traits;

pub use crate::environment::validation_traits::*;
