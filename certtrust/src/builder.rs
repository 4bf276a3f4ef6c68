//! Chain construction from unordered pools of certificates

pub mod certificate_chain;
pub mod path_builder;

pub use crate::{builder::certificate_chain::*, builder::path_builder::*};
