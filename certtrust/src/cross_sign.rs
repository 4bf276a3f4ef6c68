//! Detection and validation of cross-signed certificates

pub mod cross_sign_validator;
pub mod cross_signed_certificate;

pub use crate::{
    cross_sign::cross_sign_validator::*, cross_sign::cross_signed_certificate::*,
};
