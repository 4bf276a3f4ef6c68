//! Read-only view of certificates as consumed by the chain builders and validators

pub mod certificate_data;
pub mod certificate_record;
pub mod extension_value;
pub mod pdv_certificate;

pub use crate::{
    certificate::certificate_data::*, certificate::certificate_record::*,
    certificate::extension_value::*, certificate::pdv_certificate::*,
};
