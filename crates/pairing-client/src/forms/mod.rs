//! Form validation and layouts

mod field_errors;
mod layout;
mod schemas;

pub use field_errors::{check, FieldErrors, FORM_LEVEL};
pub use layout::{FieldKind, FieldSpec, FormLayout};
pub use schemas::*;
