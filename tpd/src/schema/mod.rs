//! Requirement schemas and partial validation
//!
//! A [`RequirementSchema`] declares the typed fields one workflow needs from
//! the user. [`partial_validate`] checks an extracted mapping field by field
//! so a single bad value never throws away the rest, and the surviving
//! values accumulate in a [`RequirementState`] across turns.

pub mod catalog;
mod field;
mod state;
mod validate;

pub use field::{CrossRule, FieldKind, FieldSpec, RequirementSchema};
pub use state::RequirementState;
pub use validate::{partial_validate, FieldError, FieldErrorKind, ValidationOutcome};
