//! Transaction-time enforcement
//!
//! [`ValidationHook`] vetoes commits that leave a node violating a stored
//! constraint; [`ConstraintExtension`] attaches it to a host.

pub mod extension;
pub mod report;
pub mod validation;

pub use extension::ConstraintExtension;
pub use report::ViolationReport;
pub use validation::{candidates, Decision, ValidationError, ValidationHook, ValidationResult};
