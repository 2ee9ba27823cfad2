//! Campaign parameter validation.
//!
//! Turns a loosely-typed experiment descriptor into [`ValidatedParameters`].
//! Invalid or missing values are replaced by [`Defaults`] and reported as
//! [`Diagnostic`]s instead of aborting.

pub mod defaults;
pub mod descriptor;
pub mod diagnostics;
pub mod pipeline;
pub mod validator;

pub use defaults::Defaults;
pub use descriptor::{Descriptor, Section};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use pipeline::{validate_all, MaliciousRole, Param, Rule, Step, ValidatedParameters, Validation, ValidationError, STEPS};
pub use validator::{get_list_parameter, get_parameter, Resolution};
