//! Error types produced by the configuration resolver.

mod aggregate;
mod constructors;
mod field;
mod helpers;
mod types;

pub use aggregate::ResolutionErrors;
pub use field::{ErrorCategory, FieldError, FieldErrorKind, RequiredDiagnostics};
pub use helpers::is_display_request;
pub use types::TieredError;

/// Result alias used throughout the crate.
pub type TieredResult<T> = Result<T, TieredError>;
