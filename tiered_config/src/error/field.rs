//! Field-level failures collected during resolution.

use std::fmt;

use thiserror::Error;

use crate::coerce::CoercionError;
use crate::flags::FlagDefinitionError;
use crate::secret::SecretAccessError;
use crate::sources::Source;

/// Coarse classification of a [`FieldError`], for filtering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// A flag could not be defined for the field.
    FlagDefinition,
    /// The secret collaborator could not supply a value.
    SecretAccess,
    /// The winning raw value did not convert to the field's type.
    Coercion,
    /// A required field ended resolution absent or zero.
    Required,
    /// The environment held an unreadable value.
    Environment,
}

/// Details reported when a required field is missing or zero.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequiredDiagnostics {
    /// Source and raw value that produced the zero value, when one was found.
    pub found: Option<(Source, String)>,
    /// Fully prefixed environment variable consulted.
    pub env_var: Option<String>,
    /// Flag name consulted.
    pub flag: Option<String>,
    /// Secret reference consulted.
    pub secret: Option<String>,
}

impl fmt::Display for RequiredDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some((source, raw)) => write!(
                f,
                "is required but received zero value (source: {source}, raw value: '{raw}')"
            )?,
            None => f.write_str("is required but was not provided")?,
        }
        if let Some(env_var) = &self.env_var {
            write!(f, " (env: {env_var})")?;
        }
        if let Some(flag) = &self.flag {
            write!(f, " (flag: --{flag})")?;
        }
        if let Some(secret) = &self.secret {
            write!(f, " (secret: {secret})")?;
        }
        Ok(())
    }
}

/// What went wrong for one field.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FieldErrorKind {
    /// Flag definition failed; the flag is absent from the registry.
    #[error("{0}")]
    FlagDefinition(FlagDefinitionError),

    /// The secret collaborator failed or was unavailable.
    #[error("failed to access secret '{reference}': {error}")]
    SecretAccess {
        /// Secret reference from the field annotation.
        reference: String,
        /// Underlying failure.
        error: SecretAccessError,
    },

    /// The winning raw value could not be converted.
    #[error("(source: {origin}) error setting value '{raw}': {error}")]
    Coercion {
        /// Source whose value won.
        origin: Source,
        /// Raw value supplied by that source.
        raw: String,
        /// Conversion failure.
        error: CoercionError,
    },

    /// Required field absent or zero after merge.
    #[error("{0}")]
    Required(RequiredDiagnostics),

    /// An environment variable existed but was not valid UTF-8.
    #[error("environment variable {variable} is not valid UTF-8")]
    Environment {
        /// Fully prefixed variable name.
        variable: String,
    },
}

impl FieldErrorKind {
    /// Category of this failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::FlagDefinition(_) => ErrorCategory::FlagDefinition,
            Self::SecretAccess { .. } => ErrorCategory::SecretAccess,
            Self::Coercion { .. } => ErrorCategory::Coercion,
            Self::Required(_) => ErrorCategory::Required,
            Self::Environment { .. } => ErrorCategory::Environment,
        }
    }
}

/// A failure attributed to one field of the record.
#[derive(Debug, Error)]
#[error("field '{field}' {kind}")]
pub struct FieldError {
    field: String,
    kind: FieldErrorKind,
}

impl FieldError {
    /// Attributes `kind` to `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Name of the field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// What went wrong.
    #[must_use]
    pub const fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }

    /// Category of the failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}
