//! Aggregation container for the field failures of one resolution call.

use std::{error::Error, fmt};

use super::{ErrorCategory, FieldError};

/// Every [`FieldError`] produced by a single resolution call, in the order
/// they were detected.
///
/// # Examples
///
/// ```
/// use tiered_config::{
///     ErrorCategory, FieldError, FieldErrorKind, RequiredDiagnostics, TieredError,
/// };
///
/// let missing = FieldError::new(
///     "port",
///     FieldErrorKind::Required(RequiredDiagnostics::default()),
/// );
/// let err = TieredError::try_resolution([missing]).unwrap();
/// let errors = err.resolution_errors().unwrap();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.in_category(ErrorCategory::Required).count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ResolutionErrors(Vec<FieldError>);

impl ResolutionErrors {
    /// Create a new aggregation from a vector of errors.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    /// Iterate over the contained errors.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Number of errors in the aggregation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the aggregation is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors of one category.
    pub fn in_category(&self, category: ErrorCategory) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |err| err.category() == category)
    }

    /// Errors attributed to the field `name`.
    pub fn for_field<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.0.iter().filter(move |err| err.field() == name)
    }
}

impl fmt::Display for ResolutionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}

impl Error for ResolutionErrors {}

impl<'a> IntoIterator for &'a ResolutionErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ResolutionErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<FieldError> for ResolutionErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
