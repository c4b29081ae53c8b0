//! Constructors and accessors for `TieredError`.

use super::{FieldError, ResolutionErrors, TieredError};

impl TieredError {
    /// Construct an [`TieredError::InvalidSpecification`] error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiered_config::TieredError;
    /// let e = TieredError::invalid_specification("duplicate field 'port'");
    /// assert_eq!(e.to_string(), "invalid specification: duplicate field 'port'");
    /// ```
    #[must_use]
    pub fn invalid_specification(reason: impl Into<String>) -> Self {
        Self::InvalidSpecification {
            reason: reason.into(),
        }
    }

    /// Tries to build a [`TieredError::Resolution`] from field failures.
    ///
    /// The iterator is consumed eagerly. Returns `None` when it yields
    /// nothing, so a clean resolution produces no error at all.
    #[must_use]
    pub fn try_resolution<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = FieldError>,
    {
        let collected: ResolutionErrors = errors.into_iter().collect();
        (!collected.is_empty()).then(|| Self::Resolution(Box::new(collected)))
    }

    /// The field failures behind a [`TieredError::Resolution`], if any.
    #[must_use]
    pub fn resolution_errors(&self) -> Option<&ResolutionErrors> {
        match self {
            Self::Resolution(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<clap::Error> for TieredError {
    fn from(e: clap::Error) -> Self {
        Self::CliParsing(Box::new(e))
    }
}
