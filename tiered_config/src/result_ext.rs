//! Extensions for logging failures without handling them.

use std::fmt;

use tracing::warn;

/// Logs an error at `warn` level and passes the result through.
///
/// Meant for cleanup paths whose failure should be visible but not fatal,
/// such as closing the secret client on shutdown.
///
/// # Examples
///
/// ```
/// use tiered_config::TieredResultExt;
///
/// let result: Result<(), String> = Err("disk full".into());
/// assert!(result.warn_on_err("flushing cache").is_err());
/// ```
pub trait TieredResultExt {
    /// Emits a warning mentioning `context` when `self` is `Err`.
    #[must_use]
    fn warn_on_err(self, context: &str) -> Self;
}

impl<T, E> TieredResultExt for Result<T, E>
where
    E: fmt::Display,
{
    fn warn_on_err(self, context: &str) -> Self {
        if let Err(err) = &self {
            warn!(context, error = %err, "operation failed");
        }
        self
    }
}
