//! Per-call cancellation and deadline for resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::secret::SecretAccessError;

/// Cancellation signal and deadline observed by the secret source.
///
/// The default context never expires and cannot be cancelled.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
/// use tiered_config::ResolveContext;
///
/// let cancel = Arc::new(AtomicBool::new(false));
/// let ctx = ResolveContext::new()
///     .with_timeout(Duration::from_secs(30))
///     .with_cancel_flag(Arc::clone(&cancel));
/// assert!(!ctx.is_cancelled());
/// cancel.store(true, Ordering::SeqCst);
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResolveContext {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl ResolveContext {
    /// A context with no deadline and no cancellation flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Observes `flag`; storing `true` cancels outstanding secret access.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The deadline, if one was set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when no deadline is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the cancellation flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Fails when the context is cancelled or past its deadline.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAccessError::Cancelled`] or
    /// [`SecretAccessError::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), SecretAccessError> {
        if self.is_cancelled() {
            return Err(SecretAccessError::Cancelled);
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(SecretAccessError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_never_fails() {
        let ctx = ResolveContext::new();
        assert!(ctx.check().is_ok());
        assert_eq!(ctx.remaining(), None);
    }

    #[test]
    fn elapsed_deadline_is_reported() {
        let ctx = ResolveContext::new().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(SecretAccessError::DeadlineExceeded)));
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let ctx = ResolveContext::new()
            .with_deadline(Instant::now())
            .with_cancel_flag(Arc::new(AtomicBool::new(true)));
        assert!(matches!(ctx.check(), Err(SecretAccessError::Cancelled)));
    }
}
