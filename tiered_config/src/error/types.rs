//! Primary error enum for configuration resolution.

use thiserror::Error;

use super::ResolutionErrors;
use crate::secret::SecretAccessError;

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TieredError {
    /// The record's field table is not a settable record.
    #[error("invalid specification: {reason}")]
    InvalidSpecification {
        /// What is wrong with the table.
        reason: String,
    },

    /// Error parsing command-line arguments.
    #[error("Failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// Field-level failures collected during one resolution call.
    #[error("config loading errors:\n{0}")]
    Resolution(Box<ResolutionErrors>),

    /// Failure creating or closing the secret client outside resolution.
    #[error("secret client error: {0}")]
    SecretClient(#[from] SecretAccessError),

    /// The process-wide resolver lock was poisoned by a panicking caller.
    #[error("the global resolver is unavailable after a panic")]
    GlobalPoisoned,

    /// The process-wide resolver was already configured.
    #[error("the global resolver is already initialised")]
    GlobalAlreadyInitialised,
}
