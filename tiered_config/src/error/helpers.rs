//! Helpers for classifying and routing external errors.

use clap::{Error as ClapError, error::ErrorKind};

use super::TieredError;

/// Returns `true` when a [`clap::Error`] corresponds to `--help` or
/// `--version`.
///
/// Flag parsing surfaces these requests as [`TieredError::CliParsing`]; entry
/// points can delegate to [`clap::Error::exit`] to print the generated help
/// and keep the zero exit status.
#[must_use]
pub fn is_display_request(err: &ClapError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

impl TieredError {
    /// The clap error behind a [`TieredError::CliParsing`], if any.
    #[must_use]
    pub fn as_clap(&self) -> Option<&ClapError> {
        match self {
            Self::CliParsing(err) => Some(err),
            _ => None,
        }
    }
}
