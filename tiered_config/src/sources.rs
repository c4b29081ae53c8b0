//! Individual configuration sources and their lookups.
//!
//! Each lookup answers "found or not" for one field. The merge engine in
//! [`crate::resolve`] consults them in precedence order.

use std::env;
use std::fmt;
use std::io;
use std::sync::{Mutex, PoisonError};

use camino::Utf8Path;
use tracing::debug;

/// Where a field's winning raw value came from, in ascending precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// The field's default annotation.
    Default,
    /// The process environment, including values loaded from dotenv.
    Environment,
    /// The secret collaborator.
    Secret,
    /// An explicitly supplied command-line flag.
    Flag,
}

impl Source {
    /// Lower-case label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Environment => "environment",
            Self::Secret => "secret",
            Self::Flag => "flag",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composes the environment variable consulted for `key` under `prefix`.
///
/// ```
/// assert_eq!(tiered_config::env_var_name("app_", "Port"), "APP_PORT");
/// ```
#[must_use]
pub fn env_var_name(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}").to_uppercase()
}

/// Outcome of reading one environment variable.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum EnvLookup {
    Missing,
    Found(String),
    NotUnicode,
}

/// Reads `name`, treating an empty value as missing.
pub(crate) fn lookup_env(name: &str) -> EnvLookup {
    match env::var_os(name) {
        None => EnvLookup::Missing,
        Some(value) if value.is_empty() => EnvLookup::Missing,
        Some(value) => value
            .into_string()
            .map_or(EnvLookup::NotUnicode, EnvLookup::Found),
    }
}

static DOTENV_LOCK: Mutex<()> = Mutex::new(());

/// Loads `path` into the process environment without overriding variables
/// that are already set.
///
/// Missing or malformed files are skipped. Loads are serialized across the
/// process.
pub(crate) fn load_dotenv(path: &Utf8Path) {
    let _guard = DOTENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    match dotenvy::from_path(path) {
        Ok(()) => debug!(path = %path, "loaded dotenv file"),
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path, "no dotenv file");
        }
        Err(err) => debug!(path = %path, error = %err, "skipping unreadable dotenv file"),
    }
}
