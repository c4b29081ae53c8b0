//! Secret store collaborator.
//!
//! Fields annotated with a secret reference are read through a
//! [`SecretAccessor`]. The resolver builds the accessor lazily from a
//! caller-supplied [`SecretFactory`] the first time a resolution needs one,
//! keeps it across calls, and drops it on
//! [`crate::Resolver::close_secret_client`].

mod memory;

#[cfg(feature = "gcp")]
mod gcp;

#[cfg(feature = "gcp")]
pub use gcp::GcpSecretManager;

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::context::ResolveContext;

pub use memory::StaticSecrets;

/// Failures reported by the secret collaborator.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum SecretAccessError {
    /// A secret was requested but no factory or accessor was configured.
    #[error("no secret accessor is configured")]
    NotConfigured,
    /// The factory failed to build an accessor.
    #[error("failed to create secret client: {message}")]
    Initialization {
        /// Description of the failure.
        message: String,
    },
    /// The reference is empty, contains whitespace or control characters, or
    /// has an empty path segment.
    #[error("malformed secret reference '{reference}'")]
    MalformedReference {
        /// The offending reference.
        reference: String,
    },
    /// The store holds no secret under the reference.
    #[error("secret '{reference}' was not found")]
    NotFound {
        /// The missing reference.
        reference: String,
    },
    /// The caller cancelled the resolution.
    #[error("secret access cancelled")]
    Cancelled,
    /// The resolution deadline passed.
    #[error("secret access deadline exceeded")]
    DeadlineExceeded,
    /// The backend failed the request.
    #[error("secret backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
    /// Closing the accessor failed.
    #[error("failed to close secret client: {message}")]
    Close {
        /// Description of the failure.
        message: String,
    },
}

impl SecretAccessError {
    /// Construct an [`SecretAccessError::Initialization`] error.
    #[must_use]
    pub fn initialization(message: impl fmt::Display) -> Self {
        Self::Initialization {
            message: message.to_string(),
        }
    }

    /// Construct a [`SecretAccessError::Backend`] error.
    #[must_use]
    pub fn backend(message: impl fmt::Display) -> Self {
        Self::Backend {
            message: message.to_string(),
        }
    }
}

/// Read access to a secret store.
pub trait SecretAccessor: Send {
    /// Returns the payload stored under `reference`.
    ///
    /// Implementations should honour the cancellation flag and deadline of
    /// `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`SecretAccessError`] when the secret cannot be read.
    fn access(&self, ctx: &ResolveContext, reference: &str) -> Result<String, SecretAccessError>;

    /// Releases resources held by the accessor.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAccessError::Close`] when release fails.
    fn close(&mut self) -> Result<(), SecretAccessError> {
        Ok(())
    }
}

/// Builds a [`SecretAccessor`] on first need.
pub type SecretFactory =
    Box<dyn FnMut() -> Result<Box<dyn SecretAccessor>, SecretAccessError> + Send>;

/// Checks that `reference` is non-empty, free of whitespace and control
/// characters, and has no empty `/`-separated segment.
///
/// # Errors
///
/// Returns [`SecretAccessError::MalformedReference`] otherwise.
///
/// ```
/// use tiered_config::validate_reference;
///
/// assert!(validate_reference("projects/p/secrets/s/versions/1").is_ok());
/// assert!(validate_reference("projects//secrets").is_err());
/// ```
pub fn validate_reference(reference: &str) -> Result<(), SecretAccessError> {
    let malformed = reference.is_empty()
        || reference
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        || reference.split('/').any(str::is_empty);
    if malformed {
        return Err(SecretAccessError::MalformedReference {
            reference: reference.to_owned(),
        });
    }
    Ok(())
}

enum ClientState {
    Absent,
    Initialized(Box<dyn SecretAccessor>),
}

/// Lazily initialized handle to the secret collaborator.
pub(crate) struct SecretClient {
    factory: Option<SecretFactory>,
    state: ClientState,
}

impl SecretClient {
    pub(crate) fn new(factory: Option<SecretFactory>) -> Self {
        Self {
            factory,
            state: ClientState::Absent,
        }
    }

    pub(crate) const fn is_initialized(&self) -> bool {
        matches!(self.state, ClientState::Initialized(_))
    }

    /// Starts a per-call session; the factory runs at most once per session.
    pub(crate) const fn session(&mut self) -> SecretSession<'_> {
        SecretSession {
            client: self,
            failure: None,
        }
    }

    /// Closes and drops the accessor. A no-op when none is held.
    pub(crate) fn close(&mut self) -> Result<(), SecretAccessError> {
        match std::mem::replace(&mut self.state, ClientState::Absent) {
            ClientState::Absent => Ok(()),
            ClientState::Initialized(mut accessor) => {
                debug!("closing secret client");
                accessor.close()
            }
        }
    }
}

impl fmt::Debug for SecretClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretClient")
            .field("has_factory", &self.factory.is_some())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Secret access for the duration of one resolution call.
pub(crate) struct SecretSession<'a> {
    client: &'a mut SecretClient,
    failure: Option<SecretAccessError>,
}

impl SecretSession<'_> {
    fn accessor(&mut self) -> Result<&dyn SecretAccessor, SecretAccessError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if matches!(self.client.state, ClientState::Absent) {
            let built = match self.client.factory.as_mut() {
                Some(factory) => factory(),
                None => Err(SecretAccessError::NotConfigured),
            };
            match built {
                Ok(accessor) => {
                    debug!("secret client initialized");
                    self.client.state = ClientState::Initialized(accessor);
                }
                Err(err) => {
                    self.failure = Some(err.clone());
                    return Err(err);
                }
            }
        }
        match &self.client.state {
            ClientState::Initialized(accessor) => Ok(accessor.as_ref()),
            ClientState::Absent => Err(SecretAccessError::NotConfigured),
        }
    }

    /// Fetches the payload for `reference`.
    pub(crate) fn fetch(
        &mut self,
        ctx: &ResolveContext,
        reference: &str,
    ) -> Result<String, SecretAccessError> {
        validate_reference(reference)?;
        ctx.check()?;
        let accessor = self.accessor()?;
        accessor.access(ctx, reference)
    }
}
