//! In-memory secret store.

use std::collections::HashMap;
use std::sync::Arc;

use super::{SecretAccessError, SecretAccessor};
use crate::context::ResolveContext;

/// A fixed map of secret references to payloads.
///
/// Useful for tests and for deployments that inject secrets some other way.
/// Clones share the same map.
///
/// # Examples
///
/// ```
/// use tiered_config::{ResolveContext, SecretAccessor, StaticSecrets};
///
/// let secrets = StaticSecrets::new().with_secret("projects/p/secrets/api/versions/1", "s3cr3t");
/// let value = secrets.access(&ResolveContext::new(), "projects/p/secrets/api/versions/1");
/// assert_eq!(value.as_deref(), Ok("s3cr3t"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticSecrets {
    values: Arc<HashMap<String, String>>,
}

impl StaticSecrets {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `payload` under `reference`.
    #[must_use]
    pub fn with_secret(mut self, reference: impl Into<String>, payload: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.values).insert(reference.into(), payload.into());
        self
    }

    /// Number of stored secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticSecrets
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(values),
        }
    }
}

impl SecretAccessor for StaticSecrets {
    fn access(&self, ctx: &ResolveContext, reference: &str) -> Result<String, SecretAccessError> {
        ctx.check()?;
        self.values
            .get(reference)
            .cloned()
            .ok_or_else(|| SecretAccessError::NotFound {
                reference: reference.to_owned(),
            })
    }
}
