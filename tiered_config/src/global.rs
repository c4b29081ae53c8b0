//! Process-wide resolver.
//!
//! Applications that want flags defined and parsed once per process, and a
//! single secret client shared by every load, resolve through this module.
//! The resolver is created with defaults on first use unless [`init`] ran
//! earlier. With the `gcp` feature that default reads secrets through
//! `GcpSecretManager::from_env`;
//! without it, records with secret fields need a resolver installed by
//! [`init`].

use std::sync::{Mutex, OnceLock};

use crate::context::ResolveContext;
use crate::error::{TieredError, TieredResult};
use crate::field::Specification;
use crate::resolve::{ResolutionReport, Resolver};

static GLOBAL: OnceLock<Mutex<Resolver>> = OnceLock::new();

/// Installs `resolver` as the process-wide resolver.
///
/// # Errors
///
/// Returns [`TieredError::GlobalAlreadyInitialised`] when a resolver is
/// already installed, including one created implicitly by an earlier
/// [`resolve`].
pub fn init(resolver: Resolver) -> TieredResult<()> {
    GLOBAL
        .set(Mutex::new(resolver))
        .map_err(|_| TieredError::GlobalAlreadyInitialised)
}

fn default_resolver() -> Resolver {
    let builder = Resolver::builder();
    #[cfg(feature = "gcp")]
    let builder = builder.secret_factory(crate::secret::GcpSecretManager::from_env);
    builder.build()
}

fn with_resolver<R>(f: impl FnOnce(&mut Resolver) -> TieredResult<R>) -> TieredResult<R> {
    let cell = GLOBAL.get_or_init(|| Mutex::new(default_resolver()));
    let mut guard = cell.lock().map_err(|_| TieredError::GlobalPoisoned)?;
    f(&mut guard)
}

/// Resolves `spec` with the process-wide resolver.
///
/// # Errors
///
/// As [`Resolver::resolve`], plus [`TieredError::GlobalPoisoned`] when a
/// previous caller panicked while holding the resolver.
pub fn resolve<S>(
    ctx: &ResolveContext,
    prefix: &str,
    spec: &mut S,
) -> TieredResult<ResolutionReport>
where
    S: Specification + ?Sized,
{
    with_resolver(|resolver| resolver.resolve(ctx, prefix, spec))
}

/// Closes the process-wide secret client, if one is open.
///
/// # Errors
///
/// As [`Resolver::close_secret_client`], plus
/// [`TieredError::GlobalPoisoned`].
pub fn close_secret_client() -> TieredResult<()> {
    match GLOBAL.get() {
        None => Ok(()),
        Some(cell) => cell
            .lock()
            .map_err(|_| TieredError::GlobalPoisoned)?
            .close_secret_client(),
    }
}
