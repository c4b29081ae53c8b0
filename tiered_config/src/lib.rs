//! Hierarchical configuration resolution.
//!
//! A configuration record is populated from five ranked sources, lowest
//! precedence first: compiled-in defaults, a dotenv file, the process
//! environment, a secret store, and explicitly supplied command-line flags.
//! Flags are generated from the record's own field annotations, raw strings
//! are coerced into typed fields, and required fields are checked after the
//! merge. Every field-level failure is reported together.
//!
//! ```no_run
//! use std::time::Duration;
//! use tiered_config::{TieredConfig, TieredResult};
//!
//! #[derive(Debug, Default, TieredConfig)]
//! #[tiered_config(prefix = "APP_")]
//! struct AppConfig {
//!     #[tiered_config(env, flag, default = "localhost")]
//!     host: String,
//!     #[tiered_config(env, flag, default = 8080, required)]
//!     port: u16,
//!     #[tiered_config(env, default = "5s")]
//!     timeout: Duration,
//! }
//!
//! fn main() -> TieredResult<()> {
//!     let config = AppConfig::load()?;
//!     println!("listening on {}:{}", config.host, config.port);
//!     Ok(())
//! }
//! ```
//!
//! The derive macro lives in the companion `tiered_config_macros` crate.

pub use tiered_config_macros::TieredConfig;

mod coerce;
mod context;
mod error;
mod field;
mod flags;
pub mod global;
mod resolve;
mod result_ext;
mod secret;
mod sources;
mod value;

use std::ffi::OsString;

pub use coerce::{CoercionError, CoercionFailure, coerce};
pub use context::ResolveContext;
pub use error::{
    ErrorCategory, FieldError, FieldErrorKind, RequiredDiagnostics, ResolutionErrors,
    TieredError, TieredResult, is_display_request,
};
pub use field::{FieldAnnotations, FieldDescriptor, FieldEntry, Specification, describe};
pub use flags::{FlagDefinitionError, FlagKind, FlagOwner};
pub use resolve::{FieldOutcome, ResolutionReport, Resolver, ResolverBuilder};
pub use result_ext::TieredResultExt;
#[cfg(feature = "gcp")]
pub use secret::GcpSecretManager;
pub use secret::{
    SecretAccessError, SecretAccessor, SecretFactory, StaticSecrets, validate_reference,
};
pub use sources::{Source, env_var_name};
pub use value::{ConfigValue, FieldType, ScalarKind, ScalarValue, Value};

/// A configuration record with a default environment prefix.
///
/// Usually derived with `#[derive(TieredConfig)]`, which also implements
/// [`Specification`].
pub trait TieredConfig: Specification + Sized {
    /// Prefix prepended to every environment key of the record.
    #[must_use]
    fn prefix() -> &'static str {
        ""
    }

    /// Resolves a default record with the process-wide resolver.
    ///
    /// Records with secret fields need the `gcp` feature or a resolver
    /// installed through [`global::init`]; otherwise their secrets report
    /// that no accessor is configured.
    ///
    /// # Errors
    ///
    /// Returns a [`TieredError`] when resolution fails; see
    /// [`Resolver::resolve`].
    fn load() -> TieredResult<Self>
    where
        Self: Default,
    {
        let mut config = Self::default();
        global::resolve(&ResolveContext::new(), Self::prefix(), &mut config)?;
        Ok(config)
    }

    /// Resolves a default record with `resolver`.
    ///
    /// # Errors
    ///
    /// Returns a [`TieredError`] when resolution fails.
    fn load_with(resolver: &mut Resolver, ctx: &ResolveContext) -> TieredResult<Self>
    where
        Self: Default,
    {
        let mut config = Self::default();
        resolver.resolve(ctx, Self::prefix(), &mut config)?;
        Ok(config)
    }

    /// Resolves a default record from `args` with a fresh resolver.
    ///
    /// The resolver loads `.env` from the working directory and has no secret
    /// store; records with secret fields should use [`TieredConfig::load_with`].
    ///
    /// # Errors
    ///
    /// Returns a [`TieredError`] when resolution fails.
    fn load_from_iter<I, T>(args: I) -> TieredResult<Self>
    where
        Self: Default,
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut resolver = Resolver::builder().args(args).build();
        Self::load_with(&mut resolver, &ResolveContext::new())
    }
}
