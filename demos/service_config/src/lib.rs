//! Service configuration demo.
//!
//! Shows a record resolved from defaults, `.env`, `SERVICE_*` variables, a
//! secret store and generated flags, then summarised without leaking the
//! secret.

use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;
#[cfg(not(feature = "gcp"))]
use tiered_config::StaticSecrets;
use tiered_config::{ResolveContext, Resolver, TieredConfig, TieredError};

/// Secret reference for the API token.
pub const API_TOKEN_SECRET: &str = "projects/demo/secrets/api-token/versions/latest";

/// Settings for the demo service.
#[derive(Debug, Default, TieredConfig)]
#[tiered_config(prefix = "SERVICE")]
pub struct ServiceConfig {
    /// Interface to bind.
    #[tiered_config(env, flag, default = "127.0.0.1")]
    pub bind_address: String,
    /// Listening port.
    #[tiered_config(env, flag, default = 8080, required)]
    pub port: u16,
    /// Upstream request timeout.
    #[tiered_config(env, flag, default = "30s")]
    pub request_timeout: Duration,
    /// Upstream retry budget.
    #[tiered_config(env, flag, default = 3)]
    pub max_retries: u8,
    /// Worker pool size; unset means one per CPU.
    #[tiered_config(env, flag)]
    pub workers: Option<u16>,
    /// Enables request tracing.
    #[tiered_config(env, flag)]
    pub debug: bool,
    /// Token for the upstream API.
    #[tiered_config(env, secret = "projects/demo/secrets/api-token/versions/latest", required)]
    pub api_token: String,
    /// Labels attached at runtime, never loaded.
    #[tiered_config(skip)]
    pub labels: Vec<String>,
}

/// Failures surfaced by the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Configuration could not be resolved.
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] TieredError),
    /// Writing the summary failed.
    #[error("failed to write summary: {0}")]
    Output(#[from] io::Error),
}

/// Chooses the secret store.
///
/// With the `gcp` feature the Secret Manager REST API is used; otherwise the
/// token is read from `SERVICE_DEMO_TOKEN` into an in-memory store.
#[must_use]
pub fn build_resolver() -> Resolver {
    let builder = Resolver::builder();
    #[cfg(feature = "gcp")]
    let builder = builder.secret_factory(tiered_config::GcpSecretManager::from_env);
    #[cfg(not(feature = "gcp"))]
    let builder = builder.secret_accessor(demo_secrets());
    builder.build()
}

#[cfg(not(feature = "gcp"))]
fn demo_secrets() -> StaticSecrets {
    std::env::var("SERVICE_DEMO_TOKEN").map_or_else(
        |_| StaticSecrets::new(),
        |token| StaticSecrets::new().with_secret(API_TOKEN_SECRET, token),
    )
}

/// Resolves the configuration with `resolver`.
///
/// # Errors
///
/// Returns [`DemoError::Configuration`] when resolution fails.
pub fn load(resolver: &mut Resolver, ctx: &ResolveContext) -> Result<ServiceConfig, DemoError> {
    Ok(ServiceConfig::load_with(resolver, ctx)?)
}

/// Writes a human-readable summary, masking the token.
///
/// # Errors
///
/// Returns [`DemoError::Output`] when `out` cannot be written.
pub fn write_summary(out: &mut impl Write, config: &ServiceConfig) -> Result<(), DemoError> {
    writeln!(out, "listening on {}:{}", config.bind_address, config.port)?;
    writeln!(
        out,
        "request timeout: {}",
        humantime::format_duration(config.request_timeout)
    )?;
    writeln!(out, "retries: {}", config.max_retries)?;
    match config.workers {
        Some(workers) => writeln!(out, "workers: {workers}")?,
        None => writeln!(out, "workers: auto")?,
    }
    writeln!(out, "debug: {}", config.debug)?;
    writeln!(out, "api token: {} characters", config.api_token.chars().count())?;
    Ok(())
}
