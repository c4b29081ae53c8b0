//! Demo entry point: resolve the service configuration and print a summary.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Report;
use service_config::{DemoError, build_resolver, load, write_summary};
use tiered_config::{ResolveContext, TieredError, TieredResultExt, is_display_request};
use tracing_subscriber::EnvFilter;

const SECRET_BUDGET: Duration = Duration::from_secs(10);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    run().map_err(Report::from)
}

fn run() -> Result<(), DemoError> {
    let mut resolver = build_resolver();
    let ctx = ResolveContext::new().with_timeout(SECRET_BUDGET);
    let config = match load(&mut resolver, &ctx) {
        Ok(config) => config,
        Err(DemoError::Configuration(TieredError::CliParsing(err))) if is_display_request(&err) => {
            err.exit();
        }
        Err(err) => return Err(err),
    };
    let _closed = resolver
        .close_secret_client()
        .warn_on_err("closing secret client");
    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &config)
}
