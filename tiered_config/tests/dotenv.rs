//! Dotenv loading as the lowest-ranked external source.

use anyhow::{Result, ensure};
use serial_test::serial;
use test_helpers::{cwd, dotenv::DotenvFile, env as test_env};
use tiered_config::{ResolveContext, Resolver, Source, TieredConfig};

#[derive(Debug, Default, TieredConfig)]
#[tiered_config(prefix = "DOTENV_IT_")]
struct DotenvConfig {
    #[tiered_config(env, default = "default-host")]
    host: String,
    #[tiered_config(env, default = 1)]
    workers: u8,
    #[tiered_config(env, flag)]
    region: Option<String>,
}

#[test]
#[serial]
fn dotenv_values_fill_unset_variables() -> Result<()> {
    let file = DotenvFile::with_entries([
        ("DOTENV_IT_HOST", "dotenv-host"),
        ("DOTENV_IT_WORKERS", "4"),
    ])?;
    let mut scope = test_env::clear_prefixed("DOTENV_IT_");
    scope.push(test_env::remove_var("DOTENV_IT_HOST"));
    scope.push(test_env::remove_var("DOTENV_IT_WORKERS"));

    let mut resolver = Resolver::builder()
        .args(["dotenv"])
        .dotenv_path(file.path())
        .build();
    let mut config = DotenvConfig::default();
    let report = resolver.resolve(&ResolveContext::new(), DotenvConfig::prefix(), &mut config)?;

    ensure!(config.host == "dotenv-host");
    ensure!(config.workers == 4);
    ensure!(config.region.is_none());
    // Dotenv entries land in the process environment.
    ensure!(report.source_of("host") == Some(Source::Environment));
    drop(scope);
    Ok(())
}

#[test]
#[serial]
fn process_environment_wins_over_dotenv() -> Result<()> {
    let file = DotenvFile::with_entries([("DOTENV_IT_HOST", "dotenv-host")])?;
    let mut scope = test_env::clear_prefixed("DOTENV_IT_");
    scope.push(test_env::set_var("DOTENV_IT_HOST", "process-host"));

    let mut resolver = Resolver::builder()
        .args(["dotenv"])
        .dotenv_path(file.path())
        .build();
    let config = DotenvConfig::load_with(&mut resolver, &ResolveContext::new())?;
    ensure!(config.host == "process-host");
    drop(scope);
    Ok(())
}

#[test]
#[serial]
fn default_dotenv_is_read_from_working_directory() -> Result<()> {
    let file = DotenvFile::with_entries([("DOTENV_IT_REGION", "eu-west")])?;
    let mut scope = test_env::clear_prefixed("DOTENV_IT_");
    scope.push(test_env::remove_var("DOTENV_IT_REGION"));
    let guard = cwd::set_dir(file.dir())?;

    let config = DotenvConfig::load_from_iter(["dotenv"])?;
    guard.restore()?;
    ensure!(config.region.as_deref() == Some("eu-west"));
    drop(scope);
    Ok(())
}

#[test]
#[serial]
fn malformed_dotenv_is_skipped() -> Result<()> {
    let file = DotenvFile::with_contents("this is = not ' valid\n")?;
    let _scope = test_env::clear_prefixed("DOTENV_IT_");
    let mut resolver = Resolver::builder()
        .args(["dotenv"])
        .dotenv_path(file.path())
        .build();
    let config = DotenvConfig::load_with(&mut resolver, &ResolveContext::new())?;
    ensure!(config.host == "default-host");
    ensure!(config.workers == 1);
    Ok(())
}
