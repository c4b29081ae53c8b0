//! End-to-end resolution of derived configuration records.

use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serial_test::serial;
use test_helpers::env as test_env;
use tiered_config::{
    ErrorCategory, ResolveContext, Resolver, Source, StaticSecrets, TieredConfig, TieredError,
};

#[derive(Debug, Default, TieredConfig)]
#[tiered_config(prefix = "DERIVE")]
struct ServiceConfig {
    #[tiered_config(env, flag, default = "localhost")]
    host: String,
    #[tiered_config(env, flag, default = 8080, required)]
    port: u16,
    #[tiered_config(env, flag, default = "5s")]
    timeout: Duration,
    #[tiered_config(env, flag)]
    verbose: bool,
    #[tiered_config(env = "RATIO", default = 0.5)]
    sample_ratio: f64,
    #[tiered_config(env, flag)]
    max_connections: Option<u32>,
    #[tiered_config(env, secret = "projects/demo/secrets/api-key/versions/1")]
    api_key: String,
    #[tiered_config(skip)]
    notes: Vec<String>,
}

#[fixture]
fn clean_env() -> test_env::EnvScope {
    test_env::clear_prefixed("DERIVE_")
}

fn resolver(args: &[&str], secrets: StaticSecrets) -> Resolver {
    Resolver::builder()
        .args(args.iter().copied())
        .without_dotenv()
        .secret_accessor(secrets)
        .build()
}

fn api_secret() -> StaticSecrets {
    StaticSecrets::new().with_secret("projects/demo/secrets/api-key/versions/1", "from-secret")
}

#[rstest]
#[serial]
fn defaults_apply_without_other_sources(_clean_env: test_env::EnvScope) -> Result<()> {
    let mut resolver = resolver(&["svc"], api_secret());
    let config = ServiceConfig::load_with(&mut resolver, &ResolveContext::new())?;
    ensure!(config.host == "localhost");
    ensure!(config.port == 8080);
    ensure!(config.timeout == Duration::from_secs(5));
    ensure!(!config.verbose);
    ensure!((config.sample_ratio - 0.5).abs() < f64::EPSILON);
    ensure!(config.max_connections.is_none());
    ensure!(config.api_key == "from-secret");
    ensure!(config.notes.is_empty());
    Ok(())
}

#[rstest]
#[serial]
fn flags_beat_environment_beats_defaults(_clean_env: test_env::EnvScope) -> Result<()> {
    let _host = test_env::set_var("DERIVE_HOST", "env-host");
    let _port = test_env::set_var("DERIVE_PORT", "7000");
    let _timeout = test_env::set_var("DERIVE_TIMEOUT", "1m");
    let _ratio = test_env::set_var("DERIVE_RATIO", "0.75");
    let mut resolver = resolver(
        &["svc", "--port", "9000", "--verbose", "--max-connections=64"],
        api_secret(),
    );
    let mut config = ServiceConfig::default();
    let report = resolver.resolve(&ResolveContext::new(), ServiceConfig::prefix(), &mut config)?;

    ensure!(config.host == "env-host");
    ensure!(config.port == 9000);
    ensure!(config.timeout == Duration::from_secs(60));
    ensure!(config.verbose);
    ensure!((config.sample_ratio - 0.75).abs() < f64::EPSILON);
    ensure!(config.max_connections == Some(64));

    ensure!(report.source_of("host") == Some(Source::Environment));
    ensure!(report.source_of("port") == Some(Source::Flag));
    ensure!(report.source_of("api_key") == Some(Source::Secret));
    ensure!(report.source_of("notes").is_none(), "ignored fields are not reported");
    Ok(())
}

#[rstest]
#[serial]
fn secret_beats_environment(_clean_env: test_env::EnvScope) -> Result<()> {
    let _key = test_env::set_var("DERIVE_API_KEY", "from-env");
    let mut resolver = resolver(&["svc"], api_secret());
    let config = ServiceConfig::load_with(&mut resolver, &ResolveContext::new())?;
    ensure!(config.api_key == "from-secret");
    Ok(())
}

#[rstest]
#[serial]
fn failures_across_fields_are_aggregated(_clean_env: test_env::EnvScope) -> Result<()> {
    let _port = test_env::set_var("DERIVE_PORT", "0");
    let _timeout = test_env::set_var("DERIVE_TIMEOUT", "soon");
    let mut resolver = resolver(&["svc"], StaticSecrets::new());
    let err = ServiceConfig::load_with(&mut resolver, &ResolveContext::new())
        .err()
        .ok_or_else(|| anyhow!("expected resolution to fail"))?;
    let errors = err
        .resolution_errors()
        .ok_or_else(|| anyhow!("expected field errors, got {err}"))?;
    let categories: Vec<_> = errors
        .iter()
        .map(|e| (e.field().to_owned(), e.category()))
        .collect();
    ensure!(
        categories
            == vec![
                (String::from("port"), ErrorCategory::Required),
                (String::from("timeout"), ErrorCategory::Coercion),
                (String::from("api_key"), ErrorCategory::SecretAccess),
            ],
        "{categories:?}"
    );
    let text = err.to_string();
    ensure!(
        text.contains(
            "field 'port' is required but received zero value (source: environment, raw value: '0') (env: DERIVE_PORT) (flag: --port)"
        ),
        "{text}"
    );
    Ok(())
}

#[rstest]
#[serial]
fn unknown_flags_are_fatal(_clean_env: test_env::EnvScope) {
    let err = ServiceConfig::load_from_iter(["svc", "--no-such-flag"])
        .expect_err("unknown flag must fail");
    assert!(matches!(err, TieredError::CliParsing(_)), "{err:?}");
}

#[derive(Debug, Default, TieredConfig)]
#[tiered_config(prefix = "DERIVE_PLAIN_")]
struct PlainConfig {
    #[tiered_config(env, flag, default = "info")]
    log_level: String,
    #[tiered_config(flag, default = -5)]
    offset: i32,
}

#[rstest]
#[serial]
fn load_from_iter_parses_given_arguments(_clean_env: test_env::EnvScope) -> Result<()> {
    let config = PlainConfig::load_from_iter(["plain", "--log-level", "debug"])?;
    ensure!(config.log_level == "debug");
    ensure!(config.offset == -5);
    Ok(())
}

#[rstest]
#[serial]
fn negative_and_repeated_flags_parse(_clean_env: test_env::EnvScope) -> Result<()> {
    let config = PlainConfig::load_from_iter([
        "plain",
        "--offset",
        "-12",
        "--log-level",
        "warn",
        "--log-level",
        "error",
    ])?;
    ensure!(config.offset == -12);
    ensure!(config.log_level == "error");
    Ok(())
}

#[rstest]
#[serial]
fn generated_help_names_environment_keys(_clean_env: test_env::EnvScope) -> Result<()> {
    let mut resolver = Resolver::builder().args(["plain"]).without_dotenv().build();
    PlainConfig::load_with(&mut resolver, &ResolveContext::new())?;
    let help = resolver.command().clone().render_help().to_string();
    ensure!(help.contains("--log-level"), "{help}");
    ensure!(help.contains("Set value for log_level (env: LOG_LEVEL)"), "{help}");
    Ok(())
}
