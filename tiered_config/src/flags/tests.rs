//! Unit tests for flag definition and parsing.

use std::time::Duration;

use anyhow::{Result, anyhow};
use rstest::rstest;

use super::*;
use crate::coerce::CoercionFailure;
use crate::error::ErrorCategory;
use crate::field::{FieldEntry, Specification, describe};
use crate::value::{ConfigValue, ScalarKind};

#[derive(Default)]
struct Service {
    port: u16,
    debug: bool,
    timeout: Duration,
    level: i8,
    name: String,
    unflagged: u32,
}

impl Specification for Service {
    fn fields(&mut self) -> Vec<FieldEntry<'_>> {
        vec![
            FieldEntry::new("port", &mut self.port)
                .env("PORT")
                .flag("port")
                .default("8080"),
            FieldEntry::new("debug", &mut self.debug).flag("debug"),
            FieldEntry::new("timeout", &mut self.timeout)
                .flag("timeout")
                .default("5s"),
            FieldEntry::new("level", &mut self.level).flag("level"),
            FieldEntry::new("name", &mut self.name).flag("name"),
            FieldEntry::new("unflagged", &mut self.unflagged).env("UNFLAGGED"),
        ]
    }
}

fn registry(args: &[&str]) -> FlagRegistry {
    FlagRegistry::new(
        Command::new("svc"),
        args.iter().map(OsString::from).collect(),
    )
}

fn defined_registry(args: &[&str]) -> Result<FlagRegistry> {
    let descriptors = describe(&mut Service::default())?;
    let mut flags = registry(args);
    let errors = flags.define(&descriptors);
    if !errors.is_empty() {
        return Err(anyhow!("unexpected definition errors: {errors:?}"));
    }
    flags.parse()?;
    Ok(flags)
}

#[test]
fn defines_one_flag_per_annotated_field() -> Result<()> {
    let flags = defined_registry(&["svc"])?;
    let kinds: Vec<_> = flags.flags().collect();
    assert_eq!(
        kinds,
        [
            ("debug", FlagOwner::Defined(FlagKind::Bool)),
            ("level", FlagOwner::Defined(FlagKind::Int64)),
            ("name", FlagOwner::Defined(FlagKind::String)),
            ("port", FlagOwner::Defined(FlagKind::Uint64)),
            ("timeout", FlagOwner::Defined(FlagKind::Duration)),
        ]
    );
    assert!(flags.is_defined() && flags.is_parsed());
    Ok(())
}

#[test]
fn help_mentions_field_and_env_key() -> Result<()> {
    let flags = defined_registry(&["svc"])?;
    let help = flags.command().clone().render_help().to_string();
    assert!(help.contains("Set value for port (env: PORT)"), "{help}");
    assert!(help.contains("Set value for debug"), "{help}");
    Ok(())
}

#[rstest]
#[case(&["svc", "--port", "9000"], "port", Some("9000"))]
#[case(&["svc", "--port=0x10"], "port", Some("16"))]
#[case(&["svc"], "port", None)]
#[case(&["svc", "--debug"], "debug", Some("true"))]
#[case(&["svc", "--debug=false"], "debug", Some("false"))]
#[case(&["svc", "--timeout", "90s"], "timeout", Some("1m 30s"))]
#[case(&["svc", "--level", "300"], "level", Some("300"))]
#[case(&["svc", "--level", "-5"], "level", Some("-5"))]
#[case(&["svc", "--port", "1", "--port", "2"], "port", Some("2"))]
#[case(&["svc", "--debug", "--debug=false"], "debug", Some("false"))]
#[case(&["svc", "--name", ""], "name", Some(""))]
#[case(&["svc", "--port", "1"], "unflagged", None)]
fn reports_only_explicit_flags(
    #[case] args: &[&str],
    #[case] flag: &str,
    #[case] expected: Option<&str>,
) -> Result<()> {
    let flags = defined_registry(args)?;
    assert_eq!(flags.supplied(flag).as_deref(), expected);
    Ok(())
}

#[test]
fn unknown_arguments_fail_parsing() -> Result<()> {
    let descriptors = describe(&mut Service::default())?;
    let mut flags = registry(&["svc", "--bogus"]);
    assert!(flags.define(&descriptors).is_empty());
    let err = flags.parse().expect_err("unknown flag");
    assert!(err.as_clap().is_some());
    assert!(!flags.is_parsed());
    Ok(())
}

#[test]
fn invalid_flag_values_fail_parsing() -> Result<()> {
    let descriptors = describe(&mut Service::default())?;
    let mut flags = registry(&["svc", "--port", "eighty"]);
    assert!(flags.define(&descriptors).is_empty());
    assert!(flags.parse().is_err());
    Ok(())
}

struct BadDefault {
    retries: u8,
    ratio: f64,
}

impl Specification for BadDefault {
    fn fields(&mut self) -> Vec<FieldEntry<'_>> {
        vec![
            FieldEntry::new("retries", &mut self.retries)
                .flag("retries")
                .default("many"),
            FieldEntry::new("ratio", &mut self.ratio)
                .flag("ratio")
                .default("0.5"),
        ]
    }
}

#[test]
fn invalid_default_leaves_flag_undefined() -> Result<()> {
    let descriptors = describe(&mut BadDefault {
        retries: 0,
        ratio: 0.0,
    })?;
    let mut flags = registry(&["svc"]);
    let errors = flags.define(&descriptors);
    assert_eq!(errors.len(), 1);
    let err = &errors[0];
    assert_eq!(err.field(), "retries");
    assert_eq!(err.category(), ErrorCategory::FlagDefinition);
    match err.kind() {
        FieldErrorKind::FlagDefinition(FlagDefinitionError::InvalidDefault { error, .. }) => {
            assert_eq!(error.failure(), &CoercionFailure::InvalidInteger);
        }
        other => return Err(anyhow!("unexpected error kind: {other:?}")),
    }
    let names: Vec<_> = flags.flags().map(|(name, _)| name).collect();
    assert_eq!(names, ["ratio"]);
    Ok(())
}

struct Endpoint(String);

impl ConfigValue for Endpoint {
    fn field_type(&self) -> FieldType {
        FieldType::other("Endpoint")
    }

    fn assign(&mut self, _value: Value) -> Result<(), CoercionError> {
        Err(CoercionError::new(
            ScalarKind::Other("Endpoint"),
            self.0.clone(),
            CoercionFailure::Unsupported,
        ))
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

struct WithEndpoint {
    endpoint: Endpoint,
}

impl Specification for WithEndpoint {
    fn fields(&mut self) -> Vec<FieldEntry<'_>> {
        vec![FieldEntry::new("endpoint", &mut self.endpoint).flag("endpoint")]
    }
}

#[test]
fn unsupported_field_types_are_collected() -> Result<()> {
    let descriptors = describe(&mut WithEndpoint {
        endpoint: Endpoint(String::new()),
    })?;
    let mut flags = registry(&["svc"]);
    let errors = flags.define(&descriptors);
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .to_string()
            .contains("unsupported type for flag: Endpoint"),
        "{}",
        errors[0]
    );
    Ok(())
}

#[test]
fn caller_flags_are_reused() -> Result<()> {
    let descriptors = describe(&mut Service::default())?;
    let command = Command::new("svc").arg(
        Arg::new("listen_port")
            .long("port")
            .action(ArgAction::Set),
    );
    let mut flags = FlagRegistry::new(
        command,
        ["svc", "--port", "7000"].map(OsString::from).to_vec(),
    );
    assert!(flags.define(&descriptors).is_empty());
    flags.parse()?;
    assert!(
        flags
            .flags()
            .any(|(name, owner)| name == "port" && owner == FlagOwner::External)
    );
    assert_eq!(flags.supplied("port").as_deref(), Some("7000"));
    Ok(())
}

#[derive(Default)]
struct Extra {
    extra: u32,
}

impl Specification for Extra {
    fn fields(&mut self) -> Vec<FieldEntry<'_>> {
        vec![FieldEntry::new("extra", &mut self.extra).flag("extra")]
    }
}

#[test]
fn definition_happens_once() -> Result<()> {
    let mut flags = defined_registry(&["svc"])?;
    let descriptors = describe(&mut Extra::default())?;
    assert!(flags.define(&descriptors).is_empty());
    assert!(flags.flags().all(|(name, _)| name != "extra"));
    assert_eq!(flags.supplied("extra"), None);
    Ok(())
}

#[test]
fn float_and_duration_values_render_back() {
    assert_eq!(render(&Value::Float(2000.0)), "2000");
    assert_eq!(render(&Value::Duration(Duration::from_millis(1500))), "1s 500ms");
    assert_eq!(render(&Value::Signed(-3)), "-3");
}
