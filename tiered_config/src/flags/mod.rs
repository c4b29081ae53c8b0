//! Command-line flags derived from field annotations.
//!
//! The registry owns a [`clap::Command`]. Definition adds one argument per
//! flag-annotated field unless the command already has an argument with that
//! name, in which case the caller's argument is reused. Definition and
//! parsing each happen once per registry; later calls are no-ops.

mod kind;

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;
use tracing::debug;

use crate::coerce::{CoercionError, coerce, format_duration};
use crate::error::{FieldError, FieldErrorKind, TieredResult};
use crate::field::FieldDescriptor;
use crate::value::{FieldType, Value};

pub use kind::FlagKind;

/// Name of the command built when the caller supplies none.
pub(crate) const DEFAULT_COMMAND_NAME: &str = "tiered-config";

/// Why a flag could not be defined.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlagDefinitionError {
    /// The default annotation does not parse as the flag's kind.
    #[error("(flag --{flag}): invalid default {kind} format '{literal}': {error}")]
    InvalidDefault {
        /// Flag name.
        flag: String,
        /// Kind the default was parsed as.
        kind: FlagKind,
        /// Default literal.
        literal: String,
        /// Parse failure.
        error: CoercionError,
    },
    /// The field's type has no flag kind.
    #[error("(flag --{flag}): unsupported type for flag: {field_type}")]
    UnsupportedType {
        /// Flag name.
        flag: String,
        /// Declared field type.
        field_type: FieldType,
    },
}

/// Who registered a flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlagOwner {
    /// Generated from a field annotation with the given kind.
    Defined(FlagKind),
    /// Already present on the caller's command.
    External,
}

#[derive(Debug)]
struct RegisteredFlag {
    owner: FlagOwner,
    id: String,
}

/// Flags of one resolver context.
#[derive(Debug)]
pub(crate) struct FlagRegistry {
    command: Command,
    args: Vec<OsString>,
    flags: BTreeMap<String, RegisteredFlag>,
    defined: bool,
    matches: Option<ArgMatches>,
}

impl FlagRegistry {
    pub(crate) fn new(command: Command, args: Vec<OsString>) -> Self {
        Self {
            command,
            args,
            flags: BTreeMap::new(),
            defined: false,
            matches: None,
        }
    }

    pub(crate) const fn command(&self) -> &Command {
        &self.command
    }

    pub(crate) fn flags(&self) -> impl Iterator<Item = (&str, FlagOwner)> {
        self.flags
            .iter()
            .map(|(name, registered)| (name.as_str(), registered.owner))
    }

    pub(crate) const fn is_defined(&self) -> bool {
        self.defined
    }

    pub(crate) const fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    /// Registers flags for `descriptors`, returning one field error per flag
    /// that could not be defined.
    pub(crate) fn define(&mut self, descriptors: &[FieldDescriptor]) -> Vec<FieldError> {
        let annotated = descriptors
            .iter()
            .filter(|descriptor| descriptor.is_active())
            .filter_map(|descriptor| {
                descriptor
                    .annotations()
                    .flag()
                    .map(|flag| (descriptor, flag))
            });
        if self.defined {
            for (descriptor, flag) in annotated {
                if !self.flags.contains_key(flag) {
                    debug!(
                        field = descriptor.name(),
                        flag,
                        "flags already defined; not registering"
                    );
                }
            }
            return Vec::new();
        }
        let mut errors = Vec::new();
        for (descriptor, flag) in annotated {
            if let Err(err) = self.define_one(descriptor, flag) {
                errors.push(FieldError::new(
                    descriptor.name(),
                    FieldErrorKind::FlagDefinition(err),
                ));
            }
        }
        self.defined = true;
        errors
    }

    fn define_one(
        &mut self,
        descriptor: &FieldDescriptor,
        flag: &str,
    ) -> Result<(), FlagDefinitionError> {
        if self.flags.contains_key(flag) {
            return Ok(());
        }
        let preexisting = self
            .command
            .get_arguments()
            .find(|arg| arg.get_id() == flag || arg.get_long() == Some(flag))
            .map(|arg| arg.get_id().as_str().to_owned());
        if let Some(id) = preexisting {
            debug!(flag, id = %id, "reusing flag already defined on the command");
            self.flags.insert(
                flag.to_owned(),
                RegisteredFlag {
                    owner: FlagOwner::External,
                    id,
                },
            );
            return Ok(());
        }
        let field_type = descriptor
            .field_type()
            .ok_or_else(|| FlagDefinitionError::UnsupportedType {
                flag: flag.to_owned(),
                field_type: FieldType::other("<unknown>"),
            })?;
        let kind =
            FlagKind::for_field(field_type).ok_or_else(|| FlagDefinitionError::UnsupportedType {
                flag: flag.to_owned(),
                field_type,
            })?;
        let default = descriptor
            .annotations()
            .default_literal()
            .map(|literal| {
                coerce(FieldType::scalar(kind.scalar()), literal).map_err(|error| {
                    FlagDefinitionError::InvalidDefault {
                        flag: flag.to_owned(),
                        kind,
                        literal: literal.to_owned(),
                        error,
                    }
                })
            })
            .transpose()?;
        let arg = build_arg(descriptor, flag, kind, default.as_ref());
        self.command = std::mem::take(&mut self.command).arg(arg);
        self.flags.insert(
            flag.to_owned(),
            RegisteredFlag {
                owner: FlagOwner::Defined(kind),
                id: flag.to_owned(),
            },
        );
        debug!(flag, %kind, "defined flag");
        Ok(())
    }

    /// Parses the arguments once.
    pub(crate) fn parse(&mut self) -> TieredResult<()> {
        if self.matches.is_some() {
            return Ok(());
        }
        let matches = self
            .command
            .try_get_matches_from_mut(self.args.iter().cloned())?;
        self.matches = Some(matches);
        Ok(())
    }

    /// Text of `flag` when it was supplied on the command line.
    ///
    /// Generated flags yield their bound value rendered back to text;
    /// externally owned flags yield the last raw argument.
    pub(crate) fn supplied(&self, flag: &str) -> Option<String> {
        let registered = self.flags.get(flag)?;
        let matches = self.matches.as_ref()?;
        let id = registered.id.as_str();
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            return None;
        }
        match registered.owner {
            FlagOwner::Defined(_) => matches
                .try_get_one::<Value>(id)
                .ok()
                .flatten()
                .map(render),
            FlagOwner::External => matches
                .try_get_raw(id)
                .ok()
                .flatten()
                .and_then(Iterator::last)
                .and_then(|raw| raw.to_str())
                .map(str::to_owned),
        }
    }
}

fn build_arg(
    descriptor: &FieldDescriptor,
    flag: &str,
    kind: FlagKind,
    default: Option<&Value>,
) -> Arg {
    let help = descriptor.annotations().env().map_or_else(
        || format!("Set value for {}", descriptor.name()),
        |env| format!("Set value for {} (env: {env})", descriptor.name()),
    );
    let scalar = kind.scalar();
    let mut arg = Arg::new(flag.to_owned())
        .long(flag.to_owned())
        .help(help)
        .value_name(kind.value_name())
        .action(ArgAction::Set)
        .overrides_with(flag.to_owned())
        .value_parser(move |raw: &str| coerce(FieldType::scalar(scalar), raw));
    if matches!(kind, FlagKind::Int | FlagKind::Int64 | FlagKind::Float64) {
        arg = arg.allow_negative_numbers(true);
    }
    if kind == FlagKind::Bool {
        arg = arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true");
    }
    if let Some(value) = default {
        arg = arg.default_value(render(value));
    }
    arg
}

/// Renders a bound flag value in a form the coercion engine reads back.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Signed(n) => n.to_string(),
        Value::Unsigned(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Duration(d) => format_duration(*d),
    }
}

#[cfg(test)]
mod tests;
