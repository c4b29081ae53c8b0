//! Merge and validation engine.
//!
//! [`Resolver::resolve`] walks a record's fields and consults the sources
//! in ascending precedence:
//!
//! 1. the default annotation,
//! 2. the environment (after the dotenv file is loaded),
//! 3. the secret store,
//! 4. explicitly supplied command-line flags.
//!
//! The last source that finds a value wins. The winning text is coerced into
//! the field, required fields are checked, and every field-level failure is
//! collected into a single [`TieredError::Resolution`].

mod builder;

use std::fmt;

use camino::Utf8PathBuf;
use clap::Command;
use tracing::{debug, info};

use crate::coerce::coerce;
use crate::context::ResolveContext;
use crate::error::{FieldError, FieldErrorKind, RequiredDiagnostics, TieredError, TieredResult};
use crate::field::{FieldDescriptor, Specification, extract};
use crate::flags::{FlagOwner, FlagRegistry};
use crate::secret::{SecretClient, SecretSession};
use crate::sources::{EnvLookup, Source, env_var_name, load_dotenv, lookup_env};
use crate::value::ConfigValue;

pub use builder::ResolverBuilder;

/// Source that supplied one field, if any.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldOutcome {
    /// Field name.
    pub field: &'static str,
    /// Winning source; `None` when the field kept its prior value.
    pub source: Option<Source>,
}

/// Summary of a successful resolution: one entry per non-ignored field.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolutionReport {
    fields: Vec<FieldOutcome>,
}

impl ResolutionReport {
    /// Winning source for `field`. `None` when the field was not found or is
    /// not part of the report.
    #[must_use]
    pub fn source_of(&self, field: &str) -> Option<Source> {
        self.fields
            .iter()
            .find(|outcome| outcome.field == field)
            .and_then(|outcome| outcome.source)
    }

    /// Outcomes in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldOutcome> {
        self.fields.iter()
    }

    /// Number of fields considered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was considered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields some source supplied.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.fields
            .iter()
            .filter(|outcome| outcome.source.is_some())
            .count()
    }
}

impl<'a> IntoIterator for &'a ResolutionReport {
    type Item = &'a FieldOutcome;
    type IntoIter = std::slice::Iter<'a, FieldOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Resolution context: flag registry, dotenv location and secret client.
///
/// Flags are defined and parsed on the first call and reused afterwards.
/// The secret client is created on first need and kept until
/// [`Resolver::close_secret_client`].
///
/// # Examples
///
/// ```
/// use tiered_config::{FieldEntry, ResolveContext, Resolver, Source, Specification};
///
/// #[derive(Default)]
/// struct Server {
///     port: u16,
/// }
///
/// impl Specification for Server {
///     fn fields(&mut self) -> Vec<FieldEntry<'_>> {
///         vec![FieldEntry::new("port", &mut self.port).flag("port").default("8080")]
///     }
/// }
///
/// let mut resolver = Resolver::builder()
///     .args(["server", "--port", "9000"])
///     .without_dotenv()
///     .build();
/// let mut server = Server::default();
/// let report = resolver
///     .resolve(&ResolveContext::new(), "DOC_", &mut server)
///     .unwrap();
/// assert_eq!(server.port, 9000);
/// assert_eq!(report.source_of("port"), Some(Source::Flag));
/// ```
pub struct Resolver {
    flags: FlagRegistry,
    dotenv: Option<Utf8PathBuf>,
    secrets: SecretClient,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("flags", &self.flags)
            .field("dotenv", &self.dotenv)
            .field("secrets", &self.secrets)
            .finish()
    }
}

impl Resolver {
    /// Starts configuring a resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Populates `spec` from every source and validates required fields.
    ///
    /// Fields resolved before a failure keep their new values; nothing is
    /// rolled back.
    ///
    /// # Errors
    ///
    /// - [`TieredError::InvalidSpecification`] when the field table is not a
    ///   settable record; no field is touched.
    /// - [`TieredError::CliParsing`] when the arguments do not parse.
    /// - [`TieredError::Resolution`] listing every field-level failure.
    pub fn resolve<S>(
        &mut self,
        ctx: &ResolveContext,
        prefix: &str,
        spec: &mut S,
    ) -> TieredResult<ResolutionReport>
    where
        S: Specification + ?Sized,
    {
        let fields = extract(spec)?;
        let descriptors: Vec<FieldDescriptor> =
            fields.iter().map(|bound| bound.descriptor.clone()).collect();
        let mut errors = self.flags.define(&descriptors);
        self.flags.parse()?;
        if let Some(path) = &self.dotenv {
            load_dotenv(path);
        }

        let mut merge = Merge {
            ctx,
            prefix,
            flags: &self.flags,
            secrets: self.secrets.session(),
            errors: &mut errors,
        };
        let mut report = ResolutionReport::default();
        for bound in fields {
            if !bound.descriptor.is_active() {
                debug!(field = bound.descriptor.name(), "ignored");
                continue;
            }
            let Some(slot) = bound.slot else { continue };
            let source = merge.field(&bound.descriptor, slot);
            report.fields.push(FieldOutcome {
                field: bound.descriptor.name(),
                source,
            });
        }

        match TieredError::try_resolution(errors) {
            Some(err) => Err(err),
            None => {
                info!(
                    prefix,
                    fields = report.len(),
                    resolved = report.resolved(),
                    "configuration resolved"
                );
                Ok(report)
            }
        }
    }

    /// Closes the secret client if one is open. The next resolution that
    /// needs a secret creates a new one.
    ///
    /// # Errors
    ///
    /// Returns [`TieredError::SecretClient`] when the accessor fails to
    /// close; the client is discarded regardless.
    pub fn close_secret_client(&mut self) -> TieredResult<()> {
        self.secrets.close().map_err(TieredError::from)
    }

    /// Whether a secret client is currently open.
    #[must_use]
    pub const fn has_secret_client(&self) -> bool {
        self.secrets.is_initialized()
    }

    /// Flags known to the registry, by name.
    pub fn registered_flags(&self) -> impl Iterator<Item = (&str, FlagOwner)> {
        self.flags.flags()
    }

    /// Whether flags have been defined.
    #[must_use]
    pub const fn flags_defined(&self) -> bool {
        self.flags.is_defined()
    }

    /// Whether the arguments have been parsed.
    #[must_use]
    pub const fn flags_parsed(&self) -> bool {
        self.flags.is_parsed()
    }

    /// The command carrying generated flags, for rendering help.
    #[must_use]
    pub const fn command(&self) -> &Command {
        self.flags.command()
    }
}

/// State shared by the fields of one resolution call.
struct Merge<'r, 'e> {
    ctx: &'r ResolveContext,
    prefix: &'r str,
    flags: &'r FlagRegistry,
    secrets: SecretSession<'r>,
    errors: &'e mut Vec<FieldError>,
}

impl Merge<'_, '_> {
    fn push(&mut self, field: &str, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(field, kind));
    }

    /// Resolves one field, returning the winning source.
    fn field(
        &mut self,
        descriptor: &FieldDescriptor,
        slot: &mut dyn ConfigValue,
    ) -> Option<Source> {
        let name = descriptor.name();
        let annotations = descriptor.annotations();
        let mut winner: Option<(Source, String)> = annotations
            .default_literal()
            .map(|literal| (Source::Default, literal.to_owned()));

        let env_var = annotations
            .env()
            .map(|key| env_var_name(self.prefix, key));
        if let Some(variable) = &env_var {
            match lookup_env(variable) {
                EnvLookup::Found(value) => winner = Some((Source::Environment, value)),
                EnvLookup::Missing => {}
                EnvLookup::NotUnicode => self.push(
                    name,
                    FieldErrorKind::Environment {
                        variable: variable.clone(),
                    },
                ),
            }
        }

        if let Some(reference) = annotations.secret() {
            match self.secrets.fetch(self.ctx, reference) {
                Ok(value) => winner = Some((Source::Secret, value)),
                Err(error) => self.push(
                    name,
                    FieldErrorKind::SecretAccess {
                        reference: reference.to_owned(),
                        error,
                    },
                ),
            }
        }

        if let Some(value) = annotations.flag().and_then(|flag| self.flags.supplied(flag)) {
            winner = Some((Source::Flag, value));
        }

        if let Some((source, raw)) = &winner {
            debug!(field = name, %source, "field resolved");
            let assigned = coerce(slot.field_type(), raw).and_then(|value| slot.assign(value));
            if let Err(error) = assigned {
                self.push(
                    name,
                    FieldErrorKind::Coercion {
                        origin: *source,
                        raw: raw.clone(),
                        error,
                    },
                );
                return Some(*source);
            }
        } else {
            debug!(field = name, "no source supplied a value");
        }

        if annotations.is_required() && (winner.is_none() || slot.is_zero()) {
            let source = winner.as_ref().map(|(source, _)| *source);
            self.push(
                name,
                FieldErrorKind::Required(RequiredDiagnostics {
                    found: winner,
                    env_var,
                    flag: annotations.flag().map(str::to_owned),
                    secret: annotations.secret().map(str::to_owned),
                }),
            );
            return source;
        }
        winner.map(|(source, _)| source)
    }
}
