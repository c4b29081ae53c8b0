//! Field metadata for configuration records.
//!
//! A record exposes its fields through [`Specification::fields`], returning
//! one [`FieldEntry`] per field. Each entry pairs the field's annotations with
//! mutable access to the field itself. `#[derive(TieredConfig)]` generates
//! this table; it can also be written by hand with the [`FieldEntry`]
//! builder.
//!
//! ```
//! use tiered_config::{FieldEntry, Specification};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Specification for Server {
//!     fn fields(&mut self) -> Vec<FieldEntry<'_>> {
//!         vec![
//!             FieldEntry::new("host", &mut self.host).env("HOST").default("localhost"),
//!             FieldEntry::new("port", &mut self.port).env("PORT").flag("port").required(),
//!         ]
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::value::{ConfigValue, FieldType};
use crate::{TieredError, TieredResult};

/// Per-field source annotations.
///
/// Empty strings are treated as absent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldAnnotations {
    env: Option<String>,
    secret: Option<String>,
    flag: Option<String>,
    default: Option<String>,
    required: bool,
    ignored: bool,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

impl FieldAnnotations {
    /// Environment key, without prefix.
    #[must_use]
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Secret reference passed to the secret collaborator.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Command-line flag name, without leading dashes.
    #[must_use]
    pub fn flag(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    /// Default literal.
    #[must_use]
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Whether the field must resolve to a non-zero value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the loader skips the field entirely.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Derived description of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    field_type: Option<FieldType>,
    annotations: FieldAnnotations,
}

impl FieldDescriptor {
    /// Field name as declared on the record.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type. `None` only for ignored fields, which carry no slot.
    #[must_use]
    pub const fn field_type(&self) -> Option<FieldType> {
        self.field_type
    }

    /// Source annotations.
    #[must_use]
    pub const fn annotations(&self) -> &FieldAnnotations {
        &self.annotations
    }

    /// Whether the field takes part in resolution.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.annotations.ignored
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One row of a record's field table: annotations plus mutable access.
pub struct FieldEntry<'a> {
    name: &'static str,
    annotations: FieldAnnotations,
    slot: Option<&'a mut dyn ConfigValue>,
}

impl<'a> FieldEntry<'a> {
    /// Starts an entry for the field `name` stored in `slot`.
    #[must_use]
    pub fn new(name: &'static str, slot: &'a mut dyn ConfigValue) -> Self {
        Self {
            name,
            annotations: FieldAnnotations::default(),
            slot: Some(slot),
        }
    }

    /// An entry for a field the loader must not touch.
    ///
    /// Ignored fields need not implement [`ConfigValue`].
    #[must_use]
    pub fn ignored(name: &'static str) -> Self {
        Self {
            name,
            annotations: FieldAnnotations {
                ignored: true,
                ..FieldAnnotations::default()
            },
            slot: None,
        }
    }

    /// An entry with annotations but no settable slot.
    ///
    /// Resolving a record containing such an entry fails with
    /// [`TieredError::InvalidSpecification`] unless the entry is ignored.
    #[must_use]
    pub fn unsettable(name: &'static str) -> Self {
        Self {
            name,
            annotations: FieldAnnotations::default(),
            slot: None,
        }
    }

    /// Sets the environment key.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>) -> Self {
        self.annotations.env = non_empty(key);
        self
    }

    /// Sets the secret reference.
    #[must_use]
    pub fn secret(mut self, reference: impl Into<String>) -> Self {
        self.annotations.secret = non_empty(reference);
        self
    }

    /// Sets the flag name.
    #[must_use]
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.annotations.flag = non_empty(name);
        self
    }

    /// Sets the default literal.
    #[must_use]
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.annotations.default = non_empty(literal);
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.annotations.required = true;
        self
    }

    /// Marks the field as ignored.
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.annotations.ignored = true;
        self
    }

    /// Field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Annotations recorded so far.
    #[must_use]
    pub const fn annotations(&self) -> &FieldAnnotations {
        &self.annotations
    }
}

impl fmt::Debug for FieldEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .field("settable", &self.slot.is_some())
            .finish()
    }
}

/// A record the resolver can populate.
pub trait Specification {
    /// Returns one entry per field, in declaration order.
    fn fields(&mut self) -> Vec<FieldEntry<'_>>;
}

/// A validated field: descriptor plus the slot to write into.
pub(crate) struct BoundField<'a> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) slot: Option<&'a mut dyn ConfigValue>,
}

/// Produces descriptors for every field of `spec`.
///
/// # Errors
///
/// Returns [`TieredError::InvalidSpecification`] when the table has an empty
/// or duplicate field name, a non-ignored field without a slot, or two
/// non-ignored fields sharing a flag name.
pub fn describe<S: Specification + ?Sized>(spec: &mut S) -> TieredResult<Vec<FieldDescriptor>> {
    Ok(extract(spec)?
        .into_iter()
        .map(|bound| bound.descriptor)
        .collect())
}

pub(crate) fn extract<S>(spec: &mut S) -> TieredResult<Vec<BoundField<'_>>>
where
    S: Specification + ?Sized,
{
    let entries = spec.fields();
    let mut names = HashSet::new();
    let mut flags = HashSet::new();
    let mut bound = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name.is_empty() {
            return Err(TieredError::invalid_specification("field names must not be empty"));
        }
        if !names.insert(entry.name) {
            return Err(TieredError::invalid_specification(format!(
                "duplicate field '{}'",
                entry.name
            )));
        }
        if !entry.annotations.ignored {
            if entry.slot.is_none() {
                return Err(TieredError::invalid_specification(format!(
                    "field '{}' is not settable",
                    entry.name
                )));
            }
            if let Some(flag) = entry.annotations.flag.as_deref()
                && !flags.insert(flag.to_owned())
            {
                return Err(TieredError::invalid_specification(format!(
                    "flag '--{flag}' is declared by more than one field"
                )));
            }
        }
        let field_type = entry.slot.as_deref().map(|slot| slot.field_type());
        bound.push(BoundField {
            descriptor: FieldDescriptor {
                name: entry.name,
                field_type,
                annotations: entry.annotations,
            },
            slot: entry.slot,
        });
    }
    Ok(bound)
}
