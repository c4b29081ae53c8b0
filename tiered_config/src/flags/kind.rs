//! Value kinds of generated flags.

use std::fmt;

use crate::value::{FieldType, ScalarKind};

/// Value kind of a generated flag, chosen from the field's scalar type.
///
/// Narrow integer fields share the 64-bit kinds; the bound value is range
/// checked again when it is coerced into the field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FlagKind {
    /// Free text.
    String,
    /// Pointer-width signed integer.
    Int,
    /// 64-bit signed integer.
    Int64,
    /// Pointer-width unsigned integer.
    Uint,
    /// 64-bit unsigned integer.
    Uint64,
    /// Boolean switch; a bare flag means `true`.
    Bool,
    /// 64-bit float.
    Float64,
    /// Duration literal.
    Duration,
}

impl FlagKind {
    /// Kind used for fields of `field_type`, looking through `Option`.
    ///
    /// Returns `None` for unsupported types.
    #[must_use]
    pub const fn for_field(field_type: FieldType) -> Option<Self> {
        Some(match field_type.scalar_kind() {
            ScalarKind::String => Self::String,
            ScalarKind::Isize => Self::Int,
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64 => Self::Int64,
            ScalarKind::Usize => Self::Uint,
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 => Self::Uint64,
            ScalarKind::Bool => Self::Bool,
            ScalarKind::F32 | ScalarKind::F64 => Self::Float64,
            ScalarKind::Duration => Self::Duration,
            ScalarKind::Other(_) => return None,
        })
    }

    /// Scalar kind the flag parses its value as.
    #[must_use]
    pub const fn scalar(self) -> ScalarKind {
        match self {
            Self::String => ScalarKind::String,
            Self::Int => ScalarKind::Isize,
            Self::Int64 => ScalarKind::I64,
            Self::Uint => ScalarKind::Usize,
            Self::Uint64 => ScalarKind::U64,
            Self::Bool => ScalarKind::Bool,
            Self::Float64 => ScalarKind::F64,
            Self::Duration => ScalarKind::Duration,
        }
    }

    /// Placeholder shown in help output.
    #[must_use]
    pub const fn value_name(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int | Self::Int64 => "INT",
            Self::Uint | Self::Uint64 => "UINT",
            Self::Bool => "BOOL",
            Self::Float64 => "FLOAT",
            Self::Duration => "DURATION",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint64 => "uint64",
            Self::Bool => "bool",
            Self::Float64 => "float64",
            Self::Duration => "duration",
        };
        f.write_str(name)
    }
}
