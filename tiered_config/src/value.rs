//! Field types and the typed values the coercion engine produces.
//!
//! A configuration field participates in resolution through [`ConfigValue`],
//! which exposes the field's declared [`FieldType`], accepts a coerced
//! [`Value`], and reports whether the field still holds its zero value.
//! Scalars implement [`ScalarValue`]; `Option<T>` wraps any scalar one level
//! deep.

use std::fmt;
use std::time::Duration;

use crate::coerce::{CoercionError, CoercionFailure};

/// Scalar kinds understood by the coercion engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// UTF-8 string.
    String,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Pointer-width signed integer.
    Isize,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// Pointer-width unsigned integer.
    Usize,
    /// Boolean.
    Bool,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// [`std::time::Duration`].
    Duration,
    /// A type the engine cannot coerce into; carries the type's name.
    Other(&'static str),
}

impl ScalarKind {
    /// Human-readable type name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::Bool => "bool",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Duration => "Duration",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a configuration field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FieldType {
    scalar: ScalarKind,
    optional: bool,
}

impl FieldType {
    /// A plain scalar field.
    #[must_use]
    pub const fn scalar(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            optional: false,
        }
    }

    /// An `Option<T>` field wrapping `scalar`.
    #[must_use]
    pub const fn optional(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            optional: true,
        }
    }

    /// A field whose type the engine does not support.
    #[must_use]
    pub const fn other(name: &'static str) -> Self {
        Self::scalar(ScalarKind::Other(name))
    }

    /// The scalar kind, looking through any `Option` wrapper.
    #[must_use]
    pub const fn scalar_kind(self) -> ScalarKind {
        self.scalar
    }

    /// Whether the field is an `Option<T>`.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.optional
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Option<{}>", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

/// A coerced value ready to be assigned to a field.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// String payload.
    String(String),
    /// Signed integer, already range-checked for the target width.
    Signed(i64),
    /// Unsigned integer, already range-checked for the target width.
    Unsigned(u64),
    /// Boolean payload.
    Bool(bool),
    /// Float payload; `f32` targets hold an exactly representable value.
    Float(f64),
    /// Duration payload.
    Duration(Duration),
}

impl Value {
    const fn variant_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Signed(_) => "signed integer",
            Self::Unsigned(_) => "unsigned integer",
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Duration(_) => "duration",
        }
    }
}

/// A field the resolver can populate.
///
/// Implemented for every supported scalar and for `Option<T>` of those
/// scalars. Custom types may implement it directly; reporting
/// [`FieldType::other`] makes the engine treat them as unsupported.
pub trait ConfigValue {
    /// Declared type of the field.
    fn field_type(&self) -> FieldType;

    /// Stores a coerced value.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when `value` does not fit this field.
    fn assign(&mut self, value: Value) -> Result<(), CoercionError>;

    /// Whether the field holds its type's zero value.
    fn is_zero(&self) -> bool;
}

/// Scalar types that can sit directly in a field or inside an `Option`.
pub trait ScalarValue: Sized {
    /// Kind reported to the coercion engine.
    const KIND: ScalarKind;

    /// Converts a coerced value into `Self`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when the value's variant or range does not
    /// match `Self`.
    fn from_value(value: Value) -> Result<Self, CoercionError>;

    /// Whether `self` is the zero value of the type.
    fn is_zero_value(&self) -> bool;
}

fn mismatch(kind: ScalarKind, value: &Value) -> CoercionError {
    CoercionError::new(
        kind,
        format!("<{}>", value.variant_name()),
        CoercionFailure::TypeMismatch {
            found: value.variant_name(),
        },
    )
}

impl ScalarValue for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn is_zero_value(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! integer_scalar {
    ($($ty:ty => $kind:ident, $variant:ident;)*) => {
        $(
            impl ScalarValue for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn from_value(value: Value) -> Result<Self, CoercionError> {
                    match value {
                        Value::$variant(n) => <$ty>::try_from(n).map_err(|_| {
                            CoercionError::new(
                                Self::KIND,
                                n.to_string(),
                                CoercionFailure::OutOfRange,
                            )
                        }),
                        other => Err(mismatch(Self::KIND, &other)),
                    }
                }

                fn is_zero_value(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_scalar! {
    i8 => I8, Signed;
    i16 => I16, Signed;
    i32 => I32, Signed;
    i64 => I64, Signed;
    isize => Isize, Signed;
    u8 => U8, Unsigned;
    u16 => U16, Unsigned;
    u32 => U32, Unsigned;
    u64 => U64, Unsigned;
    usize => Usize, Unsigned;
}

impl ScalarValue for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn is_zero_value(&self) -> bool {
        !*self
    }
}

impl ScalarValue for f64 {
    const KIND: ScalarKind = ScalarKind::F64;

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn is_zero_value(&self) -> bool {
        *self == 0.0
    }
}

impl ScalarValue for f32 {
    const KIND: ScalarKind = ScalarKind::F32;

    #[expect(
        clippy::cast_possible_truncation,
        reason = "f32 targets only ever receive values parsed at f32 precision"
    )]
    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Float(x) => Ok(x as Self),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn is_zero_value(&self) -> bool {
        *self == 0.0
    }
}

impl ScalarValue for Duration {
    const KIND: ScalarKind = ScalarKind::Duration;

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn is_zero_value(&self) -> bool {
        self.is_zero()
    }
}

macro_rules! config_value_for_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn field_type(&self) -> FieldType {
                    FieldType::scalar(<$ty as ScalarValue>::KIND)
                }

                fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
                    *self = <$ty as ScalarValue>::from_value(value)?;
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    self.is_zero_value()
                }
            }
        )*
    };
}

config_value_for_scalar!(
    String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, f32, f64, Duration,
);

impl<T: ScalarValue> ConfigValue for Option<T> {
    fn field_type(&self) -> FieldType {
        FieldType::optional(T::KIND)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        let inner = T::from_value(value)?;
        match self {
            Some(slot) => *slot = inner,
            None => *self = Some(inner),
        }
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn option_assign_allocates_when_empty() {
        let mut slot: Option<u16> = None;
        slot.assign(Value::Unsigned(42)).expect("assign");
        assert_eq!(slot, Some(42));
        assert!(!slot.is_zero());
    }

    #[test]
    fn option_holding_zero_is_not_zero() {
        let slot: Option<i32> = Some(0);
        assert!(!slot.is_zero());
    }

    #[test]
    fn narrowing_rejects_out_of_range() {
        let mut slot = 0_u8;
        let err = slot.assign(Value::Unsigned(256)).expect_err("range");
        assert!(matches!(err.failure(), CoercionFailure::OutOfRange));
        assert_eq!(slot, 0);
    }

    #[test]
    fn mismatched_variant_is_reported() {
        let mut slot = String::new();
        let err = slot.assign(Value::Bool(true)).expect_err("mismatch");
        assert!(matches!(
            err.failure(),
            CoercionFailure::TypeMismatch { found: "bool" }
        ));
    }

    #[rstest]
    #[case(FieldType::scalar(ScalarKind::U32), "u32")]
    #[case(FieldType::optional(ScalarKind::Duration), "Option<Duration>")]
    #[case(FieldType::other("Url"), "Url")]
    fn field_type_display(#[case] ty: FieldType, #[case] expected: &str) {
        assert_eq!(ty.to_string(), expected);
    }
}
