//! Conversion of raw source strings into typed field values.
//!
//! [`coerce`] dispatches on a field's declared [`FieldType`] and returns the
//! [`Value`] to assign. The engine is pure: it never logs and never touches
//! the target field, so callers decide what to do with a failure.

mod integer;

use std::time::Duration;

use thiserror::Error;

use crate::value::{FieldType, ScalarKind, Value};

use integer::{parse_signed, parse_unsigned};

/// Reason a raw string could not be converted.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum CoercionFailure {
    /// The string is not an integer literal.
    #[error("invalid integer syntax")]
    InvalidInteger,
    /// The integer does not fit the target width.
    #[error("value out of range")]
    OutOfRange,
    /// A negative literal was supplied for an unsigned field.
    #[error("negative value for unsigned field")]
    Negative,
    /// The string is not a recognised boolean literal.
    #[error("invalid boolean syntax")]
    InvalidBool,
    /// The string is not a float literal.
    #[error("invalid float syntax")]
    InvalidFloat,
    /// Neither a duration literal nor a nanosecond count.
    #[error("invalid duration: {message} (also not a nanosecond count)")]
    InvalidDuration {
        /// Description from the duration literal parser.
        message: String,
    },
    /// The field's type is not supported.
    #[error("unsupported field type")]
    Unsupported,
    /// A value of the wrong variant reached the field.
    #[error("expected a value for this field, found {found}")]
    TypeMismatch {
        /// Variant that was supplied.
        found: &'static str,
    },
}

/// Failure converting `raw` into `kind`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot convert '{raw}' to {kind}: {failure}")]
pub struct CoercionError {
    kind: ScalarKind,
    raw: String,
    failure: CoercionFailure,
}

impl CoercionError {
    /// Creates an error for `raw` targeting `kind`.
    #[must_use]
    pub fn new(kind: ScalarKind, raw: impl Into<String>, failure: CoercionFailure) -> Self {
        Self {
            kind,
            raw: raw.into(),
            failure,
        }
    }

    /// Target scalar kind.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// The raw input that failed.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Why the conversion failed.
    #[must_use]
    pub const fn failure(&self) -> &CoercionFailure {
        &self.failure
    }
}

/// Converts `raw` into a value for a field declared as `field_type`.
///
/// `Option<T>` fields coerce as `T`; allocation happens when the value is
/// assigned.
///
/// # Errors
///
/// Returns a [`CoercionError`] when `raw` is malformed, out of range for the
/// field's width, or the field type is unsupported.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tiered_config::{FieldType, ScalarKind, Value, coerce};
///
/// let port = coerce(FieldType::scalar(ScalarKind::U16), "0x1F90").unwrap();
/// assert_eq!(port, Value::Unsigned(8080));
///
/// let timeout = coerce(FieldType::optional(ScalarKind::Duration), "5s").unwrap();
/// assert_eq!(timeout, Value::Duration(Duration::from_secs(5)));
/// ```
pub fn coerce(field_type: FieldType, raw: &str) -> Result<Value, CoercionError> {
    let kind = field_type.scalar_kind();
    coerce_scalar(kind, raw).map_err(|failure| CoercionError::new(kind, raw, failure))
}

fn coerce_scalar(kind: ScalarKind, raw: &str) -> Result<Value, CoercionFailure> {
    match kind {
        ScalarKind::String => Ok(Value::String(raw.to_owned())),
        ScalarKind::I8 => signed_in_range(raw, i8::MIN.into(), i8::MAX.into()),
        ScalarKind::I16 => signed_in_range(raw, i16::MIN.into(), i16::MAX.into()),
        ScalarKind::I32 => signed_in_range(raw, i32::MIN.into(), i32::MAX.into()),
        ScalarKind::I64 => signed_in_range(raw, i64::MIN, i64::MAX),
        ScalarKind::Isize => {
            signed_in_range(raw, isize_bound(isize::MIN), isize_bound(isize::MAX))
        }
        ScalarKind::U8 => unsigned_in_range(raw, u8::MAX.into()),
        ScalarKind::U16 => unsigned_in_range(raw, u16::MAX.into()),
        ScalarKind::U32 => unsigned_in_range(raw, u32::MAX.into()),
        ScalarKind::U64 => unsigned_in_range(raw, u64::MAX),
        ScalarKind::Usize => unsigned_in_range(raw, usize_bound()),
        ScalarKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or(CoercionFailure::InvalidBool),
        ScalarKind::F32 => raw
            .trim()
            .parse::<f32>()
            .map(|x| Value::Float(f64::from(x)))
            .map_err(|_| CoercionFailure::InvalidFloat),
        ScalarKind::F64 => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CoercionFailure::InvalidFloat),
        ScalarKind::Duration => parse_duration(raw).map(Value::Duration),
        ScalarKind::Other(_) => Err(CoercionFailure::Unsupported),
    }
}

fn signed_in_range(raw: &str, min: i64, max: i64) -> Result<Value, CoercionFailure> {
    let n = parse_signed(raw)?;
    if n < min || n > max {
        return Err(CoercionFailure::OutOfRange);
    }
    Ok(Value::Signed(n))
}

fn unsigned_in_range(raw: &str, max: u64) -> Result<Value, CoercionFailure> {
    let n = parse_unsigned(raw)?;
    if n > max {
        return Err(CoercionFailure::OutOfRange);
    }
    Ok(Value::Unsigned(n))
}

fn isize_bound(bound: isize) -> i64 {
    i64::try_from(bound).unwrap_or(if bound < 0 { i64::MIN } else { i64::MAX })
}

fn usize_bound() -> u64 {
    u64::try_from(usize::MAX).unwrap_or(u64::MAX)
}

/// Parses the boolean literals accepted on the command line and in the
/// environment.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a duration literal such as `5s` or `1h 30m`, falling back to a
/// plain count of nanoseconds.
pub(crate) fn parse_duration(raw: &str) -> Result<Duration, CoercionFailure> {
    let trimmed = raw.trim();
    match humantime::parse_duration(trimmed) {
        Ok(duration) => Ok(duration),
        Err(literal_err) => trimmed
            .parse::<u64>()
            .map(Duration::from_nanos)
            .map_err(|_| CoercionFailure::InvalidDuration {
                message: literal_err.to_string(),
            }),
    }
}

/// Formats a duration so that [`parse_duration`] reads it back unchanged.
pub(crate) fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}
