//! Value representations for report cells.
//!
//! A column extractor turns one input row into a [`ReportValue`]. The
//! formatting layer only needs to tell a handful of kinds apart, so the
//! value model is a closed enum plus an [`OpaqueValue`] escape hatch for
//! anything else (enums, newtypes, domain structs).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A user-defined value that is not one of the built-in variants.
///
/// Implemented for every `'static` type that is `Display + Debug + Send + Sync`.
/// The `Display` output is the default textual representation unless a
/// custom formatter is registered for the concrete type.
pub trait OpaqueValue: Any + fmt::Display + fmt::Debug + Send + Sync {
    /// Upcast for downcasting and type identification.
    fn as_any(&self) -> &dyn Any;
}

/// The blanket impl also covers `Arc<dyn OpaqueValue>` itself, so calling
/// `as_any` on an `Arc` reports the `Arc`. Dereference to the trait object
/// first (`(*arc).as_any()`) to reach the wrapped value.
impl<T> OpaqueValue for T
where
    T: Any + fmt::Display + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A typed cell value produced by a column extractor.
#[derive(Debug, Clone)]
pub enum ReportValue {
    /// Absent value; renders as an empty field.
    Null,

    /// Text, emitted verbatim.
    Text(String),

    /// Exact decimal number.
    Decimal(Decimal),

    /// Calendar date without a time component.
    Date(NaiveDate),

    /// Wall-clock date-time without an associated zone.
    DateTime(NaiveDateTime),

    /// Signed integer. Interpreted as an epoch timestamp when the column
    /// carries an epoch [`crate::ColumnType`].
    Integer(i64),

    /// Binary floating point number.
    Float(f64),

    /// Boolean value.
    Bool(bool),

    /// Any other value, formatted through its `Display` impl by default.
    Opaque(Arc<dyn OpaqueValue>),
}

/// Concrete runtime kind of a [`ReportValue`].
///
/// Custom formatters are registered per kind. Opaque values are keyed by the
/// `TypeId` of the wrapped type, so two different user types never share a
/// formatter by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Decimal,
    Date,
    DateTime,
    Integer,
    Float,
    Bool,
    Opaque(TypeId),
}

impl ValueKind {
    /// Kind of an opaque value wrapping `T`.
    pub fn opaque<T: Any>() -> Self {
        ValueKind::Opaque(TypeId::of::<T>())
    }
}

impl ReportValue {
    /// Wrap a user type as an opaque value.
    pub fn opaque<V: OpaqueValue>(value: V) -> Self {
        Self::Opaque(Arc::new(value))
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The concrete kind of this value, or `None` for null.
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Self::Null => return None,
            Self::Text(_) => ValueKind::Text,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Opaque(v) => ValueKind::Opaque(Any::type_id((**v).as_any())),
        };
        Some(kind)
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a decimal.
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get this value as a date.
    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get this value as a wall-clock date-time.
    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Downcast an opaque value to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(v) => (**v).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for ReportValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // Opaque values have no equality of their own.
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ReportValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Decimal> for ReportValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDate> for ReportValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for ReportValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ReportValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for ReportValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ReportValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ReportValue>> From<Option<T>> for ReportValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
