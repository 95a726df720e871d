//! Runtime type description of populatable records.
//!
//! Rust has no reflection, so every field type reports its shape through
//! [`FieldValue`] and every record through [`Fillable`]. The
//! [`fillable!`](crate::fillable) macro writes both for a struct.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use seedfill_rules::{Record, Value};
use std::fmt;

/// Declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// `String`.
    Str,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `isize`.
    Isize,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `usize`.
    Usize,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// `bool`.
    Bool,
    /// `DateTime<Utc>`.
    Time,
    /// `Option<T>`, the pointer-like optional slot.
    Pointer(Box<Self>),
    /// `Vec<T>`.
    List(Box<Self>),
    /// A nested [`Fillable`] record.
    Record(RecordType),
}

impl FieldType {
    /// Returns true for any signed or unsigned integer width.
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::Usize
        )
    }

    /// Returns true for either float width.
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("String"),
            Self::I8 => f.write_str("i8"),
            Self::I16 => f.write_str("i16"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::Isize => f.write_str("isize"),
            Self::U8 => f.write_str("u8"),
            Self::U16 => f.write_str("u16"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::Usize => f.write_str("usize"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Bool => f.write_str("bool"),
            Self::Time => f.write_str("DateTime<Utc>"),
            Self::Pointer(inner) => write!(f, "Option<{inner}>"),
            Self::List(inner) => write!(f, "Vec<{inner}>"),
            Self::Record(record) => f.write_str(record.name()),
        }
    }
}

/// Shape of a record type: its name, fields and zero value.
///
/// Field descriptors are produced lazily so self-referential records can be
/// described without recursing forever.
#[derive(Debug, Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    fields: fn() -> Vec<FieldDef>,
    zero: fn() -> Record,
}

impl RecordType {
    /// Creates a record description.
    pub const fn new(name: &'static str, fields: fn() -> Vec<FieldDef>, zero: fn() -> Record) -> Self {
        Self { name, fields, zero }
    }

    /// Record type name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field descriptors in declared order.
    pub fn fields(&self) -> Vec<FieldDef> {
        (self.fields)()
    }

    /// Snapshot of a default-valued instance.
    pub fn zero(&self) -> Record {
        (self.zero)()
    }
}

/// Descriptor of one record field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as written in the struct.
    pub name: &'static str,
    /// Declared type.
    pub ty: FieldType,
    /// Raw directive string, if the field carries one.
    pub directive: Option<&'static str>,
}

impl FieldDef {
    /// Creates a field descriptor.
    pub const fn new(name: &'static str, ty: FieldType, directive: Option<&'static str>) -> Self {
        Self {
            name,
            ty,
            directive,
        }
    }
}

/// A Rust type that can live in a populatable field.
pub trait FieldValue: Sized {
    /// Declared type of fields holding `Self`.
    fn field_type() -> FieldType;

    /// Snapshot of the current value.
    fn to_value(&self) -> Value;

    /// Rebuilds `Self` from a value already coerced to [`Self::field_type`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` has another shape.
    fn from_value(value: Value) -> Result<Self>;
}

/// A record whose fields the engine can walk and assign.
pub trait Fillable: FieldValue + Default {
    /// Shape of this record type.
    fn record_type() -> RecordType;

    /// Snapshot of every field in declared order.
    fn snapshot(&self) -> Record;

    /// Assigns `value` to the field called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for undeclared names and
    /// [`Error::TypeMismatch`] for values of the wrong shape.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;
}

pub(crate) fn mismatch(expected: &FieldType, actual: &Value) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name(),
    }
}

macro_rules! scalar_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn field_type() -> FieldType {
                    FieldType::$variant
                }

                #[allow(clippy::clone_on_copy)]
                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(mismatch(&FieldType::$variant, &other)),
                    }
                }
            }
        )*
    };
}

scalar_field! {
    String => Str,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    DateTime<Utc> => Time,
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Pointer(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        self.as_ref()
            .map_or(Value::Null, |inner| Value::Pointer(Box::new(inner.to_value())))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Pointer(inner) => T::from_value(*inner).map(Some),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_rust_spelling() {
        assert_eq!(<Option<Vec<u16>>>::field_type().to_string(), "Option<Vec<u16>>");
        assert_eq!(<DateTime<Utc>>::field_type().to_string(), "DateTime<Utc>");
        assert!(i8::field_type().is_integer());
        assert!(f32::field_type().is_float());
        assert!(!String::field_type().is_integer());
    }

    #[test]
    fn option_round_trips_through_pointer() {
        let value = Some(5_i32).to_value();
        assert_eq!(value, Value::Pointer(Box::new(Value::I32(5))));
        assert_eq!(Option::<i32>::from_value(value).unwrap(), Some(5));
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn from_value_rejects_other_shapes() {
        let err = i64::from_value(Value::from("12")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(err.to_string(), "type mismatch: cannot assign String to i64");

        let err = Vec::<u8>::from_value(Value::List(vec![Value::U8(1), Value::I8(2)])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
