//! Type-safe coercion of produced values into declared field types.
//!
//! Accepted conversions:
//! - exact type matches
//! - `Option<T>` destinations from a pointer value or a bare `T`-compatible value
//! - integer to any integer width, if the value fits
//! - integer to float, and float to float
//! - lists element-wise, records by matching type name
//!
//! Everything else is a type mismatch. Integer and string values never
//! convert into one another.

use crate::error::{Error, Result};
use crate::schema::{mismatch, FieldType};
use seedfill_rules::Value;

/// Converts `value` into the shape declared by `target`.
///
/// [`Value::Null`] passes through unchanged for pointer destinations and is
/// otherwise the caller's business (it means "leave the field alone").
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] for disallowed conversions and
/// [`Error::OutOfRange`] for integers that do not fit the destination width.
pub fn coerce(value: Value, target: &FieldType) -> Result<Value> {
    match target {
        FieldType::Pointer(inner) => match value {
            Value::Null => Ok(Value::Null),
            Value::Pointer(pointee) => coerce_pointee(*pointee, inner),
            other => coerce_pointee(other, inner),
        },
        // No conversion between strings and integers in either direction.
        FieldType::Str => match value {
            Value::Str(_) => Ok(value),
            other => Err(mismatch(target, &other)),
        },
        t if t.is_integer() => {
            if value.is_integer() {
                coerce_integer(&value, target)
            } else {
                Err(mismatch(target, &value))
            }
        }
        FieldType::F32 => match value {
            Value::F32(_) => Ok(value),
            #[allow(clippy::cast_possible_truncation)]
            Value::F64(n) => Ok(Value::F32(n as f32)),
            other => integer_to_float(&other, target),
        },
        FieldType::F64 => match value {
            Value::F64(_) => Ok(value),
            Value::F32(n) => Ok(Value::F64(f64::from(n))),
            other => integer_to_float(&other, target),
        },
        FieldType::Bool => match value {
            Value::Bool(_) => Ok(value),
            other => Err(mismatch(target, &other)),
        },
        FieldType::Time => match value {
            Value::Time(_) => Ok(value),
            other => Err(mismatch(target, &other)),
        },
        FieldType::List(element) => match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| coerce(item, element))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(mismatch(target, &other)),
        },
        FieldType::Record(record) => match value {
            Value::Record(ref r) if r.type_name() == record.name() => Ok(value),
            other => Err(mismatch(target, &other)),
        },
        _ => Err(mismatch(target, &value)),
    }
}

fn coerce_pointee(value: Value, inner: &FieldType) -> Result<Value> {
    coerce(value, inner).map(|v| Value::Pointer(Box::new(v)))
}

fn out_of_range(value: &Value, target: &FieldType) -> Error {
    Error::OutOfRange {
        value: value.to_string(),
        target: target.to_string(),
    }
}

fn coerce_integer(value: &Value, target: &FieldType) -> Result<Value> {
    let n = value
        .as_i128()
        .ok_or_else(|| mismatch(target, value))?;
    let converted = match target {
        FieldType::I8 => i8::try_from(n).map(Value::I8).ok(),
        FieldType::I16 => i16::try_from(n).map(Value::I16).ok(),
        FieldType::I32 => i32::try_from(n).map(Value::I32).ok(),
        FieldType::I64 => i64::try_from(n).map(Value::I64).ok(),
        FieldType::Isize => isize::try_from(n).map(Value::Isize).ok(),
        FieldType::U8 => u8::try_from(n).map(Value::U8).ok(),
        FieldType::U16 => u16::try_from(n).map(Value::U16).ok(),
        FieldType::U32 => u32::try_from(n).map(Value::U32).ok(),
        FieldType::U64 => u64::try_from(n).map(Value::U64).ok(),
        FieldType::Usize => usize::try_from(n).map(Value::Usize).ok(),
        _ => return Err(mismatch(target, value)),
    };
    converted.ok_or_else(|| out_of_range(value, target))
}

#[allow(clippy::cast_precision_loss)]
fn integer_to_float(value: &Value, target: &FieldType) -> Result<Value> {
    let n = value
        .as_i128()
        .ok_or_else(|| mismatch(target, value))?;
    match target {
        FieldType::F32 => Ok(Value::F32(n as f32)),
        FieldType::F64 => Ok(Value::F64(n as f64)),
        _ => Err(mismatch(target, value)),
    }
}
