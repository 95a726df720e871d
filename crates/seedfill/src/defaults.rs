//! Type-default generators for scalar fields.

use crate::schema::FieldType;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use seedfill_rules::{Context, Value};

const WORDS: [&str; 8] = ["hello", "world", "test", "sample", "data", "value", "string", "text"];

/// Default value for a scalar field type, or `None` for composite types.
///
/// Everything except floats is a pure function of the context index; floats
/// draw from the context's derived generator.
pub(crate) fn scalar_default(ty: &FieldType, ctx: &Context, now: DateTime<Utc>) -> Option<Value> {
    let index = ctx.index();
    let n = 100 + index % 900;

    // n < 1000, so only the 8-bit widths need folding
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let value = match ty {
        FieldType::Str => Value::from(WORDS[index % WORDS.len()]),
        FieldType::I8 => Value::I8((n % 128) as i8),
        FieldType::U8 => Value::U8((n % 256) as u8),
        FieldType::I16 => Value::I16(n as i16),
        FieldType::I32 => Value::I32(n as i32),
        FieldType::I64 => Value::I64(n as i64),
        FieldType::Isize => Value::Isize(n as isize),
        FieldType::U16 => Value::U16(n as u16),
        FieldType::U32 => Value::U32(n as u32),
        FieldType::U64 => Value::U64(n as u64),
        FieldType::Usize => Value::Usize(n),
        FieldType::F32 => Value::F32((ctx.rng().gen::<f64>() * 1000.0) as f32),
        FieldType::F64 => Value::F64(ctx.rng().gen::<f64>() * 1000.0),
        FieldType::Bool => Value::Bool(index % 2 == 0),
        FieldType::Time => {
            let days = i64::try_from(index % 365).unwrap_or_default();
            Value::Time(now.checked_sub_signed(Duration::days(days)).unwrap_or(now))
        }
        FieldType::Pointer(_) | FieldType::List(_) | FieldType::Record(_) => return None,
    };
    Some(value)
}
