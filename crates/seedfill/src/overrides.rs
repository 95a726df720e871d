//! Per-field overrides and sequence helpers.
//!
//! Overrides come in layers: instance defaults set on a
//! [`Populator`](crate::Populator), then the overrides passed at each call.
//! Later layers win.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use seedfill_rules::{cycle_in_range, Record, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function from element index to the value for that element.
pub type SequenceFn = Arc<dyn Fn(usize) -> Value + Send + Sync>;

/// Value supplied for a field instead of generating one.
#[derive(Clone)]
pub enum OverrideValue {
    /// The same value for every element.
    Literal(Value),
    /// A value computed from the element index.
    Sequence(SequenceFn),
}

impl OverrideValue {
    /// Wraps a closure as a sequence override.
    pub fn sequence<F>(f: F) -> Self
    where
        F: Fn(usize) -> Value + Send + Sync + 'static,
    {
        Self::Sequence(Arc::new(f))
    }

    /// Produces the value for the element at `index`.
    pub fn resolve(&self, index: usize) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Sequence(f) => f(index),
        }
    }
}

impl fmt::Debug for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Sequence(_) => f.write_str("Sequence(..)"),
        }
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OverrideValue {
                fn from(value: $ty) -> Self {
                    Self::Literal(value.into())
                }
            }
        )*
    };
}

literal_from! {
    Value, Record, String, &str, bool, DateTime<Utc>,
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
}

impl<T: Into<Value>> From<Option<T>> for OverrideValue {
    fn from(value: Option<T>) -> Self {
        Self::Literal(value.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for OverrideValue {
    fn from(value: Vec<T>) -> Self {
        Self::Literal(value.into())
    }
}

/// Formats `pattern` with the element index in place of `{index}`.
///
/// ```rust
/// let name = seedfill::seq("user-{index}");
/// assert_eq!(name.resolve(4), seedfill::Value::from("user-4"));
/// ```
pub fn seq(pattern: impl Into<String>) -> OverrideValue {
    let pattern: String = pattern.into();
    OverrideValue::sequence(move |index| Value::from(pattern.replace("{index}", &index.to_string())))
}

/// Counts up from `start`, one per element.
pub fn seq_int(start: i64) -> OverrideValue {
    OverrideValue::sequence(move |index| {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        Value::I64(start.saturating_add(offset))
    })
}

/// Cycles through the inclusive range `[min, max]` by element index.
/// Reversed bounds are swapped.
pub fn cycle(min: i64, max: i64) -> OverrideValue {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    OverrideValue::sequence(move |index| {
        cycle_in_range(min, max, index).map_or(Value::Null, Value::I64)
    })
}

/// Field name to override value map.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: HashMap<String, OverrideValue>,
}

impl Overrides {
    /// Creates an empty override map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the override for `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<OverrideValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Adds or replaces the override for `field` in place.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<OverrideValue>) {
        self.entries.insert(field.into(), value.into());
    }

    /// Override registered for `field`.
    pub fn get(&self, field: &str) -> Option<&OverrideValue> {
        self.entries.get(field)
    }

    /// Number of overridden fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combines layers into one map. Entries of later layers replace those
    /// of earlier ones.
    pub fn merge<'a>(layers: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::new();
        for layer in layers {
            for (field, value) in &layer.entries {
                merged.entries.insert(field.clone(), value.clone());
            }
        }
        merged
    }

    /// Parses literal overrides from a JSON object.
    ///
    /// ```rust
    /// use seedfill::{Overrides, Value};
    ///
    /// let overrides = Overrides::from_json(r#"{"age": 30, "nickname": null}"#).unwrap();
    /// assert_eq!(overrides.get("age").unwrap().resolve(0), Value::I64(30));
    /// assert_eq!(overrides.get("nickname").unwrap().resolve(0), Value::Null);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and [`Error::Config`] if
    /// the document is not an object or holds nested objects.
    pub fn from_json(input: &str) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(input)?;
        let serde_json::Value::Object(fields) = document else {
            return Err(Error::Config("overrides must be a JSON object".to_string()));
        };

        let mut overrides = Self::new();
        for (field, value) in fields {
            let value = json_to_value(value).map_err(|e| e.in_field(&field))?;
            overrides.set(field, OverrideValue::Literal(value));
        }
        Ok(overrides)
    }
}

fn json_to_value(json: serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::I64(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::U64(u))
            } else {
                n.as_f64()
                    .map(Value::F64)
                    .ok_or_else(|| Error::Config(format!("unsupported number {n}")))
            }
        }
        Json::String(s) => Ok(Value::Str(s)),
        Json::Array(items) => items
            .into_iter()
            .map(json_to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Json::Object(_) => Err(Error::Config(
            "nested objects are not supported as overrides".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_resolves_unchanged() {
        let value = OverrideValue::from("fixed");
        assert_eq!(value.resolve(0), Value::from("fixed"));
        assert_eq!(value.resolve(99), Value::from("fixed"));
    }

    #[test]
    fn sequence_helpers() {
        assert_eq!(seq("user{index}@x.io").resolve(2), Value::from("user2@x.io"));
        assert_eq!(seq("no placeholder").resolve(2), Value::from("no placeholder"));
        assert_eq!(seq_int(1000).resolve(5), Value::I64(1005));
        assert_eq!(cycle(1, 3).resolve(4), Value::I64(2));
        assert_eq!(cycle(3, 1).resolve(0), Value::I64(1));
    }

    #[test]
    fn later_layers_win() {
        let defaults = Overrides::new().with("status", "draft").with("owner", "ops");
        let call = Overrides::new().with("status", "published");

        let merged = Overrides::merge([&defaults, &call]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("status").unwrap().resolve(0), Value::from("published"));
        assert_eq!(merged.get("owner").unwrap().resolve(0), Value::from("ops"));
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(Overrides::merge([]).is_empty());
    }

    #[test]
    fn json_scalars_and_lists() {
        let overrides =
            Overrides::from_json(r#"{"n": -3, "big": 18446744073709551615, "f": 1.5, "tags": ["a", "b"], "on": true}"#)
                .unwrap();

        assert_eq!(overrides.get("n").unwrap().resolve(0), Value::I64(-3));
        assert_eq!(overrides.get("big").unwrap().resolve(0), Value::U64(u64::MAX));
        assert_eq!(overrides.get("f").unwrap().resolve(0), Value::F64(1.5));
        assert_eq!(
            overrides.get("tags").unwrap().resolve(0),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(overrides.get("on").unwrap().resolve(0), Value::Bool(true));
    }

    #[test]
    fn json_rejects_non_objects_and_nesting() {
        assert!(matches!(Overrides::from_json("[1, 2]"), Err(Error::Config(_))));
        assert!(matches!(Overrides::from_json("{not json"), Err(Error::Json(_))));

        let err = Overrides::from_json(r#"{"address": {"city": "x"}}"#).unwrap_err();
        assert!(matches!(err, Error::Field { .. }));
        assert!(matches!(err.root(), Error::Config(_)));
    }

    proptest! {
        #[test]
        fn cycle_stays_in_bounds(min in -500i64..500, width in 0i64..100, index in 0usize..100_000) {
            let max = min + width;
            let Value::I64(n) = cycle(min, max).resolve(index) else {
                panic!("expected i64");
            };
            prop_assert!((min..=max).contains(&n));
        }

        #[test]
        fn seq_int_is_linear(start in -1_000_000i64..1_000_000, index in 0usize..1_000_000) {
            prop_assert_eq!(seq_int(start).resolve(index), Value::I64(start + i64::try_from(index).unwrap()));
        }
    }
}
