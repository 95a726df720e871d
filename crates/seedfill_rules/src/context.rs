//! Generation context threaded through every rule call.
//!
//! A [`Context`] is never mutated. Each `with_*` call returns a new context
//! that shares the untouched parts of its parent, so deriving one per field
//! or per element is cheap.

use crate::value::{Record, Value};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use xxhash_rust::xxh64::xxh64;

/// Immutable bundle of generation parameters.
#[derive(Debug, Clone)]
pub struct Context {
    locale: Arc<str>,
    seed: u64,
    index: usize,
    record: Option<Arc<Record>>,
    field_name: Arc<str>,
}

impl Context {
    /// Creates a root context with no record and no current field.
    #[must_use]
    pub fn new(locale: &str, seed: u64, index: usize) -> Self {
        Self {
            locale: Arc::from(locale),
            seed,
            index,
            record: None,
            field_name: Arc::from(""),
        }
    }

    /// Locale tag, e.g. `en_US`.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Seed of the current population call.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Zero-based position of the element being populated.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Name of the field being populated; empty at record level.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Value a sibling field held when the owning record was entered.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.record.as_deref().and_then(|record| record.get(name))
    }

    /// Snapshot of the record being populated.
    pub fn record(&self) -> Option<&Record> {
        self.record.as_deref()
    }

    /// Derives a context for another element position.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    /// Derives a context for another field of the same record.
    #[must_use]
    pub fn with_field_name(&self, name: &str) -> Self {
        Self {
            field_name: Arc::from(name),
            ..self.clone()
        }
    }

    /// Derives a context scoped to `record`.
    ///
    /// The snapshot is taken now; later changes to the record are not seen
    /// through [`Context::field`].
    #[must_use]
    pub fn with_record(&self, record: Record) -> Self {
        Self {
            record: Some(Arc::new(record)),
            ..self.clone()
        }
    }

    /// Returns a generator derived from the seed, index and field name.
    ///
    /// Two contexts with the same triple always yield identical streams.
    pub fn rng(&self) -> ChaCha8Rng {
        let stream = xxh64(self.field_name.as_bytes(), self.seed);
        ChaCha8Rng::seed_from_u64(stream.wrapping_add(self.index as u64))
    }
}
