//! Populator configuration.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of elements generated for list fields.
pub const DEFAULT_LIST_LEN: usize = 3;

/// Settings shared by every population call of a [`Populator`](crate::Populator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulatorConfig {
    /// Locale tag handed to rules through the context.
    pub locale: String,
    /// Master seed. Random unless set.
    pub seed: u64,
    /// Instant used for `now` and time defaults. Wall clock when unset.
    pub reference_time: Option<DateTime<Utc>>,
    /// Number of elements generated for list fields.
    pub list_len: usize,
    /// Validate every value produced by a named rule.
    pub validate_rules: bool,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        Self {
            locale: "en_US".to_string(),
            seed: rand::random(),
            reference_time: None,
            list_len: DEFAULT_LIST_LEN,
            validate_rules: false,
        }
    }
}

impl PopulatorConfig {
    /// Sets the locale tag.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the master seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pins the clock used for `now` and time defaults.
    #[must_use]
    pub const fn with_reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.reference_time = Some(at);
        self
    }

    /// Sets the generated length of list fields.
    #[must_use]
    pub const fn with_list_len(mut self, len: usize) -> Self {
        self.list_len = len;
        self
    }

    /// Enables validation of rule output.
    #[must_use]
    pub const fn with_rule_validation(mut self, enabled: bool) -> Self {
        self.validate_rules = enabled;
        self
    }

    /// Reads a config from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and [`Error::Config`] for
    /// an empty locale.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        if config.locale.trim().is_empty() {
            return Err(Error::Config("locale must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Instant used as "now" for one population call.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}
