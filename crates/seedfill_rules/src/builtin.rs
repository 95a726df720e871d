//! Built-in rules.
//!
//! Index-driven rules (`email`, `url`, range, one-of, sequence) pick their
//! output from the context index alone. Rules that need randomness draw from
//! [`Context::rng`], so they are reproducible for a fixed seed and index.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::rule::{Rule, RuleSet};
use crate::value::Value;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

const EMAIL_PREFIXES: [&str; 5] = ["user", "test", "demo", "sample", "hello"];
const EMAIL_DOMAINS: [&str; 4] = ["example.com", "test.com", "mail.com", "email.com"];
const URL_DOMAINS: [&str; 4] = ["example.com", "test.com", "demo.org", "sample.net"];
const URL_PATHS: [&str; 6] = ["/", "/home", "/about", "/contact", "/products", "/services"];
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

fn pick<T: Copy>(items: &[T], index: usize) -> T {
    items[index % items.len()]
}

fn expect_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| Error::UnexpectedType {
        expected: "String",
        actual: value.type_name(),
    })
}

fn expect_integer(value: &Value) -> Result<i128> {
    value.as_i128().ok_or_else(|| Error::UnexpectedType {
        expected: "integer",
        actual: value.type_name(),
    })
}

/// Maps `index` onto the inclusive range `[min, max]` by modulo.
///
/// Returns `None` when `min > max`.
pub fn cycle_in_range(min: i64, max: i64, index: usize) -> Option<i64> {
    if min > max {
        return None;
    }
    let span = i128::from(max) - i128::from(min) + 1;
    let offset = i128::try_from(index).unwrap_or(i128::MAX) % span;
    i64::try_from(i128::from(min) + offset).ok()
}

/// Generates `{prefix}{index}@{domain}` addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailRule;

impl Rule for EmailRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        let index = ctx.index();
        let prefix = pick(&EMAIL_PREFIXES, index);
        let domain = pick(&EMAIL_DOMAINS, index);
        Ok(Value::from(format!("{prefix}{index}@{domain}")))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let s = expect_str(value)?;
        if EMAIL_RE.is_match(s) {
            Ok(())
        } else {
            Err(Error::Invalid(format!("invalid email format: {s}")))
        }
    }
}

/// Generates `{scheme}://{domain}{path}` URLs.
#[derive(Debug, Clone)]
pub struct UrlRule {
    scheme: String,
}

impl Default for UrlRule {
    fn default() -> Self {
        Self::with_scheme("https")
    }
}

impl UrlRule {
    /// URLs with the `https` scheme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs with a custom scheme.
    #[must_use]
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }
}

impl Rule for UrlRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        let domain = pick(&URL_DOMAINS, ctx.index());
        let path = pick(&URL_PATHS, ctx.index());
        Ok(Value::from(format!("{}://{domain}{path}", self.scheme)))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let s = expect_str(value)?;
        url::Url::parse(s)
            .map(|_| ())
            .map_err(|e| Error::Invalid(format!("invalid URL: {e}")))
    }
}

/// Generates version 4 UUID strings from the context generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRule;

impl Rule for UuidRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        let mut bytes = [0u8; 16];
        ctx.rng().fill(&mut bytes);

        // Version 4, RFC 4122 variant
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        Ok(Value::from(Uuid::from_bytes(bytes).to_string()))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let s = expect_str(value)?;
        Uuid::parse_str(s)
            .map(|_| ())
            .map_err(|e| Error::Invalid(format!("invalid UUID: {e}")))
    }
}

/// Cycles through an inclusive integer range by index.
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    min: i64,
    max: i64,
}

impl RangeRule {
    /// Creates a range rule. Reversed bounds are swapped.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }
}

impl Rule for RangeRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        cycle_in_range(self.min, self.max, ctx.index())
            .map(Value::I64)
            .ok_or_else(|| Error::Config(format!("empty range [{}, {}]", self.min, self.max)))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let n = expect_integer(value)?;
        if (i128::from(self.min)..=i128::from(self.max)).contains(&n) {
            Ok(())
        } else {
            Err(Error::Invalid(format!(
                "value {n} is outside range [{}, {}]",
                self.min, self.max
            )))
        }
    }
}

/// Selects one of a fixed list of options by index.
#[derive(Debug, Clone)]
pub struct OneOfRule {
    options: Vec<Value>,
}

impl OneOfRule {
    /// Creates a rule over `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `options` is empty.
    pub fn new<I, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let options: Vec<Value> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(Error::Config("one-of rule requires at least one option".to_string()));
        }
        Ok(Self { options })
    }
}

impl Rule for OneOfRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        Ok(self.options[ctx.index() % self.options.len()].clone())
    }

    fn validate(&self, value: &Value) -> Result<()> {
        if self.options.contains(value) {
            Ok(())
        } else {
            Err(Error::Invalid(format!(
                "value {value} is not one of the allowed options"
            )))
        }
    }
}

/// Generates `start + index` as `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRule {
    start: i64,
}

impl SequenceRule {
    /// Creates a sequence starting at `start`.
    #[must_use]
    pub const fn new(start: i64) -> Self {
        Self { start }
    }
}

impl Rule for SequenceRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        let offset = i64::try_from(ctx.index()).unwrap_or(i64::MAX);
        Ok(Value::I64(self.start.saturating_add(offset)))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        expect_integer(value).map(|_| ())
    }
}

/// Generates fixed-length `[a-zA-Z0-9]` strings.
#[derive(Debug, Clone, Copy)]
pub struct AlphaNumericRule {
    length: usize,
}

impl AlphaNumericRule {
    /// Creates a rule producing strings of `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `length` is zero.
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(Error::Config("alphanumeric length must be positive".to_string()));
        }
        Ok(Self { length })
    }
}

impl Rule for AlphaNumericRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        let mut rng = ctx.rng();
        let s: String = (0..self.length)
            .map(|_| char::from(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]))
            .collect();
        Ok(Value::from(s))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        let s = expect_str(value)?;
        if s.len() != self.length {
            return Err(Error::Invalid(format!(
                "expected length {}, got {}",
                self.length,
                s.len()
            )));
        }
        match s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            Some(c) => Err(Error::Invalid(format!(
                "invalid character {c:?} in alphanumeric string"
            ))),
            None => Ok(()),
        }
    }
}

/// Generates booleans that are `true` with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct BoolRule {
    true_ratio: f64,
}

impl BoolRule {
    /// Creates a rule yielding `true` with probability `true_ratio`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `true_ratio` is within `[0.0, 1.0]`.
    pub fn new(true_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&true_ratio) {
            return Err(Error::Config(format!(
                "true ratio must be between 0.0 and 1.0, got {true_ratio}"
            )));
        }
        Ok(Self { true_ratio })
    }
}

impl Rule for BoolRule {
    fn generate(&self, ctx: &Context) -> Result<Value> {
        Ok(Value::Bool(ctx.rng().gen::<f64>() < self.true_ratio))
    }

    fn validate(&self, value: &Value) -> Result<()> {
        match value {
            Value::Bool(_) => Ok(()),
            other => Err(Error::UnexpectedType {
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }
}

impl RuleSet {
    /// Creates a rule set holding the built-in rules:
    /// `email`, `url`, `uuid`, `alphanumeric` (10 characters) and `bool`
    /// (even odds).
    #[must_use]
    pub fn with_builtins() -> Self {
        let set = Self::new();
        set.add("email", EmailRule)
            .add("url", UrlRule::new())
            .add("uuid", UuidRule)
            .add("alphanumeric", AlphaNumericRule { length: 10 })
            .add("bool", BoolRule { true_ratio: 0.5 });
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(index: usize) -> Context {
        Context::new("en_US", 12345, index)
    }

    #[test]
    fn email_follows_index() {
        let value = EmailRule.generate(&ctx(0)).unwrap();
        assert_eq!(value, Value::from("user0@example.com"));
        let value = EmailRule.generate(&ctx(6)).unwrap();
        assert_eq!(value, Value::from("test6@mail.com"));
    }

    #[test]
    fn email_validation() {
        assert!(EmailRule.validate(&Value::from("a.b@example.org")).is_ok());
        assert!(matches!(
            EmailRule.validate(&Value::from("not-an-email")),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            EmailRule.validate(&Value::I32(1)),
            Err(Error::UnexpectedType { expected: "String", .. })
        ));
    }

    #[test]
    fn url_uses_scheme() {
        let value = UrlRule::new().generate(&ctx(1)).unwrap();
        assert_eq!(value, Value::from("https://test.com/home"));

        let ftp = UrlRule::with_scheme("ftp").generate(&ctx(0)).unwrap();
        assert_eq!(ftp, Value::from("ftp://example.com/"));
        assert!(UrlRule::new().validate(&ftp).is_ok());
        assert!(UrlRule::new().validate(&Value::from("::nope")).is_err());
    }

    #[test]
    fn uuid_is_v4_and_reproducible() {
        let first = UuidRule.generate(&ctx(3)).unwrap();
        let again = UuidRule.generate(&ctx(3)).unwrap();
        let next = UuidRule.generate(&ctx(4)).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, next);
        assert!(UuidRule.validate(&first).is_ok());

        let parsed = Uuid::parse_str(first.as_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn range_swaps_reversed_bounds() {
        let rule = RangeRule::new(10, 1);
        assert_eq!(rule.generate(&ctx(0)).unwrap(), Value::I64(1));
        assert_eq!(rule.generate(&ctx(10)).unwrap(), Value::I64(1));
        assert!(rule.validate(&Value::U8(10)).is_ok());
        assert!(rule.validate(&Value::I64(11)).is_err());
        assert!(rule.validate(&Value::from("5")).is_err());
    }

    #[test]
    fn range_with_equal_bounds_is_constant() {
        let rule = RangeRule::new(7, 7);
        for index in 0..20 {
            assert_eq!(rule.generate(&ctx(index)).unwrap(), Value::I64(7));
        }
    }

    #[test]
    fn cycle_handles_extreme_bounds() {
        assert_eq!(cycle_in_range(i64::MIN, i64::MAX, 3), Some(i64::MIN + 3));
        assert_eq!(cycle_in_range(5, 4, 0), None);
    }

    #[test]
    fn one_of_cycles_and_validates() {
        let rule = OneOfRule::new(["red", "green"]).unwrap();
        assert_eq!(rule.generate(&ctx(0)).unwrap(), Value::from("red"));
        assert_eq!(rule.generate(&ctx(3)).unwrap(), Value::from("green"));
        assert!(rule.validate(&Value::from("green")).is_ok());
        assert!(rule.validate(&Value::from("blue")).is_err());
    }

    #[test]
    fn one_of_rejects_empty_options() {
        let result = OneOfRule::new(Vec::<Value>::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn sequence_offsets_start() {
        let rule = SequenceRule::new(100);
        assert_eq!(rule.generate(&ctx(0)).unwrap(), Value::I64(100));
        assert_eq!(rule.generate(&ctx(5)).unwrap(), Value::I64(105));
        assert!(rule.validate(&Value::I16(3)).is_ok());
        assert!(rule.validate(&Value::F64(3.0)).is_err());
    }

    #[test]
    fn alphanumeric_has_requested_shape() {
        let rule = AlphaNumericRule::new(12).unwrap();
        let value = rule.generate(&ctx(2)).unwrap();
        assert_eq!(value.as_str().unwrap().len(), 12);
        assert!(rule.validate(&value).is_ok());
        assert!(rule.validate(&Value::from("short")).is_err());
        assert!(rule.validate(&Value::from("abc-def-ghij")).is_err());
        assert!(AlphaNumericRule::new(0).is_err());
    }

    #[test]
    fn bool_ratio_extremes() {
        let always = BoolRule::new(1.0).unwrap();
        let never = BoolRule::new(0.0).unwrap();
        for index in 0..20 {
            assert_eq!(always.generate(&ctx(index)).unwrap(), Value::Bool(true));
            assert_eq!(never.generate(&ctx(index)).unwrap(), Value::Bool(false));
        }
        assert!(BoolRule::new(1.5).is_err());
        assert!(BoolRule::new(-0.1).is_err());
        assert!(always.validate(&Value::from("true")).is_err());
    }

    #[test]
    fn builtin_set_contents() {
        let set = RuleSet::with_builtins();
        assert_eq!(
            set.names(),
            vec!["alphanumeric", "bool", "email", "url", "uuid"]
        );
    }

    proptest! {
        #[test]
        fn range_stays_within_bounds(min in -1000i64..1000, width in 0i64..500, index in 0usize..10_000) {
            let max = min + width;
            let value = RangeRule::new(min, max).generate(&ctx(index)).unwrap();
            let Value::I64(n) = value else { panic!("expected i64") };
            prop_assert!((min..=max).contains(&n));
        }

        #[test]
        fn generated_emails_validate(index in 0usize..100_000) {
            let value = EmailRule.generate(&ctx(index)).unwrap();
            prop_assert!(EmailRule.validate(&value).is_ok());
        }
    }
}
