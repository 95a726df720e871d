//! Field directives.
//!
//! A directive is the short string attached to a field in
//! [`fillable!`](crate::fillable), for example `"min=18,max=65"` or
//! `"rule=status"`. It is parsed once into a [`Directive`] and then
//! evaluated per element.
//!
//! Evaluation order:
//! 1. `-` skips the field entirely
//! 2. `rule=<name>` uses the named rule, and fails if it is not registered
//! 3. a bare first token is a keyword (`seq`, `now`, `email`, `url`,
//!    `uuid`) or else the name of a registered rule
//! 4. `min=N,max=M` cycles through the inclusive range
//! 5. `oneof=a|b|c` cycles through the options
//!
//! When nothing applies the caller falls back to the type default.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use seedfill_rules::{cycle_in_range, Context, EmailRule, Rule, RuleSet, UrlRule, UuidRule, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Built-in bare keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    /// Element index as `i64`.
    Seq,
    /// Reference timestamp.
    Now,
    /// Generated email address.
    Email,
    /// Generated URL.
    Url,
    /// Generated UUID string.
    Uuid,
}

impl Keyword {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "seq" => Some(Self::Seq),
            "now" => Some(Self::Now),
            "email" => Some(Self::Email),
            "url" => Some(Self::Url),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }
}

/// Parsed form of a directive string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    skip: bool,
    rule: Option<String>,
    keyword: Option<Keyword>,
    implicit_rule: Option<String>,
    range: Option<(i64, i64)>,
    one_of: Option<Vec<String>>,
}

/// Result of evaluating a directive.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    /// Leave the field untouched and do not apply a default.
    Skip,
    /// Assign this value.
    Produced(Value),
    /// Nothing applied; use the type default.
    Fallthrough,
}

/// What a directive needs from the populator at evaluation time.
#[derive(Debug, Clone)]
pub(crate) struct Env<'a> {
    pub rules: &'a RuleSet,
    pub now: DateTime<Utc>,
    pub validate: bool,
}

impl Directive {
    /// Parses a directive string. Unknown keys are ignored.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }

        let mut directive = Self::default();
        let mut min = None;
        let mut max = None;

        for (position, token) in raw.split(',').map(str::trim).enumerate() {
            match token.split_once('=') {
                Some((key, value)) => match key.trim() {
                    "rule" => directive.rule = Some(value.trim().to_string()),
                    "min" => min = Some(value.trim()),
                    "max" => max = Some(value.trim()),
                    "oneof" => {
                        directive.one_of = Some(value.split('|').map(str::to_string).collect());
                    }
                    _ => {}
                },
                None if position == 0 && !token.is_empty() => match Keyword::parse(token) {
                    Some(keyword) => directive.keyword = Some(keyword),
                    None => directive.implicit_rule = Some(token.to_string()),
                },
                None => {}
            }
        }

        if let (Some(min), Some(max)) = (min, max) {
            match (min.parse(), max.parse()) {
                (Ok(min), Ok(max)) => directive.range = Some((min, max)),
                _ => debug!(directive = raw, min, max, "non-integer range bounds ignored"),
            }
        }

        directive
    }

    /// Returns true for the `-` directive.
    pub const fn is_skip(&self) -> bool {
        self.skip
    }

    /// Name given with `rule=`, if any.
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub(crate) fn evaluate(&self, ctx: &Context, env: &Env<'_>) -> Result<Outcome> {
        if self.skip {
            return Ok(Outcome::Skip);
        }

        if let Some(name) = &self.rule {
            let rule = env.rules.get(name).ok_or_else(|| Error::RuleNotFound {
                rule: name.clone(),
            })?;
            return run_rule(name, &rule, ctx, env).map(Outcome::Produced);
        }

        if let Some(keyword) = self.keyword {
            return keyword_value(keyword, ctx, env.now).map(Outcome::Produced);
        }

        if let Some(name) = &self.implicit_rule {
            if let Some(rule) = env.rules.get(name) {
                return run_rule(name, &rule, ctx, env).map(Outcome::Produced);
            }
            trace!(field = ctx.field_name(), rule = %name, "implicit rule not registered");
        }

        if let Some((min, max)) = self.range {
            match cycle_in_range(min, max, ctx.index()) {
                Some(n) => return Ok(Outcome::Produced(Value::I64(n))),
                None => debug!(field = ctx.field_name(), min, max, "reversed range ignored"),
            }
        }

        if let Some(options) = &self.one_of {
            let choice = &options[ctx.index() % options.len()];
            return Ok(Outcome::Produced(Value::from(choice.as_str())));
        }

        Ok(Outcome::Fallthrough)
    }
}

fn run_rule(name: &str, rule: &Arc<dyn Rule>, ctx: &Context, env: &Env<'_>) -> Result<Value> {
    let value = rule.generate(ctx).map_err(|source| Error::Generation {
        rule: name.to_string(),
        source,
    })?;

    if env.validate {
        rule.validate(&value).map_err(|source| Error::Validation {
            rule: name.to_string(),
            value: value.to_string(),
            source,
        })?;
    }

    Ok(value)
}

fn keyword_value(keyword: Keyword, ctx: &Context, now: DateTime<Utc>) -> Result<Value> {
    let generated = match keyword {
        Keyword::Seq => return Ok(Value::I64(i64::try_from(ctx.index()).unwrap_or(i64::MAX))),
        Keyword::Now => return Ok(Value::Time(now)),
        Keyword::Email => EmailRule.generate(ctx),
        Keyword::Url => UrlRule::new().generate(ctx),
        Keyword::Uuid => UuidRule.generate(ctx),
    };
    generated.map_err(|source| Error::Generation {
        rule: format!("{keyword:?}").to_lowercase(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use seedfill_rules::{rule_fn, OneOfRule};

    fn env(rules: &RuleSet) -> Env<'_> {
        Env {
            rules,
            now: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            validate: false,
        }
    }

    fn eval(raw: &str, index: usize) -> Result<Outcome> {
        let rules = RuleSet::with_builtins();
        let ctx = Context::new("en_US", 1, index).with_field_name("f");
        Directive::parse(raw).evaluate(&ctx, &env(&rules))
    }

    #[test]
    fn parse_recognizes_every_form() {
        assert!(Directive::parse(" - ").is_skip());
        assert_eq!(Directive::parse("rule=status").rule(), Some("status"));

        let d = Directive::parse("min=1, max=5, oneof=a|b");
        assert_eq!(d.range, Some((1, 5)));
        assert_eq!(d.one_of, Some(vec!["a".to_string(), "b".to_string()]));

        assert_eq!(Directive::parse("uuid").keyword, Some(Keyword::Uuid));
        assert_eq!(Directive::parse("status").implicit_rule.as_deref(), Some("status"));
        assert_eq!(Directive::parse("min=x,max=3").range, None);
        assert_eq!(Directive::parse("min=3").range, None);
        assert_eq!(Directive::parse("min=18.5,max=30").range, None);
        assert_eq!(Directive::parse("min=,max=5").range, None);
    }

    #[test]
    fn skip_and_fallthrough() {
        assert_eq!(eval("-", 0).unwrap(), Outcome::Skip);
        assert_eq!(eval("", 0).unwrap(), Outcome::Fallthrough);
        assert_eq!(eval("unknown_thing", 0).unwrap(), Outcome::Fallthrough);
        assert_eq!(eval("color=blue", 0).unwrap(), Outcome::Fallthrough);
    }

    #[test]
    fn keywords_produce_builtin_values() {
        assert_eq!(eval("seq", 7).unwrap(), Outcome::Produced(Value::I64(7)));
        assert_eq!(
            eval("now", 0).unwrap(),
            Outcome::Produced(Value::Time(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()))
        );
        assert_eq!(
            eval("email", 1).unwrap(),
            Outcome::Produced(Value::from("test1@test.com"))
        );
        assert_eq!(
            eval("url", 0).unwrap(),
            Outcome::Produced(Value::from("https://example.com/"))
        );
    }

    #[test]
    fn explicit_rule_must_exist() {
        let err = eval("rule=nonexistent", 0).unwrap_err();
        assert_eq!(err.to_string(), "rule 'nonexistent' not found");
    }

    #[test]
    fn rule_dominates_other_tokens() {
        let rules = RuleSet::new();
        rules.add("status", OneOfRule::new(["on", "off"]).unwrap());
        let ctx = Context::new("en_US", 1, 1);

        let outcome = Directive::parse("min=1,max=2,rule=status")
            .evaluate(&ctx, &env(&rules))
            .unwrap();
        assert_eq!(outcome, Outcome::Produced(Value::from("off")));
    }

    #[test]
    fn implicit_rule_is_used_when_registered() {
        let rules = RuleSet::new();
        rules.add("answer", rule_fn(|_: &Context| Ok(Value::I64(42))));
        let ctx = Context::new("en_US", 1, 0);

        let outcome = Directive::parse("answer").evaluate(&ctx, &env(&rules)).unwrap();
        assert_eq!(outcome, Outcome::Produced(Value::I64(42)));
    }

    #[test]
    fn rule_failures_name_the_rule() {
        let rules = RuleSet::new();
        rules.add(
            "flaky",
            rule_fn(|_: &Context| Err(seedfill_rules::Error::custom("boom"))),
        );
        let ctx = Context::new("en_US", 1, 0);

        let err = Directive::parse("rule=flaky").evaluate(&ctx, &env(&rules)).unwrap_err();
        assert!(matches!(err, Error::Generation { ref rule, .. } if rule == "flaky"));
    }

    struct Liar;

    impl Rule for Liar {
        fn generate(&self, _ctx: &Context) -> seedfill_rules::Result<Value> {
            Ok(Value::from("not-an-email"))
        }

        fn validate(&self, value: &Value) -> seedfill_rules::Result<()> {
            Err(seedfill_rules::Error::Invalid(format!("rejected {value}")))
        }
    }

    #[test]
    fn validation_checks_rule_output_when_enabled() {
        let rules = RuleSet::new();
        rules.add("status", OneOfRule::new(["on", "off"]).unwrap());
        rules.add("liar", Liar);
        let ctx = Context::new("en_US", 1, 0);
        let mut strict = env(&rules);
        strict.validate = true;

        assert!(Directive::parse("rule=status").evaluate(&ctx, &strict).is_ok());
        assert!(Directive::parse("rule=liar").evaluate(&ctx, &env(&rules)).is_ok());

        let err = Directive::parse("rule=liar").evaluate(&ctx, &strict).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed for rule 'liar' with value \"not-an-email\": rejected \"not-an-email\""
        );
    }

    #[test]
    fn range_before_one_of() {
        assert_eq!(
            eval("min=10,max=12,oneof=a|b", 4).unwrap(),
            Outcome::Produced(Value::I64(11))
        );
        assert_eq!(
            eval("min=12,max=10,oneof=a|b", 1).unwrap(),
            Outcome::Produced(Value::from("b"))
        );
        assert_eq!(eval("min=12,max=10", 1).unwrap(), Outcome::Fallthrough);
    }

    proptest! {
        #[test]
        fn range_output_within_bounds(min in -100i64..100, width in 0i64..50, index in 0usize..10_000) {
            let raw = format!("min={min},max={}", min + width);
            let Outcome::Produced(Value::I64(n)) = eval(&raw, index).unwrap() else {
                panic!("expected an i64");
            };
            prop_assert!((min..=min + width).contains(&n));
        }

        #[test]
        fn one_of_output_is_an_option(index in 0usize..10_000) {
            let Outcome::Produced(value) = eval("oneof=active|inactive", index).unwrap() else {
                panic!("expected a value");
            };
            prop_assert!(value == Value::from("active") || value == Value::from("inactive"));
        }
    }
}
