//! Record population.
//!
//! For every declared field, in order, the first source that applies wins:
//! 1. an override (instance defaults, then call-site overrides)
//! 2. the field directive
//! 3. the type default
//!
//! Nested records are filled from their own directives and type defaults.
//! Overrides address top-level fields only.

use crate::coerce::coerce;
use crate::config::PopulatorConfig;
use crate::defaults::scalar_default;
use crate::directive::{Directive, Env, Outcome};
use crate::error::Result;
use crate::overrides::Overrides;
use crate::schema::{FieldDef, FieldType, Fillable, RecordType};
use chrono::{DateTime, Utc};
use seedfill_rules::{Context, RuleSet, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Nesting depth past which composite defaults stop recursing.
const MAX_DEPTH: usize = 16;

/// Fills records with generated or overridden values.
///
/// A populator holds no mutable state, so it can be shared between threads.
/// Output depends only on the configuration, the rules, the overrides and
/// the element index.
#[derive(Debug, Clone)]
pub struct Populator {
    config: PopulatorConfig,
    rules: Arc<RuleSet>,
    defaults: Overrides,
}

impl Default for Populator {
    fn default() -> Self {
        Self::new(PopulatorConfig::default())
    }
}

/// Per-call state shared by every element.
struct Plan {
    fields: Vec<(FieldDef, Option<Directive>)>,
    overrides: Overrides,
    now: DateTime<Utc>,
}

impl Populator {
    /// Creates a populator with the built-in rules.
    pub fn new(config: PopulatorConfig) -> Self {
        Self {
            config,
            rules: Arc::new(RuleSet::with_builtins()),
            defaults: Overrides::new(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PopulatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the locale tag.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.config = self.config.with_locale(locale);
        self
    }

    /// Sets the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    /// Replaces the active rule set.
    #[must_use]
    pub fn with_rules(mut self, rules: impl Into<Arc<RuleSet>>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Sets overrides applied to every call, below call-site overrides.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Overrides) -> Self {
        self.defaults = defaults;
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &PopulatorConfig {
        &self.config
    }

    /// Active rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Populates `record` as element 0.
    ///
    /// # Errors
    ///
    /// Returns the first field failure, wrapped in
    /// [`Error::Field`](crate::Error::Field).
    pub fn populate<T: Fillable>(&self, record: &mut T, overrides: &[Overrides]) -> Result<()> {
        self.populate_at(record, 0, overrides)
    }

    /// Populates `record` as the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns the first field failure, wrapped in
    /// [`Error::Field`](crate::Error::Field).
    pub fn populate_at<T: Fillable>(
        &self,
        record: &mut T,
        index: usize,
        overrides: &[Overrides],
    ) -> Result<()> {
        let plan = self.plan(T::record_type(), overrides);
        self.fill_record(record, index, &plan)
    }

    /// Populates every element, using its position as the index.
    ///
    /// # Errors
    ///
    /// Stops at the first failing element and returns its error wrapped in
    /// [`Error::Element`](crate::Error::Element).
    pub fn populate_all<T: Fillable>(&self, records: &mut [T], overrides: &[Overrides]) -> Result<()> {
        let plan = self.plan(T::record_type(), overrides);
        debug!(
            record = T::record_type().name(),
            count = records.len(),
            "populating collection"
        );
        for (index, record) in records.iter_mut().enumerate() {
            self.fill_record(record, index, &plan)
                .map_err(|e| e.at_element(index))?;
        }
        Ok(())
    }

    fn plan(&self, record_type: RecordType, overrides: &[Overrides]) -> Plan {
        let fields = record_type
            .fields()
            .into_iter()
            .map(|field| {
                let directive = field.directive.map(Directive::parse);
                (field, directive)
            })
            .collect();
        Plan {
            fields,
            overrides: Overrides::merge(std::iter::once(&self.defaults).chain(overrides)),
            now: self.config.now(),
        }
    }

    fn env(&self, plan: &Plan) -> Env<'_> {
        Env {
            rules: self.rules.as_ref(),
            now: plan.now,
            validate: self.config.validate_rules,
        }
    }

    fn fill_record<T: Fillable>(&self, record: &mut T, index: usize, plan: &Plan) -> Result<()> {
        debug!(
            record = T::record_type().name(),
            index,
            overrides = plan.overrides.len(),
            "populating record"
        );

        let ctx = Context::new(&self.config.locale, self.config.seed, index).with_record(record.snapshot());
        let env = self.env(plan);

        for (field, directive) in &plan.fields {
            let field_ctx = ctx.with_field_name(field.name);
            let produced = match plan.overrides.get(field.name) {
                Some(value) => {
                    let value = value.resolve(index);
                    if value.is_null() {
                        trace!(field = field.name, "null override, field left as is");
                        None
                    } else {
                        trace!(field = field.name, "override");
                        Some(coerce(value, &field.ty))
                    }
                }
                None => self
                    .generate(&field.ty, directive.as_ref(), &field_ctx, &env, 0)
                    .transpose(),
            };

            if let Some(value) = produced {
                value
                    .and_then(|value| record.set_field(field.name, value))
                    .map_err(|e| e.in_field(field.name))?;
            }
        }
        Ok(())
    }

    /// Produces a value for one field. `None` leaves the field untouched.
    fn generate(
        &self,
        ty: &FieldType,
        directive: Option<&Directive>,
        ctx: &Context,
        env: &Env<'_>,
        depth: usize,
    ) -> Result<Option<Value>> {
        if let Some(directive) = directive {
            match directive.evaluate(ctx, env)? {
                Outcome::Skip => {
                    debug!(field = ctx.field_name(), "skipped by directive");
                    return Ok(None);
                }
                Outcome::Produced(Value::Null) => {
                    trace!(field = ctx.field_name(), "directive yielded null");
                }
                Outcome::Produced(value) => {
                    trace!(field = ctx.field_name(), "directive");
                    return coerce(value, ty).map(Some);
                }
                Outcome::Fallthrough => {}
            }
        }

        trace!(field = ctx.field_name(), "type default");
        self.type_default(ty, ctx, env, depth).map(Some)
    }

    fn type_default(&self, ty: &FieldType, ctx: &Context, env: &Env<'_>, depth: usize) -> Result<Value> {
        if depth >= MAX_DEPTH {
            let cut = match ty {
                FieldType::Pointer(_) => Some(Value::Null),
                FieldType::List(_) => Some(Value::List(Vec::new())),
                FieldType::Record(record) => Some(Value::Record(record.zero())),
                _ => None,
            };
            if let Some(value) = cut {
                debug!(field = ctx.field_name(), depth, "nesting limit reached");
                return Ok(value);
            }
        }

        match ty {
            FieldType::Pointer(inner) => {
                let value = self.type_default(inner, ctx, env, depth + 1)?;
                Ok(Value::Pointer(Box::new(value)))
            }
            FieldType::List(element) => (0..self.config.list_len)
                .map(|i| self.type_default(element, &ctx.with_index(i), env, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            FieldType::Record(record) => self.nested_record(*record, ctx, env, depth + 1),
            scalar => Ok(scalar_default(scalar, ctx, env.now).unwrap_or(Value::Null)),
        }
    }

    fn nested_record(&self, record_type: RecordType, ctx: &Context, env: &Env<'_>, depth: usize) -> Result<Value> {
        let mut record = record_type.zero();
        let scoped = ctx.with_record(record.clone());

        for field in record_type.fields() {
            let directive = field.directive.map(Directive::parse);
            let field_ctx = scoped.with_field_name(field.name);
            let produced = self
                .generate(&field.ty, directive.as_ref(), &field_ctx, env, depth)
                .map_err(|e| e.in_field(field.name))?;
            if let Some(value) = produced {
                record.set(field.name, value);
            }
        }
        Ok(Value::Record(record))
    }
}

/// Populates `record` with a default [`Populator`].
///
/// # Errors
///
/// See [`Populator::populate`].
pub fn populate<T: Fillable>(record: &mut T, overrides: &[Overrides]) -> Result<()> {
    Populator::default().populate(record, overrides)
}

/// Populates every element of `records` with a default [`Populator`].
///
/// # Errors
///
/// See [`Populator::populate_all`].
pub fn populate_all<T: Fillable>(records: &mut [T], overrides: &[Overrides]) -> Result<()> {
    Populator::default().populate_all(records, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::overrides::seq_int;
    use chrono::TimeZone;

    #[derive(Debug, Default)]
    struct Node {
        name: String,
        children: Vec<Node>,
    }

    crate::fillable!(Node {
        name: String,
        children: Vec<Node>,
    });

    #[derive(Debug, Default)]
    struct Event {
        id: i64,
        at: DateTime<Utc>,
        label: Option<String>,
    }

    crate::fillable!(Event {
        id: i64 => "seq",
        at: DateTime<Utc> => "now",
        label: Option<String>,
    });

    fn fixed() -> Populator {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap();
        Populator::new(
            PopulatorConfig::default()
                .with_seed(12345)
                .with_reference_time(at),
        )
    }

    fn depth(node: &Node) -> usize {
        1 + node.children.iter().map(depth).max().unwrap_or(0)
    }

    #[test]
    fn self_referential_records_terminate() {
        let populator = fixed().with_config(fixed().config().clone().with_list_len(1));
        let mut node = Node::default();
        populator.populate(&mut node, &[]).unwrap();

        assert_eq!(node.name, "hello");
        assert!(depth(&node) > 1);
        assert!(depth(&node) <= MAX_DEPTH);
    }

    #[test]
    fn populate_at_uses_index() {
        let mut event = Event::default();
        fixed().populate_at(&mut event, 4, &[]).unwrap();

        assert_eq!(event.id, 4);
        assert_eq!(event.at, Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap());
        assert_eq!(event.label.as_deref(), Some("data"));
    }

    #[test]
    fn instance_defaults_sit_below_call_overrides() {
        let populator = fixed().with_defaults(Overrides::new().with("id", 7_i64).with("label", "base"));
        let mut event = Event::default();

        populator.populate(&mut event, &[]).unwrap();
        assert_eq!(event.id, 7);
        assert_eq!(event.label.as_deref(), Some("base"));

        populator
            .populate(&mut event, &[Overrides::new().with("id", seq_int(50))])
            .unwrap();
        assert_eq!(event.id, 50);
        assert_eq!(event.label.as_deref(), Some("base"));
    }

    #[test]
    fn unknown_rule_reports_field() {
        #[derive(Debug, Default)]
        struct Broken {
            code: String,
        }
        crate::fillable!(Broken { code: String => "rule=nonexistent" });

        let err = fixed().populate(&mut Broken::default(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "field 'code': rule 'nonexistent' not found");
        assert!(matches!(err.root(), Error::RuleNotFound { rule } if rule == "nonexistent"));
    }

    #[test]
    fn populator_is_shareable_across_threads() {
        let populator = fixed();
        let ids: Vec<i64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let populator = &populator;
                    s.spawn(move || {
                        let mut event = Event::default();
                        populator.populate_at(&mut event, i, &[]).unwrap();
                        event.id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
