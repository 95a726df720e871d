//! The rule capability and the named rule registry.

use crate::context::Context;
use crate::error::Result;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// A value-generation strategy.
///
/// Rules receive everything they may depend on through the [`Context`];
/// they must not read other mutable state.
pub trait Rule: Send + Sync {
    /// Produces a value for the field described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot produce a value.
    fn generate(&self, ctx: &Context) -> Result<Value>;

    /// Checks that `value` is something this rule could have produced.
    ///
    /// # Errors
    ///
    /// Returns an error describing why the value is rejected.
    fn validate(&self, value: &Value) -> Result<()>;
}

/// A rule backed by a closure. Accepts every value on validation.
pub struct FnRule<F> {
    generate: F,
}

/// Wraps a closure as a [`Rule`].
///
/// ```rust
/// use seedfill_rules::{rule_fn, Context, Rule, Value};
///
/// let status = rule_fn(|ctx: &Context| {
///     let states = ["active", "inactive", "pending"];
///     Ok(Value::from(states[ctx.index() % states.len()]))
/// });
/// let value = status.generate(&Context::new("en_US", 1, 4)).unwrap();
/// assert_eq!(value, Value::from("inactive"));
/// ```
pub const fn rule_fn<F>(generate: F) -> FnRule<F>
where
    F: Fn(&Context) -> Result<Value> + Send + Sync,
{
    FnRule { generate }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Context) -> Result<Value> + Send + Sync,
{
    fn generate(&self, ctx: &Context) -> Result<Value> {
        (self.generate)(ctx)
    }

    fn validate(&self, _value: &Value) -> Result<()> {
        Ok(())
    }
}

type RuleMap = HashMap<String, Arc<dyn Rule>>;

/// A named collection of rules, safe for concurrent use.
///
/// Readers run concurrently; registrations and removals are exclusive.
#[derive(Default)]
pub struct RuleSet {
    rules: RwLock<RuleMap>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RuleMap> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RuleMap> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `rule` under `name`, replacing any previous entry.
    pub fn add<R: Rule + 'static>(&self, name: impl Into<String>, rule: R) -> &Self {
        self.add_shared(name, Arc::new(rule))
    }

    /// Registers an already shared rule under `name`.
    pub fn add_shared(&self, name: impl Into<String>, rule: Arc<dyn Rule>) -> &Self {
        let name = name.into();
        trace!(rule = %name, "registering rule");
        self.write().insert(name, rule);
        self
    }

    /// Looks up a rule by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.read().get(name).cloned()
    }

    /// Returns true if a rule is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Removes a rule, returning whether it was present.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            trace!(rule = %name, "removed rule");
        }
        removed
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Merges `other` into this set.
    ///
    /// Rules already registered here keep their entry; only names missing
    /// from this set are taken from `other`.
    pub fn extend(&self, other: &Self) -> &Self {
        if std::ptr::eq(self, other) {
            return self;
        }

        // Copy out first so the two locks are never held together.
        let incoming: Vec<(String, Arc<dyn Rule>)> = other
            .read()
            .iter()
            .map(|(name, rule)| (name.clone(), Arc::clone(rule)))
            .collect();

        let mut rules = self.write();
        for (name, rule) in incoming {
            rules.entry(name).or_insert(rule);
        }
        drop(rules);
        self
    }
}

impl Clone for RuleSet {
    fn clone(&self) -> Self {
        Self {
            rules: RwLock::new(self.read().clone()),
        }
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("names", &self.names())
            .finish()
    }
}
