//! Value model, generation context and rule registry for Seedfill.
//!
//! This crate provides:
//! - [`Value`] and [`Record`], the dynamic values that flow between rules,
//!   overrides and records
//! - [`Context`], the immutable per-step generation parameters
//! - The [`Rule`] capability and the concurrent [`RuleSet`] registry
//! - Built-in rules (email, URL, UUID, range, one-of, sequence,
//!   alphanumeric, bool)
//!
//! # Example
//!
//! ```rust
//! use seedfill_rules::{Context, RangeRule, Rule, RuleSet, Value};
//!
//! let rules = RuleSet::with_builtins();
//! rules.add("age", RangeRule::new(18, 65));
//!
//! let ctx = Context::new("en_US", 42, 3).with_field_name("age");
//! let age = rules.get("age").unwrap().generate(&ctx).unwrap();
//! assert_eq!(age, Value::I64(21));
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod builtin;
pub mod context;
pub mod error;
pub mod rule;
pub mod value;

pub use builtin::{
    cycle_in_range, AlphaNumericRule, BoolRule, EmailRule, OneOfRule, RangeRule, SequenceRule,
    UrlRule, UuidRule,
};
pub use context::Context;
pub use error::{Error, Result};
pub use rule::{rule_fn, FnRule, Rule, RuleSet};
pub use value::{Record, Value};
