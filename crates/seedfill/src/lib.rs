//! Seedfill: declarative, seed-reproducible population of Rust records.
//!
//! Describe a struct with [`fillable!`], attach optional directives to its
//! fields, and let a [`Populator`] fill it. Each field takes the first value
//! available from, in order:
//! - an override ([`Overrides`]), literal or index-driven
//! - its directive (`seq`, `email`, `min=1,max=9`, `oneof=a|b`, `rule=name`, ...)
//! - a type default
//!
//! Values are coerced into the field's declared type. Narrowing integer
//! conversions are range-checked and integers never become strings.
//!
//! # Example
//!
//! ```rust
//! use seedfill::{fillable, seq, Overrides, Populator, PopulatorConfig};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     email: String,
//!     age: u8,
//!     role: String,
//!     nickname: Option<String>,
//! }
//!
//! fillable!(User {
//!     id: i64 => "seq",
//!     name: String,
//!     email: String => "email",
//!     age: u8 => "min=18,max=65",
//!     role: String => "oneof=admin|member",
//!     nickname: Option<String>,
//! });
//!
//! let populator = Populator::new(PopulatorConfig::default().with_seed(12345));
//! let mut users: Vec<User> = (0..3).map(|_| User::default()).collect();
//! populator
//!     .populate_all(&mut users, &[Overrides::new().with("name", seq("user-{index}"))])
//!     .unwrap();
//!
//! assert_eq!(users[2].id, 2);
//! assert_eq!(users[2].name, "user-2");
//! assert_eq!(users[1].email, "test1@test.com");
//! assert_eq!(users[1].age, 19);
//! assert_eq!(users[1].role, "member");
//! assert!(users[0].nickname.is_some());
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod coerce;
pub mod config;
mod defaults;
pub mod directive;
pub mod error;
mod macros;
pub mod overrides;
pub mod populate;
pub mod schema;

pub use coerce::coerce;
pub use config::{PopulatorConfig, DEFAULT_LIST_LEN};
pub use directive::Directive;
pub use error::{Error, Result};
pub use overrides::{cycle, seq, seq_int, OverrideValue, Overrides, SequenceFn};
pub use populate::{populate, populate_all, Populator};
pub use schema::{FieldDef, FieldType, FieldValue, Fillable, RecordType};

pub use seedfill_rules::{
    rule_fn, AlphaNumericRule, BoolRule, Context, EmailRule, FnRule, OneOfRule, RangeRule, Record,
    Rule, RuleSet, SequenceRule, UrlRule, UuidRule, Value,
};
