//! # armoury
//!
//! > **Filters as values. Placeholders that line up.**
//!
//! armoury builds the `WHERE ... ORDER BY ...` suffix of a query from small
//! composable values and hands back, in lock-step, the parameter values its
//! placeholders stand for.
//!
//! ## Quick Example
//!
//! ```
//! use armoury::prelude::*;
//!
//! let clause = Clause::new(
//!     Predicate::and([Predicate::gt("age", 18), Predicate::is_null("deleted_at")]),
//!     order_by([FieldOrder::desc("created_at"), FieldOrder::asc("name")]),
//! );
//!
//! assert_eq!(
//!     clause.render(1),
//!     " WHERE (age > $1) AND (deleted_at IS NULL) ORDER BY created_at DESC, name ASC"
//! );
//! assert_eq!(clause.values(), vec![Value::Int(18)]);
//! ```
//!
//! ## Building Blocks
//!
//! | Type        | Renders                          | Binds            |
//! |-------------|----------------------------------|------------------|
//! | `Predicate` | `a > $1`, `a IS NULL`, `a IN(..)`| one value per `$`|
//! | `Sort`      | `a DESC, b ASC`                  | nothing          |
//! | `Clause`    | ` WHERE .. ORDER BY ..`          | predicate values |
//!
//! ## Identifiers are not escaped
//!
//! Field names go into the SQL text exactly as given. Only values are bound
//! as parameters. Never build a field name from user input.

pub mod clause;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod ordering;
pub mod parser;
pub mod predicate;
pub mod value;

pub mod prelude {
    pub use crate::clause::Clause;
    pub use crate::config::Config;
    pub use crate::dialect::{Dialect, Placeholder, RenderContext};
    pub use crate::engine::Store;
    pub use crate::error::*;
    pub use crate::ordering::{order_by, Direction, FieldOrder, Sort};
    pub use crate::parser::{parse_clause, parse_filter, parse_sort};
    pub use crate::predicate::{Comparison, Predicate};
    pub use crate::value::Value;
}

/// Parse filter and sort text into a [`clause::Clause`].
///
/// # Example
///
/// ```
/// let clause = armoury::parse("wins >= 10 & tier = 'GOLD'", "-league_points").unwrap();
/// assert_eq!(
///     clause.render(1),
///     " WHERE (wins >= $1) AND (tier = $2) ORDER BY league_points DESC"
/// );
/// ```
pub fn parse(filter: &str, sort: &str) -> Result<clause::Clause, error::ArmouryError> {
    parser::parse_clause(filter, sort)
}
