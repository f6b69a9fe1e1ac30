//! Clause assembly: one predicate plus one ordering.

use crate::dialect::{Dialect, RenderContext};
use crate::ordering::Sort;
use crate::predicate::Predicate;
use crate::value::Value;

/// The filter and sort of one query.
///
/// Renders the suffix appended after `SELECT ... FROM ...`. A clause is
/// immutable and may be rendered any number of times; each render takes its
/// own cursor, so the same clause can be shared across threads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    predicate: Predicate,
    sort: Sort,
}

impl Clause {
    pub fn new(predicate: Predicate, sort: impl Into<Sort>) -> Self {
        Self {
            predicate,
            sort: sort.into(),
        }
    }

    /// A clause that filters but does not sort.
    pub fn filter(predicate: Predicate) -> Self {
        Self::new(predicate, Sort::None)
    }

    /// A clause that sorts but does not filter.
    pub fn sorted(sort: impl Into<Sort>) -> Self {
        Self::new(Predicate::None, sort)
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Render with `$N` placeholders numbered from `start`.
    pub fn render(&self, start: usize) -> String {
        self.render_with(&mut RenderContext::new(start))
    }

    /// Render with the caller's cursor and placeholder style.
    ///
    /// Produces `" WHERE <predicate>"` and/or `" ORDER BY <sort>"`, each part
    /// omitted when it renders empty.
    pub fn render_with(&self, ctx: &mut RenderContext<'_>) -> String {
        let mut sql = String::new();

        let filter = self.predicate.render(ctx);
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }

        let order = self.sort.render();
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        sql
    }

    /// Bound values, in placeholder order. Orderings never bind.
    pub fn values(&self) -> Vec<Value> {
        self.predicate.values()
    }

    /// Render and collect values in one call.
    pub fn to_sql_parameterized(&self, start: usize, dialect: Dialect) -> (String, Vec<Value>) {
        let mut ctx = RenderContext::with_style(start, &dialect);
        (self.render_with(&mut ctx), self.values())
    }
}
