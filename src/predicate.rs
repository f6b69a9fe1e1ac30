//! Predicate trees for `WHERE` clauses.
//!
//! A [`Predicate`] renders a boolean SQL condition with positional
//! placeholders and reports, separately, the values bound to them. The two
//! halves always agree: the k-th placeholder emitted by [`Predicate::render`]
//! corresponds to the k-th element of [`Predicate::values`].
//!
//! # Trust boundary
//!
//! Field names are written into the SQL text verbatim. They are never quoted,
//! escaped, or validated. Only values are parameter-bound. Field names must be
//! compile-time constants; passing user input as a field name is an SQL
//! injection.

use std::fmt;

use crate::dialect::RenderContext;
use crate::value::Value;

/// Comparison operator of a [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Ne,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
            Comparison::Ne => "<>",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A boolean filter over table columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// No filter. Renders empty text.
    #[default]
    None,
    /// `field op $N`
    Compare {
        field: String,
        op: Comparison,
        value: Value,
    },
    /// `field IS NULL` or `field IS NOT NULL`
    Null { field: String, is_null: bool },
    /// `field IN($N, $N+1, ...)`. An empty list renders `field IN()`.
    In { field: String, values: Vec<Value> },
    /// Children parenthesized and joined with `AND`.
    And(Vec<Predicate>),
    /// Children parenthesized and joined with `OR`.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Lte, value)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::Null {
            field: field.into(),
            is_null: true,
        }
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Predicate::Null {
            field: field.into(),
            is_null: false,
        }
    }

    pub fn in_list<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(children.into_iter().collect())
    }

    /// Render this node as SQL, consuming placeholders from `ctx`.
    ///
    /// The cursor advances by exactly [`Predicate::placeholder_count`].
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> String {
        match self {
            Predicate::None => String::new(),
            Predicate::Compare { field, op, .. } => {
                format!("{} {} {}", field, op, ctx.next_placeholder())
            }
            Predicate::Null { field, is_null } => {
                if *is_null {
                    format!("{} IS NULL", field)
                } else {
                    format!("{} IS NOT NULL", field)
                }
            }
            Predicate::In { field, values } => {
                let tokens: Vec<String> = values.iter().map(|_| ctx.next_placeholder()).collect();
                format!("{} IN({})", field, tokens.join(", "))
            }
            Predicate::And(children) => render_group(children, " AND ", ctx),
            Predicate::Or(children) => render_group(children, " OR ", ctx),
        }
    }

    /// Values bound by this node and its descendants, in placeholder order.
    pub fn values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.placeholder_count());
        self.collect_values(&mut out);
        out
    }

    fn collect_values(&self, out: &mut Vec<Value>) {
        match self {
            Predicate::None | Predicate::Null { .. } => {}
            Predicate::Compare { value, .. } => out.push(value.clone()),
            Predicate::In { values, .. } => out.extend(values.iter().cloned()),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_values(out);
                }
            }
        }
    }

    /// Number of placeholders [`Predicate::render`] consumes.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Predicate::None | Predicate::Null { .. } => 0,
            Predicate::Compare { .. } => 1,
            Predicate::In { values, .. } => values.len(),
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::placeholder_count).sum()
            }
        }
    }
}

// Each child draws from the shared cursor in turn; a child's position in the
// list says nothing about how many placeholders it takes.
fn render_group(children: &[Predicate], joiner: &str, ctx: &mut RenderContext<'_>) -> String {
    if children.is_empty() {
        return "()".to_string();
    }
    children
        .iter()
        .map(|child| format!("({})", child.render(ctx)))
        .collect::<Vec<_>>()
        .join(joiner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, RenderContext};
    use pretty_assertions::assert_eq;

    fn render_at(pred: &Predicate, start: usize) -> (String, usize) {
        let mut ctx = RenderContext::new(start);
        let sql = pred.render(&mut ctx);
        (sql, ctx.index())
    }

    #[test]
    fn test_noop_renders_nothing() {
        let (sql, next) = render_at(&Predicate::None, 1);
        assert_eq!(sql, "");
        assert_eq!(next, 1);
        assert!(Predicate::None.values().is_empty());
    }

    #[test]
    fn test_comparison() {
        let pred = Predicate::gt("age", 18);
        let (sql, next) = render_at(&pred, 1);
        assert_eq!(sql, "age > $1");
        assert_eq!(next, 2);
        assert_eq!(pred.values(), vec![Value::Int(18)]);
    }

    #[test]
    fn test_every_operator() {
        let cases = [
            (Predicate::eq("a", 1), "a = $1"),
            (Predicate::ne("a", 1), "a <> $1"),
            (Predicate::gt("a", 1), "a > $1"),
            (Predicate::gte("a", 1), "a >= $1"),
            (Predicate::lt("a", 1), "a < $1"),
            (Predicate::lte("a", 1), "a <= $1"),
        ];
        for (pred, expected) in cases {
            assert_eq!(render_at(&pred, 1).0, expected);
        }
    }

    #[test]
    fn test_null_check_binds_nothing() {
        let (sql, next) = render_at(&Predicate::is_null("deleted_at"), 3);
        assert_eq!(sql, "deleted_at IS NULL");
        assert_eq!(next, 3);

        let pred = Predicate::is_not_null("deleted_at");
        assert_eq!(render_at(&pred, 3).0, "deleted_at IS NOT NULL");
        assert!(pred.values().is_empty());
    }

    #[test]
    fn test_in_list_starting_mid_query() {
        let pred = Predicate::in_list("id", [1, 2, 3]);
        let (sql, next) = render_at(&pred, 5);
        assert_eq!(sql, "id IN($5, $6, $7)");
        assert_eq!(next, 8);
        assert_eq!(pred.values(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_empty_in_list_is_vacuous() {
        let pred = Predicate::in_list("id", Vec::<i64>::new());
        let (sql, next) = render_at(&pred, 1);
        assert_eq!(sql, "id IN()");
        assert_eq!(next, 1);
    }

    #[test]
    fn test_and_with_null_check() {
        let pred = Predicate::and([Predicate::gt("age", 18), Predicate::is_null("deleted_at")]);
        let (sql, _) = render_at(&pred, 1);
        assert_eq!(sql, "(age > $1) AND (deleted_at IS NULL)");
        assert_eq!(pred.values(), vec![Value::Int(18)]);
    }

    #[test]
    fn test_or_children_of_uneven_width() {
        // zero, three, one placeholders
        let pred = Predicate::or([
            Predicate::is_not_null("banned_at"),
            Predicate::in_list("region", ["euw", "eune", "na"]),
            Predicate::eq("tier", "GOLD"),
        ]);
        let (sql, next) = render_at(&pred, 1);
        assert_eq!(
            sql,
            "(banned_at IS NOT NULL) OR (region IN($1, $2, $3)) OR (tier = $4)"
        );
        assert_eq!(next, 5);
        assert_eq!(
            pred.values(),
            vec![
                Value::from("euw"),
                Value::from("eune"),
                Value::from("na"),
                Value::from("GOLD"),
            ]
        );
    }

    #[test]
    fn test_nested_cursor_is_shared() {
        let pred = Predicate::and([
            Predicate::or([Predicate::eq("a", 1), Predicate::in_list("b", [2, 3])]),
            Predicate::gte("c", 4),
            Predicate::or([Predicate::is_null("d"), Predicate::lt("e", 5)]),
        ]);
        let (sql, next) = render_at(&pred, 10);
        assert_eq!(
            sql,
            "((a = $10) OR (b IN($11, $12))) AND (c >= $13) AND ((d IS NULL) OR (e < $14))"
        );
        assert_eq!(next, 15);
        assert_eq!(pred.placeholder_count(), 5);
        assert_eq!(pred.values().len(), 5);
        assert_eq!(
            pred.values(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4), Value::Int(5)]
        );
    }

    #[test]
    fn test_empty_groups_render_parens() {
        assert_eq!(render_at(&Predicate::and(Vec::new()), 1).0, "()");
        assert_eq!(render_at(&Predicate::or(Vec::new()), 1).0, "()");
    }

    #[test]
    fn test_render_is_repeatable() {
        let pred = Predicate::or([Predicate::eq("a", 1), Predicate::eq("b", 2)]);
        assert_eq!(render_at(&pred, 3), render_at(&pred, 3));
    }

    #[test]
    fn test_question_mark_dialect() {
        let pred = Predicate::and([Predicate::eq("a", 1), Predicate::in_list("b", [2, 3])]);
        let mut ctx = RenderContext::with_style(1, &Dialect::MySql);
        assert_eq!(pred.render(&mut ctx), "(a = ?) AND (b IN(?, ?))");
        assert_eq!(ctx.index(), 4);
    }
}
