//! `ORDER BY` fragments.
//!
//! Orderings bind no parameters and never touch the render cursor. Field
//! names are inserted verbatim, under the same trust rules as predicates.

use std::fmt;

/// Sort direction of one field. `None` makes the field inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::None => "",
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldOrder {
    pub field: String,
    pub direction: Direction,
}

impl FieldOrder {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// An inert entry that renders nothing.
    pub fn unordered() -> Self {
        Self::default()
    }

    /// `"<field> ASC"`, `"<field> DESC"`, or `""` when no direction is set.
    pub fn render(&self) -> String {
        match self.direction {
            Direction::None => String::new(),
            dir => format!("{} {}", self.field, dir.as_sql()),
        }
    }
}

impl fmt::Display for FieldOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// How the rows of a query are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sort {
    /// No ordering.
    #[default]
    None,
    /// One sort key.
    Field(FieldOrder),
    /// Several keys, most significant first.
    List(Vec<FieldOrder>),
}

impl Sort {
    /// Render the ordering without the `ORDER BY` keyword.
    ///
    /// Inert keys are skipped, so a list of only inert keys renders `""`.
    pub fn render(&self) -> String {
        match self {
            Sort::None => String::new(),
            Sort::Field(order) => order.render(),
            Sort::List(orders) => orders
                .iter()
                .map(FieldOrder::render)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<FieldOrder> for Sort {
    fn from(order: FieldOrder) -> Self {
        Sort::Field(order)
    }
}

impl From<Vec<FieldOrder>> for Sort {
    fn from(orders: Vec<FieldOrder>) -> Self {
        Sort::List(orders)
    }
}

/// Sort by several keys, most significant first.
pub fn order_by(orders: impl IntoIterator<Item = FieldOrder>) -> Sort {
    Sort::List(orders.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_field() {
        assert_eq!(FieldOrder::asc("name").render(), "name ASC");
        assert_eq!(FieldOrder::desc("created_at").render(), "created_at DESC");
        assert_eq!(FieldOrder::new("name", Direction::None).render(), "");
    }

    #[test]
    fn test_list_preserves_order() {
        let sort = order_by([FieldOrder::desc("created_at"), FieldOrder::asc("name")]);
        assert_eq!(sort.render(), "created_at DESC, name ASC");
    }

    #[test]
    fn test_list_skips_inert_entries() {
        let sort = order_by([
            FieldOrder::unordered(),
            FieldOrder::desc("league_points"),
            FieldOrder::new("wins", Direction::None),
            FieldOrder::asc("name"),
        ]);
        assert_eq!(sort.render(), "league_points DESC, name ASC");
    }

    #[test]
    fn test_empty_and_noop() {
        assert_eq!(Sort::None.render(), "");
        assert_eq!(order_by(Vec::new()).render(), "");
        assert_eq!(order_by([FieldOrder::unordered()]).render(), "");
        assert_eq!(Sort::from(FieldOrder::unordered()).render(), "");
    }
}
