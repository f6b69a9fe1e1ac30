//! Placeholder conventions and the render cursor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArmouryError;

/// Produces the positional placeholder token for a 1-based parameter index.
pub trait Placeholder {
    fn placeholder(&self, index: usize) -> String;
}

/// Supported placeholder dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `$1, $2, ...`
    #[default]
    Postgres,
    /// `?, ?, ...`
    #[serde(rename = "mysql")]
    MySql,
    /// `?, ?, ...`
    Sqlite,
    /// `@p1, @p2, ...`
    #[serde(rename = "sqlserver")]
    SqlServer,
}

impl Dialect {
    /// Guess the dialect from a database connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once(':')?.0;
        match scheme {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            "mssql" | "sqlserver" => Some(Dialect::SqlServer),
            _ => None,
        }
    }
}

impl Placeholder for Dialect {
    fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
            Dialect::SqlServer => format!("@p{}", index),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::SqlServer => write!(f, "sqlserver"),
        }
    }
}

impl FromStr for Dialect {
    type Err = ArmouryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            other => Err(ArmouryError::InvalidArgument(format!(
                "'{}' is not a known dialect",
                other
            ))),
        }
    }
}

/// Cursor state for one render pass.
///
/// Holds the number of the next placeholder to emit. A single context is
/// threaded by `&mut` through every node of a predicate tree, so numbering
/// stays consecutive across `And`/`Or` branches. Use a fresh context per
/// render; never share one between concurrent renders.
///
/// Placeholder numbers are `usize`. A render may start anywhere, up to and
/// including `usize::MAX`, as long as every number it emits fits.
pub struct RenderContext<'a> {
    index: usize,
    // Set once `usize::MAX` has been emitted.
    exhausted: bool,
    style: &'a dyn Placeholder,
}

impl RenderContext<'static> {
    /// A Postgres-style (`$N`) context starting at `start`.
    pub fn new(start: usize) -> Self {
        Self {
            index: start,
            exhausted: false,
            style: &Dialect::Postgres,
        }
    }
}

impl<'a> RenderContext<'a> {
    /// A context starting at `start` that emits tokens from `style`.
    pub fn with_style(start: usize, style: &'a dyn Placeholder) -> Self {
        Self {
            index: start,
            exhausted: false,
            style,
        }
    }

    /// Number of the next placeholder to be emitted.
    ///
    /// Stays at `usize::MAX` once that number has been emitted.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Emit the next placeholder and advance the cursor by one.
    ///
    /// # Panics
    ///
    /// Panics if the placeholder number would exceed `usize::MAX`.
    pub fn next_placeholder(&mut self) -> String {
        if self.exhausted {
            panic!("placeholder number overflowed usize");
        }
        let token = self.style.placeholder(self.index);
        match self.index.checked_add(1) {
            Some(next) => self.index = next,
            None => self.exhausted = true,
        }
        token
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("index", &self.index)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_tokens() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::Sqlite.placeholder(9), "?");
        assert_eq!(Dialect::SqlServer.placeholder(2), "@p2");
    }

    #[test]
    fn test_cursor_advances() {
        let mut ctx = RenderContext::new(4);
        assert_eq!(ctx.next_placeholder(), "$4");
        assert_eq!(ctx.next_placeholder(), "$5");
        assert_eq!(ctx.index(), 6);
    }

    #[test]
    fn test_cursor_at_usize_max() {
        let mut ctx = RenderContext::new(usize::MAX);
        assert_eq!(ctx.next_placeholder(), format!("${}", usize::MAX));
        assert_eq!(ctx.index(), usize::MAX);

        let mut ctx = RenderContext::with_style(usize::MAX - 1, &Dialect::SqlServer);
        assert_eq!(ctx.next_placeholder(), format!("@p{}", usize::MAX - 1));
        assert_eq!(ctx.next_placeholder(), format!("@p{}", usize::MAX));
    }

    #[test]
    #[should_panic(expected = "placeholder number overflowed usize")]
    fn test_cursor_past_usize_max_panics() {
        let mut ctx = RenderContext::new(usize::MAX);
        ctx.next_placeholder();
        ctx.next_placeholder();
    }

    #[test]
    fn test_custom_style() {
        struct Colon;
        impl Placeholder for Colon {
            fn placeholder(&self, index: usize) -> String {
                format!(":{}", index)
            }
        }

        let mut ctx = RenderContext::with_style(1, &Colon);
        assert_eq!(ctx.next_placeholder(), ":1");
    }

    #[test]
    fn test_dialect_from_url() {
        assert_eq!(Dialect::from_url("postgres://localhost/db"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("mysql://root@host/db"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_url("redis://host"), None);
        assert_eq!(Dialect::from_url("nonsense"), None);
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("PG".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mssql".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
