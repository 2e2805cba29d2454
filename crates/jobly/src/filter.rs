//! Optional WHERE clause construction for record searches.
//!
//! Each search criterion becomes one [`Predicate`]; [`FilterBuilder::build`]
//! ANDs them together and numbers the placeholders. When no criterion is
//! present the result is `None`, so the caller never emits a bare `WHERE`.

use crate::clause::ClauseFragment;
use crate::value::SqlValue;
use std::fmt::Write;

/// Comparison operator for a bound predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gte,
    Lte,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        }
    }
}

/// One search predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> $n`, binds `value`.
    Compare {
        column: &'static str,
        op: CompareOp,
        value: SqlValue,
    },
    /// Literal SQL that binds nothing, e.g. `equity > 0`.
    Flag(&'static str),
    /// `column ILIKE $n`, binds `%value%`.
    Contains { column: &'static str, value: String },
}

/// Accumulates predicates for a search.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    predicates: Vec<Predicate>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Add `column >= $n` when `value` is present.
    pub fn min<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(Predicate::Compare {
                column,
                op: CompareOp::Gte,
                value: value.into(),
            });
        }
        self
    }

    /// Add `column <= $n` when `value` is present.
    pub fn max<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(Predicate::Compare {
                column,
                op: CompareOp::Lte,
                value: value.into(),
            });
        }
        self
    }

    /// Add the literal `sql` when `flag` is `Some(true)`.
    pub fn flag(&mut self, sql: &'static str, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.push(Predicate::Flag(sql));
        }
        self
    }

    /// Add a case-insensitive substring match when `value` is present.
    ///
    /// An empty string is still a filter: it becomes `%%` and matches every
    /// non-null value.
    pub fn contains(&mut self, column: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.push(Predicate::Contains {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// AND the predicates together, or `None` if there are none.
    pub fn build(self) -> Option<ClauseFragment> {
        if self.predicates.is_empty() {
            return None;
        }

        let mut sql = String::new();
        let mut values = Vec::new();

        for (i, predicate) in self.predicates.into_iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            match predicate {
                Predicate::Compare { column, op, value } => {
                    values.push(value);
                    let _ = write!(&mut sql, "{} {} ${}", column, op.as_sql(), values.len());
                }
                Predicate::Flag(flag) => sql.push_str(flag),
                Predicate::Contains { column, value } => {
                    values.push(SqlValue::Text(format!("%{}%", value)));
                    let _ = write!(&mut sql, "{} ILIKE ${}", column, values.len());
                }
            }
        }

        Some(ClauseFragment { sql, values })
    }
}
