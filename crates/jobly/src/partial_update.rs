//! Partial UPDATE support.
//!
//! [`sql_for_partial_update`] turns whichever fields the caller supplied into the
//! `SET` list of an `UPDATE` statement, so a record can be patched without
//! loading it first.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{ColumnAliases, FieldValues, sql_for_partial_update};
//!
//! let data = FieldValues::new().set("numEmployees", 12).set("name", "Acme");
//! let aliases = ColumnAliases::from([("numEmployees", "num_employees")]);
//!
//! let set = sql_for_partial_update(&data, &aliases)?;
//! assert_eq!(set.sql, r#""num_employees"=$1, "name"=$2"#);
//! ```

use crate::clause::{ClauseFragment, write_quoted_ident};
use crate::error::{JoblyError, JoblyResult};
use crate::value::SqlValue;
use std::collections::HashMap;
use std::fmt::Write;

/// Insertion-ordered field name → new value mapping for a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    fields: Vec<(String, SqlValue)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (chainable). Setting an existing field replaces its value in place.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field. Setting an existing field replaces its value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Reject any field not named in `allowed`.
    pub fn ensure_allowed(&self, allowed: &[&str]) -> JoblyResult<()> {
        match self.fields().find(|f| !allowed.contains(f)) {
            Some(field) => Err(JoblyError::bad_request(format!("Unknown field: {}", field))),
            None => Ok(()),
        }
    }

    /// Build from a decoded request body.
    ///
    /// `null` counts as "no body"; any other non-object is not a mapping. Both are
    /// rejected, as are non-scalar member values.
    pub fn from_json(body: &serde_json::Value) -> JoblyResult<Self> {
        let object = match body {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => return Err(JoblyError::bad_request("No data")),
            _ => return Err(JoblyError::bad_request("Update data must be an object")),
        };

        let mut values = FieldValues::new();
        for (field, value) in object {
            values.insert(field.as_str(), SqlValue::try_from(value)?);
        }
        Ok(values)
    }
}

impl TryFrom<serde_json::Value> for FieldValues {
    type Error = JoblyError;

    fn try_from(body: serde_json::Value) -> JoblyResult<Self> {
        Self::from_json(&body)
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

/// Application field name → storage column name.
///
/// Fields without an entry map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAliases {
    aliases: HashMap<String, String>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias (chainable).
    pub fn alias(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.aliases.insert(field.into(), column.into());
        self
    }

    /// Storage column for `field`.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases.get(field).map(String::as_str).unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ColumnAliases {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Build the `SET` list for a partial update, numbering placeholders from `$1`.
///
/// Produces `"col_a"=$1, "col_b"=$2, ...` in `data` order, with each column
/// resolved through `aliases`. Fails with [`JoblyError::BadRequest`] when `data`
/// is empty.
pub fn sql_for_partial_update(
    data: &FieldValues,
    aliases: &ColumnAliases,
) -> JoblyResult<ClauseFragment> {
    sql_for_partial_update_with_offset(data, aliases, 0)
}

/// Like [`sql_for_partial_update`], but the first placeholder is `$offset+1`.
pub fn sql_for_partial_update_with_offset(
    data: &FieldValues,
    aliases: &ColumnAliases,
    offset: usize,
) -> JoblyResult<ClauseFragment> {
    if data.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut sql = String::new();
    let mut values = Vec::with_capacity(data.len());

    for (i, (field, value)) in data.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write_quoted_ident(&mut sql, aliases.resolve(field));
        let _ = write!(&mut sql, "=${}", offset + i + 1);
        values.push(value.clone());
    }

    Ok(ClauseFragment { sql, values })
}
