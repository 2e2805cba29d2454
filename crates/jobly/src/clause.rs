//! Parameterized clause fragments.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// A partial SQL clause with `$n` placeholders and the values bound to them.
///
/// Placeholder `$k` in [`ClauseFragment::sql`] corresponds to
/// `values[k - offset - 1]`, where `offset` is the index the fragment was built
/// to start after (0 for fragments that stand alone).
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseFragment {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl ClauseFragment {
    pub fn new(sql: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    /// Number of bind values (and placeholders) in this fragment.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Append `name` as a double-quoted identifier, escaping `"` as `""`.
pub(crate) fn write_quoted_ident(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

/// Count the `$n` placeholders in `sql`.
#[cfg(test)]
pub(crate) fn placeholder_numbers(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                out.push(sql[start..end].parse().unwrap());
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_preserves_case_and_escapes_quotes() {
        let mut out = String::new();
        write_quoted_ident(&mut out, "logoUrl");
        out.push(' ');
        write_quoted_ident(&mut out, "odd\"name");
        assert_eq!(out, r#""logoUrl" "odd""name""#);
    }

    #[test]
    fn params_ref_matches_values() {
        let frag = ClauseFragment::new("salary >= $1", vec![SqlValue::Int(1)]);
        assert_eq!(frag.params_ref().len(), 1);
        assert_eq!(frag.len(), 1);
        assert!(!frag.is_empty());
    }

    #[test]
    fn placeholder_scan_finds_numbers_in_order() {
        assert_eq!(
            placeholder_numbers(r#""a"=$1, "b"=$2, "c"=$10"#),
            vec![1, 2, 10]
        );
        assert!(placeholder_numbers("equity > 0").is_empty());
    }
}
