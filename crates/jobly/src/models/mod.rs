//! Record access for companies and jobs.
//!
//! Every operation takes `&impl GenericClient`, so it can run on a plain
//! connection, a pooled one, or inside a transaction.

pub mod company;
pub mod job;

pub use company::{Company, CompanyDetail, CompanyFilter, CompanyJob};
pub use job::{Job, JobDetail, JobFilter, JobListing, NewJob};

use crate::clause::ClauseFragment;
use crate::query::{Query, query};

/// `base [WHERE <filter>] ORDER BY <order_by>`.
fn search_query(base: &str, filter: Option<ClauseFragment>, order_by: &str) -> Query {
    let mut sql = String::from(base);
    if let Some(filter) = &filter {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.sql);
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order_by);

    match &filter {
        Some(filter) => query(sql).bind_fragment(filter),
        None => query(sql),
    }
}

/// `UPDATE <table> SET <set> WHERE <key>=$<n> RETURNING <returning>`.
///
/// `n` is the slot right after the SET values; the caller binds the key last.
fn update_query(table: &str, set: &ClauseFragment, key: &str, returning: &str) -> Query {
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        set.sql,
        key,
        set.len() + 1,
        returning
    );
    query(sql).bind_fragment(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn search_without_filter_is_the_base_statement() {
        let q = search_query("SELECT id FROM jobs", None, "title");
        assert_eq!(q.sql(), "SELECT id FROM jobs ORDER BY title");
        assert_eq!(q.param_count(), 0);
    }

    #[test]
    fn search_with_filter_splices_where() {
        let filter = ClauseFragment::new("salary >= $1", vec![SqlValue::Int(2500)]);
        let q = search_query("SELECT id FROM jobs", Some(filter), "title");
        assert_eq!(q.sql(), "SELECT id FROM jobs WHERE salary >= $1 ORDER BY title");
        assert_eq!(q.param_count(), 1);
    }

    #[test]
    fn update_key_placeholder_follows_set_values() {
        let set = ClauseFragment::new(
            r#""title"=$1, "salary"=$2"#,
            vec![SqlValue::from("x"), SqlValue::Int(1)],
        );
        let q = update_query("jobs", &set, "id", "id").bind(7_i32);
        assert_eq!(
            q.sql(),
            r#"UPDATE jobs SET "title"=$1, "salary"=$2 WHERE id = $3 RETURNING id"#
        );
        assert_eq!(q.param_count(), 3);
    }
}
