//! SQL text assembly: pre-numbered queries, bound values, and the filter and
//! partial-update compilers.
//!
//! Every compiler returns SQL text with `$1, $2, ...` placeholders together with
//! an ordered `Vec<SqlValue>` where placeholder `$i` is bound to `values[i - 1]`.
//! Column names only ever come from fixed tables; caller input lands in values.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql::{self, FilterSet, JOB_FILTERS};
//!
//! let filters = FilterSet::new().with("title", "engineer").with("minSalary", 50_000);
//! let clause = JOB_FILTERS.compile(&filters)?;
//!
//! let jobs: Vec<Job> = sql::query(format!("SELECT * FROM jobs WHERE {} ORDER BY title", clause.sql))
//!     .bind_values(clause.values)
//!     .fetch_all_as(&conn)
//!     .await?;
//! ```

pub mod filter;
mod query;
pub mod update;
mod value;

pub use filter::{
    COMPANY_FILTERS, Comparison, EntityFilters, FilterField, FilterSet, FilterValue, JOB_FILTERS,
    WhereClause, keys_allowed,
};
pub use query::Query;
pub use update::{SetClause, UpdateSet, sql_for_partial_update};
pub use value::SqlValue;

/// Build a SQL query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(initial_sql: impl Into<String>) -> Query {
    Query::new(initial_sql)
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_skips_comments_and_parens() {
        assert_eq!(strip_sql_prefix("  -- note\n SELECT 1"), "SELECT 1");
        assert_eq!(strip_sql_prefix("/* a */ (SELECT 1)"), "SELECT 1)");
        assert_eq!(strip_sql_prefix("-- only a comment"), "");
        assert_eq!(strip_sql_prefix("/* unclosed"), "");
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(starts_with_keyword("update jobs SET", "UPDATE"));
        assert!(!starts_with_keyword("UP", "UPDATE"));
    }
}
