//! Search filter compilation and key validation.
//!
//! Each filterable entity owns a fixed [`EntityFilters`] table naming the keys
//! callers may use, the column each key targets, and how it is compared:
//!
//! | entity  | key            | column          | fragment                          |
//! |---------|----------------|-----------------|-----------------------------------|
//! | job     | `title`        | `title`         | `LOWER(title) LIKE LOWER($i)`     |
//! | job     | `minSalary`    | `salary`        | `salary >= $i`                    |
//! | job     | `hasEquity`    | `equity`        | `equity > $i` / `equity >= $i`    |
//! | company | `name`         | `name`          | `LOWER(name) LIKE LOWER($i)`      |
//! | company | `minEmployees` | `num_employees` | `num_employees >= $i`             |
//! | company | `maxEmployees` | `num_employees` | `num_employees <= $i`             |
//!
//! Substring values are wrapped as `%value%`. The equity flag binds numeric zero:
//! `true` requires equity strictly above zero, `false` only requires a
//! non-negative equity.

use super::value::SqlValue;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use rust_decimal::Decimal;

/// A caller-supplied filter value, already coerced to its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i32),
    Bool(bool),
}

impl FilterValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Ordered mapping of filter key to value for one search request.
///
/// Keys keep their insertion order, which becomes the placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSet::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a key. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when the set is exactly `{hasEquity: false}`.
    ///
    /// That shape asks for no equity constraint at all, so it is not a filter.
    pub fn is_equity_opt_out(&self) -> bool {
        matches!(self.entries.as_slice(), [(k, FilterValue::Bool(false))] if k == "hasEquity")
    }

    /// Build a filter set from an already-validated JSON object, keeping its key order.
    ///
    /// Strings, integers that fit in `i32`, and booleans are accepted; `null`
    /// entries are skipped as absent.
    pub fn from_json(value: &serde_json::Value) -> JoblyResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(JoblyError::validation("filters must be a JSON object"));
        };

        let mut set = Self::new();
        for (key, v) in map {
            let value = match v {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => FilterValue::Text(s.clone()),
                serde_json::Value::Bool(b) => FilterValue::Bool(*b),
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .map(FilterValue::Int)
                    .ok_or_else(|| {
                        JoblyError::validation(format!("filter '{key}' is not a 32-bit integer"))
                    })?,
                _ => {
                    return Err(JoblyError::validation(format!(
                        "filter '{key}' must be a string, integer, or boolean"
                    )));
                }
            };
            set.insert(key.clone(), value);
        }
        Ok(set)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// How a filter key compares its column against the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Case-insensitive substring match on a text column.
    Contains,
    /// Inclusive lower bound.
    AtLeast,
    /// Inclusive upper bound.
    AtMost,
    /// Boolean flag choosing between `> 0` and `>= 0`.
    Positive,
}

/// One allow-listed filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub column: &'static str,
    pub comparison: Comparison,
}

/// The fixed filter table for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityFilters {
    pub entity: &'static str,
    pub fields: &'static [FilterField],
}

pub static JOB_FILTERS: EntityFilters = EntityFilters {
    entity: "job",
    fields: &[
        FilterField {
            key: "title",
            column: "title",
            comparison: Comparison::Contains,
        },
        FilterField {
            key: "minSalary",
            column: "salary",
            comparison: Comparison::AtLeast,
        },
        FilterField {
            key: "hasEquity",
            column: "equity",
            comparison: Comparison::Positive,
        },
    ],
};

pub static COMPANY_FILTERS: EntityFilters = EntityFilters {
    entity: "company",
    fields: &[
        FilterField {
            key: "name",
            column: "name",
            comparison: Comparison::Contains,
        },
        FilterField {
            key: "minEmployees",
            column: "num_employees",
            comparison: Comparison::AtLeast,
        },
        FilterField {
            key: "maxEmployees",
            column: "num_employees",
            comparison: Comparison::AtMost,
        },
    ],
};

/// Whether every key is in `allowed`.
///
/// This is a go/no-go gate; it never rewrites keys.
pub fn keys_allowed<'a>(keys: impl IntoIterator<Item = &'a str>, allowed: &[&str]) -> bool {
    keys.into_iter().all(|k| allowed.contains(&k))
}

/// A compiled `WHERE` predicate (without the `WHERE` keyword) plus its values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

impl EntityFilters {
    pub fn field(&self, key: &str) -> Option<&'static FilterField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn allowed_keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key).collect()
    }

    /// Query key validation for this entity.
    pub fn accepts<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys_allowed(keys, &self.allowed_keys())
    }

    /// Keys in `filters` that this entity does not recognize, in order.
    pub fn invalid_keys(&self, filters: &FilterSet) -> Vec<String> {
        filters
            .keys()
            .filter(|k| self.field(k).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Reject `filters` with [`JoblyError::InvalidFilterKeys`] if any key is foreign.
    pub fn validate(&self, filters: &FilterSet) -> JoblyResult<()> {
        if self.accepts(filters.keys()) {
            return Ok(());
        }
        Err(JoblyError::InvalidFilterKeys(self.invalid_keys(filters)))
    }

    /// Compile `filters` into a `WHERE` predicate.
    ///
    /// Keys are numbered `$1..$n` in the set's order and joined with `AND`.
    /// An empty set compiles to an empty clause.
    pub fn compile(&self, filters: &FilterSet) -> JoblyResult<WhereClause> {
        let plan = filters
            .iter()
            .map(|(key, value)| match self.field(key) {
                Some(field) => Ok((field, value)),
                None => Err(JoblyError::InvalidFilterKeys(vec![key.to_string()])),
            })
            .collect::<JoblyResult<Vec<_>>>()?;

        let mut fragments = Vec::with_capacity(plan.len());
        let mut values = Vec::with_capacity(plan.len());
        for (field, value) in plan {
            let column = Ident::bare(field.column)?.to_sql();
            let idx = values.len() + 1;
            let (fragment, bound) = match (field.comparison, value) {
                (Comparison::Contains, FilterValue::Text(s)) => (
                    format!("LOWER({column}) LIKE LOWER(${idx})"),
                    SqlValue::Text(format!("%{s}%")),
                ),
                (Comparison::AtLeast, FilterValue::Int(n)) => {
                    (format!("{column} >= ${idx}"), SqlValue::Int(*n))
                }
                (Comparison::AtMost, FilterValue::Int(n)) => {
                    (format!("{column} <= ${idx}"), SqlValue::Int(*n))
                }
                (Comparison::Positive, FilterValue::Bool(required)) => {
                    let op = if *required { ">" } else { ">=" };
                    (format!("{column} {op} ${idx}"), SqlValue::Numeric(Decimal::ZERO))
                }
                (comparison, other) => {
                    return Err(JoblyError::validation(format!(
                        "{} filter '{}' does not accept a {} value ({comparison:?})",
                        self.entity,
                        field.key,
                        other.kind()
                    )));
                }
            };
            fragments.push(fragment);
            values.push(bound);
        }

        Ok(WhereClause {
            sql: fragments.join(" AND "),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_filter_wraps_wildcards() {
        let clause = JOB_FILTERS
            .compile(&FilterSet::new().with("title", "3"))
            .unwrap();
        assert_eq!(clause.sql, "LOWER(title) LIKE LOWER($1)");
        assert_eq!(clause.values, vec![SqlValue::from("%3%")]);
    }

    #[test]
    fn job_filters_number_in_given_order() {
        let filters = FilterSet::new()
            .with("minSalary", 299)
            .with("title", "3")
            .with("hasEquity", true);
        let clause = JOB_FILTERS.compile(&filters).unwrap();

        assert_eq!(
            clause.sql,
            "salary >= $1 AND LOWER(title) LIKE LOWER($2) AND equity > $3"
        );
        assert_eq!(
            clause.values,
            vec![
                SqlValue::Int(299),
                SqlValue::from("%3%"),
                SqlValue::Numeric(Decimal::ZERO)
            ]
        );
    }

    #[test]
    fn equity_false_is_non_negative_bound() {
        let filters = FilterSet::new().with("title", "job").with("hasEquity", false);
        let clause = JOB_FILTERS.compile(&filters).unwrap();
        assert_eq!(clause.sql, "LOWER(title) LIKE LOWER($1) AND equity >= $2");
        assert_eq!(clause.values[1], SqlValue::Numeric(Decimal::ZERO));
    }

    #[test]
    fn company_filters_use_employee_bounds() {
        let filters = FilterSet::new()
            .with("name", "ande")
            .with("maxEmployees", 100)
            .with("minEmployees", 20);
        let clause = COMPANY_FILTERS.compile(&filters).unwrap();

        assert_eq!(
            clause.sql,
            "LOWER(name) LIKE LOWER($1) AND num_employees <= $2 AND num_employees >= $3"
        );
        assert_eq!(
            clause.values,
            vec![SqlValue::from("%ande%"), SqlValue::Int(100), SqlValue::Int(20)]
        );
    }

    #[test]
    fn placeholders_match_values() {
        let filters = FilterSet::new()
            .with("hasEquity", false)
            .with("minSalary", 1)
            .with("title", "a");
        let clause = JOB_FILTERS.compile(&filters).unwrap();
        assert_eq!(clause.sql.matches('$').count(), clause.values.len());
        for i in 1..=clause.values.len() {
            assert!(clause.sql.contains(&format!("${i}")));
        }
    }

    #[test]
    fn empty_set_compiles_to_empty_clause() {
        let clause = JOB_FILTERS.compile(&FilterSet::new()).unwrap();
        assert!(clause.is_empty());
        assert!(clause.values.is_empty());
    }

    #[test]
    fn mistyped_value_is_rejected() {
        let err = JOB_FILTERS
            .compile(&FilterSet::new().with("minSalary", "lots"))
            .unwrap_err();
        assert!(err.is_validation());

        let err = COMPANY_FILTERS
            .compile(&FilterSet::new().with("name", 5))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn compile_refuses_unknown_key() {
        let err = COMPANY_FILTERS
            .compile(&FilterSet::new().with("title", "x"))
            .unwrap_err();
        assert!(err.is_invalid_filter());
    }

    #[test]
    fn validator_accepts_allow_listed_keys() {
        assert!(keys_allowed(["title", "minSalary"], &["title", "minSalary", "hasEquity"]));
        assert!(keys_allowed([], &["title"]));
        assert!(JOB_FILTERS.accepts(["hasEquity", "title", "minSalary"]));
        assert!(COMPANY_FILTERS.accepts(["name", "maxEmployees", "minEmployees"]));
    }

    #[test]
    fn validator_rejects_foreign_keys() {
        assert!(!keys_allowed(["title", "color"], &["title", "minSalary"]));
        assert!(!JOB_FILTERS.accepts(["name"]));
        assert!(!COMPANY_FILTERS.accepts(["name", "minSalary"]));
    }

    #[test]
    fn validate_reports_every_invalid_key() {
        let filters = FilterSet::new()
            .with("title", "x")
            .with("color", "red")
            .with("size", 3);
        match JOB_FILTERS.validate(&filters) {
            Err(JoblyError::InvalidFilterKeys(keys)) => assert_eq!(keys, ["color", "size"]),
            other => panic!("expected InvalidFilterKeys, got {other:?}"),
        }
    }

    #[test]
    fn equity_opt_out_is_only_the_lone_false_flag() {
        assert!(FilterSet::new().with("hasEquity", false).is_equity_opt_out());
        assert!(!FilterSet::new().with("hasEquity", true).is_equity_opt_out());
        assert!(!FilterSet::new()
            .with("hasEquity", false)
            .with("title", "a")
            .is_equity_opt_out());
        assert!(!FilterSet::new().is_equity_opt_out());
    }

    #[test]
    fn from_json_keeps_typed_values() {
        let filters = FilterSet::from_json(&serde_json::json!({
            "title": "3",
            "minSalary": 299,
            "hasEquity": true,
            "ignored": null
        }))
        .unwrap();

        assert_eq!(filters.len(), 3);
        assert_eq!(filters.get("title"), Some(&FilterValue::from("3")));
        assert_eq!(filters.get("minSalary"), Some(&FilterValue::Int(299)));
        assert_eq!(filters.get("hasEquity"), Some(&FilterValue::Bool(true)));
        assert!(filters.get("ignored").is_none());
    }

    #[test]
    fn from_json_keeps_object_key_order() {
        let filters = FilterSet::from_json(&serde_json::json!({
            "title": "3",
            "minSalary": 299
        }))
        .unwrap();
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["title", "minSalary"]);

        let clause = JOB_FILTERS.compile(&filters).unwrap();
        assert_eq!(clause.sql, "LOWER(title) LIKE LOWER($1) AND salary >= $2");
        assert_eq!(clause.values, vec![SqlValue::from("%3%"), SqlValue::Int(299)]);
    }

    #[test]
    fn from_json_rejects_unsupported_values() {
        assert!(FilterSet::from_json(&serde_json::json!(["title"])).is_err());
        assert!(FilterSet::from_json(&serde_json::json!({"minSalary": 1.5})).is_err());
        assert!(FilterSet::from_json(&serde_json::json!({"minSalary": 5_000_000_000_i64})).is_err());
        assert!(FilterSet::from_json(&serde_json::json!({"title": ["a"]})).is_err());
    }
}
