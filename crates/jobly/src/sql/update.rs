//! Partial update compilation: an ordered field/value set becomes a `SET` clause.

use super::value::SqlValue;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::{ColumnMap, Ident};

/// Ordered mapping of field name to new value.
///
/// Insertion order is the placeholder order. Setting a field twice replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSet {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`UpdateSet::insert`].
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for UpdateSet
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// A compiled `SET` clause: `"col1"=$1, "col2"=$2, ...` plus its values.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl SetClause {
    /// Index of the first placeholder free for the statement's own parameters.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Compile an update set into a `SET` clause.
///
/// Column names go through `columns` and are always emitted quoted. Fails with
/// [`JoblyError::Validation`] when `data` is empty.
pub fn sql_for_partial_update(data: &UpdateSet, columns: &ColumnMap) -> JoblyResult<SetClause> {
    if data.is_empty() {
        return Err(JoblyError::validation("no data supplied"));
    }

    let mut sql = String::new();
    let mut values = Vec::with_capacity(data.len());
    for (field, value) in data.iter() {
        if !values.is_empty() {
            sql.push_str(", ");
        }
        Ident::quoted(columns.column(field))?.write_sql(&mut sql);
        values.push(value.clone());
        sql.push_str(&format!("=${}", values.len()));
    }

    Ok(SetClause { sql, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const USER_COLUMNS: ColumnMap =
        ColumnMap::new(&[("firstName", "first_name"), ("isAdmin", "is_admin")]);

    #[test]
    fn maps_fields_and_numbers_placeholders() {
        let data = UpdateSet::new().set("firstName", "Aliya").set("age", 32);
        let clause = sql_for_partial_update(&data, &USER_COLUMNS).unwrap();

        assert_eq!(clause.sql, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(clause.values, vec![SqlValue::from("Aliya"), SqlValue::Int(32)]);
        assert_eq!(clause.next_placeholder(), 3);
    }

    #[test]
    fn keeps_insertion_order() {
        let data = UpdateSet::new()
            .set("equity", Decimal::new(4444, 5))
            .set("title", "updated title")
            .set("salary", 42069);
        let clause = sql_for_partial_update(&data, &ColumnMap::identity()).unwrap();

        assert_eq!(clause.sql, r#""equity"=$1, "title"=$2, "salary"=$3"#);
        assert_eq!(clause.values[0], SqlValue::Numeric(Decimal::new(4444, 5)));
        assert_eq!(clause.values[1], SqlValue::from("updated title"));
        assert_eq!(clause.values[2], SqlValue::Int(42069));
    }

    #[test]
    fn placeholder_count_matches_field_count() {
        for n in 1..=6 {
            let data: UpdateSet = (0..n).map(|i| (format!("f{i}"), i)).collect();
            let clause = sql_for_partial_update(&data, &ColumnMap::identity()).unwrap();
            assert_eq!(clause.values.len(), n as usize);
            assert_eq!(clause.sql.matches('$').count(), n as usize);
            for i in 0..n {
                assert!(clause.sql.contains(&format!(r#""f{i}"=${}"#, i + 1)));
                assert_eq!(clause.values[i as usize], SqlValue::Int(i));
            }
        }
    }

    #[test]
    fn null_values_are_bound_not_inlined() {
        let data = UpdateSet::new().set("salary", None::<i32>);
        let clause = sql_for_partial_update(&data, &ColumnMap::identity()).unwrap();
        assert_eq!(clause.sql, r#""salary"=$1"#);
        assert_eq!(clause.values, vec![SqlValue::Null]);
    }

    #[test]
    fn reinserting_a_field_keeps_its_position() {
        let data = UpdateSet::new()
            .set("title", "a")
            .set("salary", 1)
            .set("title", "b");
        assert_eq!(data.fields().collect::<Vec<_>>(), ["title", "salary"]);
        assert_eq!(data.get("title"), Some(&SqlValue::from("b")));
    }

    #[test]
    fn hostile_field_name_stays_inside_identifier() {
        let data = UpdateSet::new().set(r#"title"=$1; DROP TABLE jobs; --"#, "x");
        let clause = sql_for_partial_update(&data, &ColumnMap::identity()).unwrap();
        assert_eq!(clause.sql, r#""title""=$1; DROP TABLE jobs; --"=$1"#);
        assert_eq!(clause.values.len(), 1);
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = sql_for_partial_update(&UpdateSet::new(), &USER_COLUMNS).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation error: no data supplied");
    }
}
