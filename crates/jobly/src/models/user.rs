use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::ColumnMap;
use crate::row::{FromRow, RowExt};
use crate::sql::{self, UpdateSet, sql_for_partial_update};
use crate::validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const USER_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

const USER_FIELDS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// A user plus the ids of the jobs they applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// The provided fields under their API names (`firstName`, `lastName`, `isAdmin`).
    pub fn to_update_set(&self) -> JoblyResult<UpdateSet> {
        let mut set = UpdateSet::new();
        if let Some(first_name) = &self.first_name {
            validate::check_length("firstName", first_name, 1, 30)?;
            set.insert("firstName", first_name.as_str());
        }
        if let Some(last_name) = &self.last_name {
            validate::check_length("lastName", last_name, 1, 30)?;
            set.insert("lastName", last_name.as_str());
        }
        if let Some(email) = &self.email {
            validate::check_email("email", email)?;
            set.insert("email", email.as_str());
        }
        if let Some(is_admin) = self.is_admin {
            set.insert("isAdmin", is_admin);
        }
        Ok(set)
    }
}

impl User {
    pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<UserDetail> {
        let user: User = sql::query(format!("SELECT {USER_FIELDS} FROM users WHERE username = $1"))
            .bind(username.to_string())
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

        let rows = sql::query("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
            .bind(username.to_string())
            .fetch_all(conn)
            .await?;
        let jobs = rows
            .iter()
            .map(|row| row.try_get_column("job_id"))
            .collect::<JoblyResult<Vec<i32>>>()?;

        Ok(UserDetail { user, jobs })
    }

    pub async fn update(
        conn: &impl GenericClient,
        username: &str,
        data: &UserUpdate,
    ) -> JoblyResult<User> {
        let set = data.to_update_set()?;
        let clause = sql_for_partial_update(&set, &USER_COLUMNS)?;
        let username_idx = clause.next_placeholder();

        let user = sql::query(format!(
            "UPDATE users SET {} WHERE username = ${username_idx} RETURNING {USER_FIELDS}",
            clause.sql
        ))
        .bind_values(clause.values)
        .bind(username.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

        tracing::debug!(target: "jobly.models", %username, "updated user");
        Ok(user)
    }

    /// Record an application, returning the job id.
    pub async fn apply_to_job(
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
    ) -> JoblyResult<i32> {
        sql::query("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {job_id}")))?;

        sql::query("SELECT username FROM users WHERE username = $1")
            .bind(username.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No username: {username}")))?;

        sql::query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
            .bind(job_id)
            .bind(username.to_string())
            .execute(conn)
            .await?;

        tracing::debug!(target: "jobly.models", %username, job_id, "applied to job");
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlValue;

    #[test]
    fn update_maps_camel_case_fields() {
        let update = UserUpdate {
            first_name: Some("Aliya".to_string()),
            is_admin: Some(true),
            ..Default::default()
        };
        let set = update.to_update_set().unwrap();
        let clause = sql_for_partial_update(&set, &USER_COLUMNS).unwrap();
        assert_eq!(clause.sql, r#""first_name"=$1, "is_admin"=$2"#);
        assert_eq!(clause.values, vec![SqlValue::from("Aliya"), SqlValue::Bool(true)]);
        assert_eq!(clause.next_placeholder(), 3);
    }

    #[test]
    fn email_field_passes_through_unmapped() {
        let update = UserUpdate {
            email: Some("new@email.com".to_string()),
            ..Default::default()
        };
        let clause = sql_for_partial_update(&update.to_update_set().unwrap(), &USER_COLUMNS)
            .unwrap();
        assert_eq!(clause.sql, r#""email"=$1"#);
    }

    #[test]
    fn update_rejects_malformed_email() {
        let update = UserUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(update.to_update_set().unwrap_err().is_validation());
    }

    #[test]
    fn empty_update_fails_to_compile() {
        let set = UserUpdate::default().to_update_set().unwrap();
        let err = sql_for_partial_update(&set, &USER_COLUMNS).unwrap_err();
        assert!(err.is_validation());
    }
}
