use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::ColumnMap;
use crate::row::{FromRow, RowExt};
use crate::sql::{self, COMPANY_FILTERS, FilterSet, FilterValue, UpdateSet, sql_for_partial_update};
use crate::validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COMPANY_COLUMNS: ColumnMap =
    ColumnMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

const COMPANY_FIELDS: &str = "handle, name, num_employees, description, logo_url";

/// A company row; also the summary attached to a job read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    pub description: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            num_employees: row.try_get_column("num_employees")?,
            description: row.try_get_column("description")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl Company {
    fn validate(&self) -> JoblyResult<()> {
        validate::check_length("handle", &self.handle, 1, 25)?;
        validate::check_length("name", &self.name, 1, 255)?;
        validate::check_not_blank("description", &self.description)?;
        if let Some(n) = self.num_employees {
            validate::check_non_negative("numEmployees", n)?;
        }
        if let Some(url) = &self.logo_url {
            validate::check_url("logoUrl", url)?;
        }
        Ok(())
    }
}

/// Partial company update, keyed by API field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    /// The provided fields under their API names (`numEmployees`, `logoUrl`).
    pub fn to_update_set(&self) -> JoblyResult<UpdateSet> {
        let mut set = UpdateSet::new();
        if let Some(name) = &self.name {
            validate::check_length("name", name, 1, 255)?;
            set.insert("name", name.as_str());
        }
        if let Some(num_employees) = self.num_employees {
            if let Some(n) = num_employees {
                validate::check_non_negative("numEmployees", n)?;
            }
            set.insert("numEmployees", num_employees);
        }
        if let Some(description) = &self.description {
            validate::check_not_blank("description", description)?;
            set.insert("description", description.as_str());
        }
        if let Some(logo_url) = &self.logo_url {
            if let Some(url) = logo_url {
                validate::check_url("logoUrl", url)?;
            }
            set.insert("logoUrl", logo_url.clone());
        }
        Ok(set)
    }
}

fn employee_bound(filters: &FilterSet, key: &str) -> Option<i32> {
    match filters.get(key) {
        Some(FilterValue::Int(n)) => Some(*n),
        _ => None,
    }
}

impl Company {
    pub async fn create(conn: &impl GenericClient, data: &Company) -> JoblyResult<Company> {
        data.validate()?;
        let company: Company = sql::query(format!(
            "INSERT INTO companies ({COMPANY_FIELDS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_FIELDS}"
        ))
        .bind(data.handle.clone())
        .bind(data.name.clone())
        .bind(data.num_employees)
        .bind(data.description.clone())
        .bind(data.logo_url.clone())
        .fetch_one_as(conn)
        .await?;

        tracing::debug!(target: "jobly.models", handle = %company.handle, "created company");
        Ok(company)
    }

    /// List companies matching `filters`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filters: &FilterSet,
    ) -> JoblyResult<Vec<Company>> {
        if filters.is_empty() {
            return sql::query(format!("SELECT {COMPANY_FIELDS} FROM companies ORDER BY name"))
                .fetch_all_as(conn)
                .await;
        }

        if let Err(err) = COMPANY_FILTERS.validate(filters) {
            tracing::warn!(
                target: "jobly.models",
                entity = "company",
                error = %err,
                "rejected filters"
            );
            return Err(err);
        }
        let min = employee_bound(filters, "minEmployees");
        let max = employee_bound(filters, "maxEmployees");
        if matches!((min, max), (Some(min), Some(max)) if min > max) {
            return Err(JoblyError::validation(
                "minEmployees cannot be greater than maxEmployees",
            ));
        }

        let clause = COMPANY_FILTERS.compile(filters)?;
        tracing::debug!(target: "jobly.models", predicate = %clause.sql, "listing companies");
        sql::query(format!(
            "SELECT {COMPANY_FIELDS} FROM companies WHERE {} ORDER BY name",
            clause.sql
        ))
        .bind_values(clause.values)
        .fetch_all_as(conn)
        .await
    }

    /// The company summary for `handle`.
    pub async fn get_summary(conn: &impl GenericClient, handle: &str) -> JoblyResult<Company> {
        sql::query(format!("SELECT {COMPANY_FIELDS} FROM companies WHERE handle = $1"))
            .bind(handle.to_string())
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }

    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        data: &CompanyUpdate,
    ) -> JoblyResult<Company> {
        let set = data.to_update_set()?;
        let clause = sql_for_partial_update(&set, &COMPANY_COLUMNS)?;
        let handle_idx = clause.next_placeholder();

        let company = sql::query(format!(
            "UPDATE companies SET {} WHERE handle = ${handle_idx} RETURNING {COMPANY_FIELDS}",
            clause.sql
        ))
        .bind_values(clause.values)
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        tracing::debug!(target: "jobly.models", %handle, "updated company");
        Ok(company)
    }
}
