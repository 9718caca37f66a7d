use super::Company;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::ColumnMap;
use crate::row::{FromRow, RowExt};
use crate::sql::{self, FilterSet, JOB_FILTERS, UpdateSet, WhereClause, sql_for_partial_update};
use crate::validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Job fields already use column names.
const JOB_COLUMNS: ColumnMap = ColumnMap::identity();

const UPDATABLE: &[&str] = &["title", "salary", "equity"];

const JOB_FIELDS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A single job with its owning company attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> JoblyResult<()> {
        validate::check_length("title", &self.title, 1, 255)?;
        if let Some(salary) = self.salary {
            validate::check_non_negative("salary", salary)?;
        }
        if let Some(equity) = self.equity {
            validate::check_equity(equity)?;
        }
        validate::check_length("companyHandle", &self.company_handle, 1, 25)
    }
}

/// Partial job update. `salary`/`equity` use `Some(None)` to clear the column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::present")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn validate(&self) -> JoblyResult<()> {
        if let Some(title) = &self.title {
            validate::check_length("title", title, 1, 255)?;
        }
        if let Some(Some(salary)) = self.salary {
            validate::check_non_negative("salary", salary)?;
        }
        if let Some(Some(equity)) = self.equity {
            validate::check_equity(equity)?;
        }
        Ok(())
    }

    /// The provided fields, in the order title, salary, equity.
    pub fn to_update_set(&self) -> JoblyResult<UpdateSet> {
        self.validate()?;
        let mut set = UpdateSet::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(salary) = self.salary {
            set.insert("salary", salary);
        }
        if let Some(equity) = self.equity {
            set.insert("equity", equity);
        }
        Ok(set)
    }
}

/// How a job search runs: unfiltered, or with a compiled predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum JobListing {
    All,
    Filtered(WhereClause),
}

impl JobListing {
    /// `{}` and the lone `{hasEquity: false}` list everything; any other set is
    /// validated against the job keys and compiled.
    pub fn plan(filters: &FilterSet) -> JoblyResult<Self> {
        if filters.is_empty() || filters.is_equity_opt_out() {
            return Ok(Self::All);
        }
        if let Err(err) = JOB_FILTERS.validate(filters) {
            tracing::warn!(target: "jobly.models", entity = "job", error = %err, "rejected filters");
            return Err(err);
        }
        Ok(Self::Filtered(JOB_FILTERS.compile(filters)?))
    }

    fn into_query(self) -> sql::Query {
        match self {
            Self::All => sql::query(format!("SELECT {JOB_FIELDS} FROM jobs ORDER BY title")),
            Self::Filtered(clause) => sql::query(format!(
                "SELECT {JOB_FIELDS} FROM jobs WHERE {} ORDER BY title",
                clause.sql
            ))
            .bind_values(clause.values),
        }
    }
}

impl Job {
    /// Insert a job and return it with its generated id.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        data.validate()?;
        let job: Job = sql::query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {JOB_FIELDS}"
        ))
        .bind(data.title.clone())
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle.clone())
        .fetch_one_as(conn)
        .await?;

        tracing::debug!(
            target: "jobly.models",
            job_id = job.id,
            company = %job.company_handle,
            "created job"
        );
        Ok(job)
    }

    /// List jobs matching `filters`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filters: &FilterSet) -> JoblyResult<Vec<Job>> {
        let listing = JobListing::plan(filters)?;
        let keys: Vec<&str> = filters.keys().collect();
        tracing::debug!(
            target: "jobly.models",
            filtered = matches!(listing, JobListing::Filtered(_)),
            ?keys,
            "listing jobs"
        );
        listing.into_query().fetch_all_as(conn).await
    }

    /// Jobs posted by one company, ordered by id.
    pub async fn find_by_company(conn: &impl GenericClient, handle: &str) -> JoblyResult<Vec<Job>> {
        sql::query(format!(
            "SELECT {JOB_FIELDS} FROM jobs WHERE company_handle = $1 ORDER BY id"
        ))
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await
    }

    /// Fetch one job and its company. Issues two statements.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        let job: Job = sql::query(format!("SELECT {JOB_FIELDS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("Job {id} not found")))?;

        let company = Company::get_summary(conn, &job.company_handle).await?;
        Ok(JobDetail { job, company })
    }

    pub async fn update(conn: &impl GenericClient, id: i32, data: &JobUpdate) -> JoblyResult<Job> {
        let set = data.to_update_set()?;
        Self::update_fields(conn, id, &set).await
    }

    /// Apply an already-built update set. Only title, salary and equity may appear.
    pub async fn update_fields(
        conn: &impl GenericClient,
        id: i32,
        data: &UpdateSet,
    ) -> JoblyResult<Job> {
        if let Some(field) = data.fields().find(|f| !UPDATABLE.contains(f)) {
            return Err(JoblyError::validation(format!(
                "job field '{field}' cannot be updated"
            )));
        }

        let clause = sql_for_partial_update(data, &JOB_COLUMNS)?;
        let id_idx = clause.next_placeholder();
        let job = sql::query(format!(
            "UPDATE jobs SET {} WHERE id = ${id_idx} RETURNING {JOB_FIELDS}",
            clause.sql
        ))
        .bind_values(clause.values)
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;

        let fields: Vec<&str> = data.fields().collect();
        tracing::debug!(target: "jobly.models", job_id = id, ?fields, "updated job");
        Ok(job)
    }

    /// Delete a job, returning its id.
    pub async fn delete(conn: &impl GenericClient, id: i32) -> JoblyResult<i32> {
        let row = sql::query("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;

        tracing::debug!(target: "jobly.models", job_id = id, "deleted job");
        row.try_get_column("id")
    }
}
