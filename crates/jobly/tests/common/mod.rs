#![allow(dead_code)]

use jobly::{JoblyError, JoblyResult, migrate};
use tokio_postgres::{Client, NoTls, Transaction};

/// Serializes fixture setup across tests sharing one database.
const FIXTURE_LOCK: i64 = 0x6a6f_626c_79;

/// Connect to `DATABASE_URL`, or `None` when it is not set.
pub async fn connect(test_name: &str) -> JoblyResult<Option<Client>> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping {test_name}");
        return Ok(None);
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

pub async fn begin(client: &mut Client) -> JoblyResult<Transaction<'_>> {
    client.transaction().await.map_err(JoblyError::from_db_error)
}

/// Ids of Job1..Job4, in that order.
pub struct Fixture {
    pub job_ids: Vec<i32>,
}

impl Fixture {
    pub fn job(&self, n: usize) -> i32 {
        self.job_ids[n - 1]
    }
}

/// Create the schema and the shared rows inside `tx`.
///
/// Companies c1..c3, users u1..u4, jobs Job1..Job4 (all owned by c1) and one
/// application (u1 -> Job1). Everything disappears when `tx` rolls back.
pub async fn seed(tx: &Transaction<'_>) -> JoblyResult<Fixture> {
    tx.execute("SELECT pg_advisory_xact_lock($1)", &[&FIXTURE_LOCK])
        .await
        .map_err(JoblyError::from_db_error)?;
    migrate::apply_schema(tx).await?;

    tx.batch_execute(
        "DELETE FROM applications;
         DELETE FROM jobs;
         DELETE FROM users;
         DELETE FROM companies;

         INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

         INSERT INTO users (username, password, first_name, last_name, email, is_admin)
         VALUES ('u1', 'password1', 'U1F', 'U1L', 'user1@user.com', FALSE),
                ('u2', 'password2', 'U2F', 'U2L', 'user2@user.com', FALSE),
                ('u3', 'password3', 'U3F', 'U3L', 'user3@user.com', FALSE),
                ('u4', 'password4', 'U4F', 'U4L', 'user4@user.com', TRUE);",
    )
    .await
    .map_err(JoblyError::from_db_error)?;

    let rows = tx
        .query(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ('Job1', 100, '0.1', 'c1'),
                    ('Job2', 200, '0.2', 'c1'),
                    ('Job3', 300, '0', 'c1'),
                    ('Job4', NULL, NULL, 'c1')
             RETURNING id",
            &[],
        )
        .await
        .map_err(JoblyError::from_db_error)?;
    let job_ids: Vec<i32> = rows.iter().map(|r| r.get("id")).collect();

    tx.execute(
        "INSERT INTO applications (username, job_id) VALUES ('u1', $1)",
        &[&job_ids[0]],
    )
    .await
    .map_err(JoblyError::from_db_error)?;

    Ok(Fixture { job_ids })
}

pub fn titles(jobs: &[jobly::Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}
