//! Jobs.

use super::company::Company;
use super::{search_query, update_query};
use crate::clause::ClauseFragment;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::FilterBuilder;
use crate::partial_update::{ColumnAliases, FieldValues, sql_for_partial_update};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

const LISTING_BASE: &str = "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, \
     c.name AS company_name \
     FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle";

/// Fields a job update may touch. A job never moves between companies.
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

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

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job in search results, with its company's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

/// A job with its company in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

/// Job search criteria. Absent members do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
    pub title: Option<String>,
}

impl JobFilter {
    /// WHERE clause for this filter, or `None` when nothing is set.
    ///
    /// `has_equity` only narrows when true; `Some(false)` is the same as absent.
    pub fn to_where(&self) -> Option<ClauseFragment> {
        let mut b = FilterBuilder::new();
        b.min("salary", self.min_salary)
            .flag("equity > 0", self.has_equity)
            .contains("title", self.title.as_deref());
        b.build()
    }
}

pub async fn create(conn: &impl GenericClient, job: &NewJob) -> JoblyResult<Job> {
    query(format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(job.title.clone())
    .bind(job.salary)
    .bind(job.equity)
    .bind(job.company_handle.clone())
    .fetch_one_as(conn)
    .await
}

/// All jobs matching `filter`, ordered by title.
pub async fn find_all(
    conn: &impl GenericClient,
    filter: Option<&JobFilter>,
) -> JoblyResult<Vec<JobListing>> {
    search_query(LISTING_BASE, filter.and_then(JobFilter::to_where), "title")
        .fetch_all_as(conn)
        .await
}

/// A job and the company that posted it.
pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
    let job: Job = query(format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(id))?;

    let company = query(
        "SELECT handle, name, description, num_employees, logo_url \
         FROM companies WHERE handle = $1",
    )
    .bind(job.company_handle.clone())
    .fetch_one_as(conn)
    .await?;

    Ok(JobDetail {
        id: job.id,
        title: job.title,
        salary: job.salary,
        equity: job.equity,
        company,
    })
}

/// Patch a job with whichever fields `data` carries.
///
/// Empty `data` is rejected before the job is looked up.
pub async fn update(conn: &impl GenericClient, id: i32, data: &FieldValues) -> JoblyResult<Job> {
    let set = sql_for_partial_update(data, &ColumnAliases::new())?;
    data.ensure_allowed(UPDATABLE_FIELDS)?;

    update_query("jobs", &set, "id", COLUMNS)
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
    query("DELETE FROM jobs WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_opt(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found(id))
}

fn not_found(id: i32) -> JoblyError {
    tracing::debug!(target: "jobly.models", id, "job not found");
    JoblyError::not_found(format!("No job with ID: {}", id))
}
