//! Companies.

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

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Fields a company update may touch.
pub const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

/// Storage columns for camelCase update fields.
pub fn column_aliases() -> ColumnAliases {
    ColumnAliases::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// Company search criteria. Absent members do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
    pub name: Option<String>,
}

impl CompanyFilter {
    /// WHERE clause for this filter, or `None` when nothing is set.
    pub fn to_where(&self) -> Option<ClauseFragment> {
        let mut b = FilterBuilder::new();
        b.min("num_employees", self.min_employees)
            .max("num_employees", self.max_employees)
            .contains("name", self.name.as_deref());
        b.build()
    }

    fn validate(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::bad_request(
                    "Min employees cannot be greater than max",
                ));
            }
        }
        Ok(())
    }
}

/// Create a company.
///
/// Fails with [`JoblyError::BadRequest`] if the handle is taken.
pub async fn create(conn: &impl GenericClient, company: &Company) -> JoblyResult<Company> {
    let duplicate = query("SELECT handle FROM companies WHERE handle = $1")
        .bind(company.handle.clone())
        .fetch_opt(conn)
        .await?;
    if duplicate.is_some() {
        return Err(JoblyError::bad_request(format!(
            "Duplicate company: {}",
            company.handle
        )));
    }

    query(format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(company.handle.clone())
    .bind(company.name.clone())
    .bind(company.description.clone())
    .bind(company.num_employees)
    .bind(company.logo_url.clone())
    .fetch_one_as(conn)
    .await
}

/// All companies matching `filter`, ordered by name.
pub async fn find_all(
    conn: &impl GenericClient,
    filter: Option<&CompanyFilter>,
) -> JoblyResult<Vec<Company>> {
    if let Some(filter) = filter {
        filter.validate()?;
    }

    let base = format!("SELECT {COLUMNS} FROM companies");
    search_query(&base, filter.and_then(CompanyFilter::to_where), "name")
        .fetch_all_as(conn)
        .await
}

/// A company and its jobs.
pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
    let company: Company = query(format!("SELECT {COLUMNS} FROM companies WHERE handle = $1"))
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(handle))?;

    let jobs = query("SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id")
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

    Ok(CompanyDetail { company, jobs })
}

/// Patch a company with whichever fields `data` carries.
pub async fn update(
    conn: &impl GenericClient,
    handle: &str,
    data: &FieldValues,
) -> JoblyResult<Company> {
    let set = sql_for_partial_update(data, &column_aliases())?;
    data.ensure_allowed(UPDATABLE_FIELDS)?;

    update_query("companies", &set, "handle", COLUMNS)
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(handle))
}

/// Delete a company (its jobs go with it).
pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
    query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
        .bind(handle.to_string())
        .fetch_opt(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found(handle))
}

fn not_found(handle: &str) -> JoblyError {
    tracing::debug!(target: "jobly.models", handle, "company not found");
    JoblyError::not_found(format!("No company: {}", handle))
}
