//! Record access against a live database.
//!
//! Each test seeds temp tables inside a transaction and rolls it back, so the
//! target database is left untouched. Skipped when `DATABASE_URL` is not set.

#![allow(unused_variables)]

use jobly::models::company::{self, Company, CompanyFilter};
use jobly::models::job::{self, JobFilter, NewJob};
use jobly::{FieldValues, JoblyError, JoblyResult, query};
use rust_decimal::Decimal;
use serde_json::json;
use tokio_postgres::{NoTls, Transaction};

const SCHEMA: &str = "
CREATE TEMP TABLE companies (
  handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
  name TEXT UNIQUE NOT NULL,
  num_employees INTEGER CHECK (num_employees >= 0),
  description TEXT NOT NULL,
  logo_url TEXT
) ON COMMIT DROP;

CREATE TEMP TABLE jobs (
  id SERIAL PRIMARY KEY,
  title TEXT NOT NULL,
  salary INTEGER CHECK (salary >= 0),
  equity NUMERIC CHECK (equity <= 1.0),
  company_handle VARCHAR(25) NOT NULL REFERENCES companies ON DELETE CASCADE
) ON COMMIT DROP;

INSERT INTO companies (handle, name, num_employees, description, logo_url)
VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
       ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
       ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

INSERT INTO jobs (title, salary, equity, company_handle)
VALUES ('J1', 1000, '0.15', 'c1'),
       ('J2', 2000, '0.1', 'c1'),
       ('J3', 3000, '0', 'c2'),
       ('J4', NULL, NULL, 'c2');
";

async fn connect(test: &str) -> JoblyResult<Option<tokio_postgres::Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

/// Seed the temp schema; returns job ids for J1..J4.
async fn seed(tx: &Transaction<'_>) -> JoblyResult<Vec<i32>> {
    tx.batch_execute(SCHEMA)
        .await
        .map_err(JoblyError::from_db_error)?;
    let rows = query("SELECT id FROM jobs ORDER BY title").fetch_all(tx).await?;
    Ok(rows.iter().map(|r| r.get::<_, i32>("id")).collect())
}

macro_rules! db_test {
    ($name:ident, |$tx:ident, $ids:ident| $body:block) => {
        #[tokio::test]
        async fn $name() -> JoblyResult<()> {
            let Some(mut client) = connect(stringify!($name)).await? else {
                return Ok(());
            };
            let $tx = client
                .transaction()
                .await
                .map_err(JoblyError::from_db_error)?;
            let $ids = seed(&$tx).await?;
            $body
            $tx.rollback().await.map_err(JoblyError::from_db_error)?;
            Ok(())
        }
    };
}

fn titles(listings: &[job::JobListing]) -> Vec<&str> {
    listings.iter().map(|j| j.title.as_str()).collect()
}

fn job_filter(value: serde_json::Value) -> JobFilter {
    serde_json::from_value(value).unwrap()
}

// ==================== Jobs ====================

db_test!(job_create, |tx, ids| {
    let created = job::create(
        &tx,
        &NewJob {
            title: "Test Job".into(),
            salary: Some(55555),
            equity: Some(Decimal::new(13, 2)),
            company_handle: "c2".into(),
        },
    )
    .await?;
    assert_eq!(created.title, "Test Job");
    assert_eq!(created.salary, Some(55555));
    assert_eq!(created.equity, Some(Decimal::new(13, 2)));
    assert_eq!(created.company_handle, "c2");
    assert!(!ids.contains(&created.id));
});

db_test!(job_create_for_missing_company_is_fk_violation, |tx, ids| {
    let err = job::create(
        &tx,
        &NewJob {
            title: "Orphan".into(),
            salary: None,
            equity: None,
            company_handle: "nope".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)));
    assert_eq!(err.http_status(), 400);
});

db_test!(job_find_all_without_filter, |tx, ids| {
    let all = job::find_all(&tx, None).await?;
    assert_eq!(titles(&all), vec!["J1", "J2", "J3", "J4"]);
    assert_eq!(all[0].company_name.as_deref(), Some("C1"));
    assert_eq!(all[3].salary, None);

    let empty_bag = job::find_all(&tx, Some(&JobFilter::default())).await?;
    assert_eq!(empty_bag, all);
});

db_test!(job_find_all_min_salary, |tx, ids| {
    let jobs = job::find_all(&tx, Some(&job_filter(json!({"minSalary": 2500})))).await?;
    assert_eq!(titles(&jobs), vec!["J3"]);
    assert_eq!(jobs[0].id, ids[2]);
});

db_test!(job_find_all_zero_min_salary_excludes_null_salary, |tx, ids| {
    let jobs = job::find_all(&tx, Some(&job_filter(json!({"minSalary": 0})))).await?;
    assert_eq!(titles(&jobs), vec!["J1", "J2", "J3"]);
});

db_test!(job_find_all_has_equity, |tx, ids| {
    let jobs = job::find_all(&tx, Some(&job_filter(json!({"hasEquity": true})))).await?;
    assert_eq!(titles(&jobs), vec!["J1", "J2"]);
});

db_test!(job_find_all_min_salary_and_equity, |tx, ids| {
    let filter = job_filter(json!({"minSalary": 1500, "hasEquity": true}));
    let jobs = job::find_all(&tx, Some(&filter)).await?;
    assert_eq!(titles(&jobs), vec!["J2"]);
});

db_test!(job_find_all_partial_title, |tx, ids| {
    let jobs = job::find_all(&tx, Some(&job_filter(json!({"title": "1"})))).await?;
    assert_eq!(titles(&jobs), vec!["J1"]);

    let lower = job::find_all(&tx, Some(&job_filter(json!({"title": "j"})))).await?;
    assert_eq!(lower.len(), 4);
});

db_test!(job_find_all_empty_title_matches_all, |tx, ids| {
    let jobs = job::find_all(&tx, Some(&job_filter(json!({"title": ""})))).await?;
    assert_eq!(jobs.len(), 4);
});

db_test!(job_get, |tx, ids| {
    let detail = job::get(&tx, ids[0]).await?;
    assert_eq!(detail.title, "J1");
    assert_eq!(detail.salary, Some(1000));
    assert_eq!(detail.equity, Some(Decimal::new(15, 2)));
    assert_eq!(
        detail.company,
        Company {
            handle: "c1".into(),
            name: "C1".into(),
            description: "Desc1".into(),
            num_employees: Some(1),
            logo_url: Some("http://c1.img".into()),
        }
    );
});

db_test!(job_get_missing_is_not_found, |tx, ids| {
    let err = job::get(&tx, 0).await.unwrap_err();
    assert!(err.is_not_found());
});

db_test!(job_update, |tx, ids| {
    let data = FieldValues::try_from(json!({
        "title": "updated",
        "salary": 50000,
        "equity": "0.55",
    }))?;
    let updated = job::update(&tx, ids[0], &data).await?;
    assert_eq!(updated.id, ids[0]);
    assert_eq!(updated.title, "updated");
    assert_eq!(updated.salary, Some(50000));
    assert_eq!(updated.equity, Some(Decimal::new(55, 2)));
    assert_eq!(updated.company_handle, "c1");
});

db_test!(job_update_to_null, |tx, ids| {
    let data = FieldValues::try_from(json!({"salary": null}))?;
    let updated = job::update(&tx, ids[1], &data).await?;
    assert_eq!(updated.salary, None);
    assert_eq!(updated.title, "J2");
});

db_test!(job_update_without_data_is_bad_request, |tx, ids| {
    let err = job::update(&tx, 0, &FieldValues::new()).await.unwrap_err();
    assert!(err.is_bad_request());
});

db_test!(job_update_missing_is_not_found, |tx, ids| {
    let data = FieldValues::new().set("title", "x");
    let err = job::update(&tx, 0, &data).await.unwrap_err();
    assert!(err.is_not_found());
});

db_test!(job_update_cannot_move_company, |tx, ids| {
    let data = FieldValues::new().set("companyHandle", "c3");
    let err = job::update(&tx, ids[0], &data).await.unwrap_err();
    assert!(err.is_bad_request());
});

db_test!(job_remove, |tx, ids| {
    job::remove(&tx, ids[0]).await?;
    let rows = query("SELECT id FROM jobs WHERE id = $1")
        .bind(ids[0])
        .fetch_all(&tx)
        .await?;
    assert!(rows.is_empty());
});

db_test!(job_remove_missing_is_not_found, |tx, ids| {
    let err = job::remove(&tx, 0).await.unwrap_err();
    assert!(err.is_not_found());
});

// ==================== Companies ====================

fn company_filter(value: serde_json::Value) -> CompanyFilter {
    serde_json::from_value(value).unwrap()
}

fn handles(companies: &[Company]) -> Vec<&str> {
    companies.iter().map(|c| c.handle.as_str()).collect()
}

db_test!(company_create_and_duplicate, |tx, ids| {
    let new = Company {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: Some("http://new.img".into()),
    };
    let created = company::create(&tx, &new).await?;
    assert_eq!(created, new);

    let err = company::create(&tx, &new).await.unwrap_err();
    assert!(err.is_bad_request());
});

db_test!(company_find_all_filters, |tx, ids| {
    let all = company::find_all(&tx, None).await?;
    assert_eq!(handles(&all), vec!["c1", "c2", "c3"]);

    let min = company::find_all(&tx, Some(&company_filter(json!({"minEmployees": 2})))).await?;
    assert_eq!(handles(&min), vec!["c2", "c3"]);

    let range = company::find_all(
        &tx,
        Some(&company_filter(json!({"minEmployees": 1, "maxEmployees": 2}))),
    )
    .await?;
    assert_eq!(handles(&range), vec!["c1", "c2"]);

    let name = company::find_all(&tx, Some(&company_filter(json!({"name": "3"})))).await?;
    assert_eq!(handles(&name), vec!["c3"]);

    let none = company::find_all(&tx, Some(&company_filter(json!({"maxEmployees": 0})))).await?;
    assert!(none.is_empty());
});

db_test!(company_find_all_min_above_max, |tx, ids| {
    let filter = company_filter(json!({"minEmployees": 3, "maxEmployees": 1}));
    let err = company::find_all(&tx, Some(&filter)).await.unwrap_err();
    assert!(err.is_bad_request());
});

db_test!(company_get_with_jobs, |tx, ids| {
    let detail = company::get(&tx, "c1").await?;
    assert_eq!(detail.company.name, "C1");
    let job_ids: Vec<i32> = detail.jobs.iter().map(|j| j.id).collect();
    assert_eq!(job_ids, vec![ids[0], ids[1]]);

    let empty = company::get(&tx, "c3").await?;
    assert!(empty.jobs.is_empty());

    assert!(company::get(&tx, "nope").await.unwrap_err().is_not_found());
});

db_test!(company_update_with_aliases, |tx, ids| {
    let data = FieldValues::try_from(json!({
        "name": "New",
        "description": "New Description",
        "numEmployees": 10,
        "logoUrl": "http://new.img",
    }))?;
    let updated = company::update(&tx, "c1", &data).await?;
    assert_eq!(updated.name, "New");
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url.as_deref(), Some("http://new.img"));
});

db_test!(company_update_errors, |tx, ids| {
    let err = company::update(&tx, "c1", &FieldValues::new()).await.unwrap_err();
    assert!(err.is_bad_request());

    let data = FieldValues::new().set("name", "x");
    assert!(company::update(&tx, "nope", &data).await.unwrap_err().is_not_found());
});

db_test!(company_remove_cascades, |tx, ids| {
    company::remove(&tx, "c1").await?;
    assert!(company::get(&tx, "c1").await.unwrap_err().is_not_found());
    assert!(job::get(&tx, ids[0]).await.unwrap_err().is_not_found());
    assert!(company::remove(&tx, "c1").await.unwrap_err().is_not_found());
});
