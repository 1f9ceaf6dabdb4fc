//! End-to-end pipeline tests against in-memory SQLite stores.

use chrono::NaiveDate;
use roster_core::{
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, Gender,
    SalaryRecord, TitleRecord,
  },
  store::DocumentStore,
};
use roster_store_sqlite::{SqliteDocuments, SqliteSource};

use crate::{MigrationSettings, run};

fn date(s: &str) -> NaiveDate { s.parse().expect("fixture date") }

fn settings(batch_size: u64) -> MigrationSettings {
  MigrationSettings {
    batch_size,
    fetch_workers: 3,
  }
}

async fn stores() -> (SqliteSource, SqliteDocuments) {
  let source = SqliteSource::open_in_memory().await.expect("in-memory source");
  let documents = SqliteDocuments::open_in_memory()
    .await
    .expect("in-memory documents");
  (source, documents)
}

async fn seed_employee(source: &SqliteSource, emp_no: u32) {
  source
    .insert_employee(&EmployeeMaster {
      emp_no,
      birth_date: date("1960-01-01"),
      first_name: format!("First{emp_no}"),
      last_name:  format!("Last{emp_no}"),
      gender:     if emp_no % 2 == 0 { Gender::F } else { Gender::M },
      hire_date:  date("1988-01-01"),
    })
    .await
    .unwrap();
}

async fn seed_assignment(source: &SqliteSource, emp_no: u32, dept_no: &str) {
  source
    .insert_assignment(&DepartmentAssignment {
      emp_no,
      dept_no:   dept_no.into(),
      from_date: date("1990-01-01"),
      to_date:   date("1999-01-01"),
    })
    .await
    .unwrap();
}

async fn seed_management(source: &SqliteSource, emp_no: u32, dept_no: &str) {
  source
    .insert_management(&DepartmentManagement {
      emp_no,
      dept_no:   dept_no.into(),
      from_date: date("1990-01-01"),
      to_date:   date("1999-01-01"),
    })
    .await
    .unwrap();
}

// ─── End-to-end scenario ─────────────────────────────────────────────────────

#[tokio::test]
async fn manager_reference_is_backfilled_everywhere() {
  let (source, documents) = stores().await;

  // Employee 1 manages d001; 2 and 3 are plain members.
  for emp_no in 1..=3 {
    seed_employee(&source, emp_no).await;
    seed_assignment(&source, emp_no, "d001").await;
  }
  seed_management(&source, 1, "d001").await;

  let report = run(&source, &documents, &settings(10)).await.unwrap();
  assert_eq!(report.employees, 3);
  assert_eq!(report.departments_backfilled, 1);

  let doc2 = documents.get(2).await.unwrap().unwrap();
  assert!(!doc2.departments[0].is_manager);
  assert_eq!(doc2.departments[0].manager_id, Some(1));

  let doc3 = documents.get(3).await.unwrap().unwrap();
  assert!(!doc3.departments[0].is_manager);
  assert_eq!(doc3.departments[0].manager_id, Some(1));

  // The manager's own entry self-references: the backfill filter is on
  // dept_no alone.
  let doc1 = documents.get(1).await.unwrap().unwrap();
  assert!(doc1.departments[0].is_manager);
  assert_eq!(doc1.departments[0].manager_id, Some(1));
}

#[tokio::test]
async fn full_history_is_carried_into_the_document() {
  let (source, documents) = stores().await;

  seed_employee(&source, 1).await;
  source
    .insert_salary(&SalaryRecord {
      emp_no: 1,
      salary: 60000,
      from_date: date("1990-01-01"),
      to_date: date("1991-01-01"),
    })
    .await
    .unwrap();
  source
    .insert_salary(&SalaryRecord {
      emp_no: 1,
      salary: 64000,
      from_date: date("1991-01-01"),
      to_date: date("1992-01-01"),
    })
    .await
    .unwrap();
  source
    .insert_title(&TitleRecord {
      emp_no:    1,
      title:     "Staff".into(),
      from_date: date("1990-01-01"),
      to_date:   date("1995-01-01"),
    })
    .await
    .unwrap();
  seed_assignment(&source, 1, "d004").await;

  run(&source, &documents, &settings(10)).await.unwrap();

  let doc = documents.get(1).await.unwrap().unwrap();
  assert_eq!(doc.salaries.len(), 2);
  assert_eq!(doc.salaries[0].salary, 60000);
  assert_eq!(doc.salaries[1].salary, 64000);
  assert_eq!(doc.titles.len(), 1);
  assert_eq!(doc.titles[0].title, "Staff");
  assert_eq!(doc.departments.len(), 1);
  assert_eq!(doc.departments[0].dept_no, "d004");
}

// ─── Pagination ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_employee_appears_exactly_once_across_batches() {
  let (source, documents) = stores().await;
  for emp_no in 1..=5 {
    seed_employee(&source, emp_no).await;
  }

  let report = run(&source, &documents, &settings(2)).await.unwrap();
  assert_eq!(report.employees, 5);
  assert_eq!(report.batches, 3);
  assert_eq!(documents.count().await.unwrap(), 5);

  for emp_no in 1..=5 {
    assert!(documents.get(emp_no).await.unwrap().is_some());
  }
}

#[tokio::test]
async fn batch_loop_terminates_on_an_exact_multiple() {
  let (source, documents) = stores().await;
  for emp_no in 1..=4 {
    seed_employee(&source, emp_no).await;
  }

  // Two full pages; the loop must stop on the empty third page.
  let report = run(&source, &documents, &settings(2)).await.unwrap();
  assert_eq!(report.employees, 4);
  assert_eq!(report.batches, 2);
}

#[tokio::test]
async fn empty_source_migrates_nothing() {
  let (source, documents) = stores().await;

  let report = run(&source, &documents, &settings(10)).await.unwrap();
  assert_eq!(report.employees, 0);
  assert_eq!(report.batches, 0);
  assert_eq!(report.departments_backfilled, 0);
  assert_eq!(documents.count().await.unwrap(), 0);
}

#[tokio::test]
async fn employee_with_no_child_rows_still_gets_a_document() {
  let (source, documents) = stores().await;
  seed_employee(&source, 8).await;

  run(&source, &documents, &settings(10)).await.unwrap();

  let doc = documents.get(8).await.unwrap().unwrap();
  assert!(doc.salaries.is_empty());
  assert!(doc.titles.is_empty());
  assert!(doc.departments.is_empty());
}

// ─── Accumulator semantics ───────────────────────────────────────────────────

#[tokio::test]
async fn last_processed_manager_wins_the_tie_break() {
  let (source, documents) = stores().await;

  // Employees 1 and 2 both managed d003 at some point. Extraction order is
  // emp_no ascending, so 2 is observed last and wins.
  for emp_no in 1..=2 {
    seed_employee(&source, emp_no).await;
    seed_assignment(&source, emp_no, "d003").await;
    seed_management(&source, emp_no, "d003").await;
  }

  run(&source, &documents, &settings(1)).await.unwrap();

  let doc1 = documents.get(1).await.unwrap().unwrap();
  let doc2 = documents.get(2).await.unwrap().unwrap();
  assert_eq!(doc1.departments[0].manager_id, Some(2));
  assert_eq!(doc2.departments[0].manager_id, Some(2));
}

#[tokio::test]
async fn manager_flag_ignores_date_ranges() {
  let (source, documents) = stores().await;

  seed_employee(&source, 1).await;
  seed_assignment(&source, 1, "d005").await;
  // Management range entirely before the assignment range.
  source
    .insert_management(&DepartmentManagement {
      emp_no:    1,
      dept_no:   "d005".into(),
      from_date: date("1971-01-01"),
      to_date:   date("1974-01-01"),
    })
    .await
    .unwrap();

  run(&source, &documents, &settings(10)).await.unwrap();

  let doc = documents.get(1).await.unwrap().unwrap();
  assert!(doc.departments[0].is_manager);
}

#[tokio::test]
async fn manager_observed_in_an_early_batch_reaches_later_documents() {
  let (source, documents) = stores().await;

  // Manager in the first batch, reports in later batches; batch_size 1
  // forces the accumulator to carry across the batch boundary.
  seed_employee(&source, 1).await;
  seed_assignment(&source, 1, "d002").await;
  seed_management(&source, 1, "d002").await;
  for emp_no in 2..=3 {
    seed_employee(&source, emp_no).await;
    seed_assignment(&source, emp_no, "d002").await;
  }

  run(&source, &documents, &settings(1)).await.unwrap();

  for emp_no in 2..=3 {
    let doc = documents.get(emp_no).await.unwrap().unwrap();
    assert_eq!(doc.departments[0].manager_id, Some(1));
  }
}

// ─── Idempotence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn rerunning_the_pipeline_is_byte_identical() {
  let (source, documents) = stores().await;

  for emp_no in 1..=3 {
    seed_employee(&source, emp_no).await;
    seed_assignment(&source, emp_no, "d001").await;
    source
      .insert_salary(&SalaryRecord {
        emp_no,
        salary: 50000 + emp_no * 1000,
        from_date: date("1990-01-01"),
        to_date: date("1991-01-01"),
      })
      .await
      .unwrap();
  }
  seed_management(&source, 1, "d001").await;

  run(&source, &documents, &settings(2)).await.unwrap();
  let mut first_pass = Vec::new();
  for emp_no in 1..=3 {
    first_pass.push(documents.raw_document(emp_no).await.unwrap().unwrap());
  }

  run(&source, &documents, &settings(2)).await.unwrap();
  assert_eq!(documents.count().await.unwrap(), 3);
  for (emp_no, before) in (1..=3).zip(&first_pass) {
    let after = documents.raw_document(emp_no).await.unwrap().unwrap();
    assert_eq!(&after, before);
  }
}
