//! The staged pipeline: provision → extract/assemble/load per batch →
//! backfill.
//!
//! Batches run strictly sequentially; extraction of batch N+1 does not
//! begin before batch N is fully assembled and loaded. The backfill pass
//! runs only after the batch loop terminates — it needs total knowledge of
//! the manager ledger. Any store error after provisioning is fatal: there
//! is no checkpoint and no retry, and a re-run restarts from offset zero,
//! relying on upsert idempotency.

use roster_core::{
  document::EmployeeDocument,
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, SalaryRecord,
    TitleRecord,
  },
  store::{DocumentStore, EmployeeSource},
};
use tokio::task::JoinSet;

use crate::{Error, Result, assemble::assemble, ledger::ManagerLedger};

// ─── Settings and report ─────────────────────────────────────────────────────

/// Tuning knobs for one migration run.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
  /// Master rows extracted per page; also the upsert batch size.
  pub batch_size:    u64,
  /// Concurrent per-employee child fetches within a batch.
  pub fetch_workers: usize,
}

impl Default for MigrationSettings {
  fn default() -> Self {
    Self {
      batch_size:    5000,
      fetch_workers: 8,
    }
  }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
  pub employees:              u64,
  pub batches:                u64,
  pub departments_backfilled: u64,
}

// ─── Child fetches ───────────────────────────────────────────────────────────

/// All child rows for one employee, fetched together.
struct ChildRecords {
  salaries:    Vec<SalaryRecord>,
  titles:      Vec<TitleRecord>,
  assignments: Vec<DepartmentAssignment>,
  managements: Vec<DepartmentManagement>,
}

async fn fetch_children<S>(source: &S, emp_no: u32) -> Result<ChildRecords, S::Error>
where
  S: EmployeeSource,
{
  let (salaries, titles, assignments, managements) = tokio::join!(
    source.fetch_salaries(emp_no),
    source.fetch_titles(emp_no),
    source.fetch_assignments(emp_no),
    source.fetch_managements(emp_no),
  );

  Ok(ChildRecords {
    salaries:    salaries?,
    titles:      titles?,
    assignments: assignments?,
    managements: managements?,
  })
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Run the full migration to completion.
///
/// Index provisioning failures are logged and skipped; everything after
/// that is fail-fast.
pub async fn run<S, D>(
  source: &S,
  documents: &D,
  settings: &MigrationSettings,
) -> Result<MigrationReport>
where
  S: EmployeeSource + Clone + 'static,
  D: DocumentStore,
{
  // Precondition step, not part of the hot path: each index is
  // check-then-create, and a failure here never aborts the run.
  if let Err(e) = source.provision_indexes().await {
    tracing::warn!("source index provisioning skipped: {e}");
  }
  if let Err(e) = documents.provision_indexes().await {
    tracing::warn!("document index provisioning skipped: {e}");
  }

  let mut ledger = ManagerLedger::new();
  let mut employees: u64 = 0;
  let mut batches: u64 = 0;
  let mut offset: u64 = 0;

  loop {
    let page = source
      .fetch_master_page(offset, settings.batch_size)
      .await
      .map_err(Error::source)?;
    if page.is_empty() {
      break;
    }
    let page_len = page.len() as u64;

    let docs =
      assemble_batch(source, page, settings.fetch_workers, &mut ledger).await?;
    let loaded = documents
      .upsert_batch(docs)
      .await
      .map_err(Error::documents)? as u64;

    employees += loaded;
    batches += 1;
    offset += page_len;
    tracing::info!("processed {employees} employees");

    if page_len < settings.batch_size {
      break;
    }
  }

  // Barrier: every batch is loaded and every manager observed before the
  // first backfill update is issued.
  let mut departments_backfilled: u64 = 0;
  for (dept_no, manager) in ledger.iter() {
    let touched = documents
      .assign_manager(dept_no, manager)
      .await
      .map_err(Error::documents)?;
    tracing::debug!("dept {dept_no}: manager {manager} set on {touched} documents");
    departments_backfilled += 1;
  }

  tracing::info!(
    "migration complete: {employees} employees in {batches} batches, \
     {departments_backfilled} departments backfilled"
  );

  Ok(MigrationReport {
    employees,
    batches,
    departments_backfilled,
  })
}

/// Fetch children for every employee of one page and assemble documents.
///
/// Fetches run in waves of `fetch_workers` concurrent tasks; results are
/// re-ordered by page index before assembly. Assembly and ledger recording
/// stay on this task, in extraction order — the single accumulating owner
/// that keeps the ledger's last-writer-wins result deterministic.
async fn assemble_batch<S>(
  source: &S,
  page: Vec<EmployeeMaster>,
  fetch_workers: usize,
  ledger: &mut ManagerLedger,
) -> Result<Vec<EmployeeDocument>>
where
  S: EmployeeSource + Clone + 'static,
{
  let workers = fetch_workers.max(1);
  let mut docs = Vec::with_capacity(page.len());
  let mut remaining = page.into_iter();

  loop {
    let wave: Vec<EmployeeMaster> = remaining.by_ref().take(workers).collect();
    if wave.is_empty() {
      break;
    }

    let mut set = JoinSet::new();
    for (idx, master) in wave.iter().enumerate() {
      let source = source.clone();
      let emp_no = master.emp_no;
      set.spawn(async move { (idx, fetch_children(&source, emp_no).await) });
    }

    let mut fetched: Vec<(usize, ChildRecords)> = Vec::with_capacity(wave.len());
    while let Some(joined) = set.join_next().await {
      let (idx, result) = joined?;
      fetched.push((idx, result.map_err(Error::source)?));
    }
    fetched.sort_by_key(|(idx, _)| *idx);

    for (master, (_, children)) in wave.into_iter().zip(fetched) {
      let doc = assemble(
        master,
        children.salaries,
        children.titles,
        children.assignments,
        children.managements,
      );
      ledger.record_document(&doc);
      docs.push(doc);
    }
  }

  Ok(docs)
}
