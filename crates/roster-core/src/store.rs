//! The `EmployeeSource` and `DocumentStore` traits and supporting types.
//!
//! The traits are implemented by storage backends (e.g.
//! `roster-store-sqlite`). The migration pipeline and the query tool depend
//! on these abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  document::EmployeeDocument,
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, SalaryRecord,
    TitleRecord,
  },
};

// ─── Aggregation row ─────────────────────────────────────────────────────────

/// One row of the average-salary-by-department aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeptAverage {
  pub dept_no:    String,
  pub avg_salary: f64,
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Read-only access to the normalized relational source.
///
/// `fetch_master_page` must apply a stable, deterministic order (by `emp_no`
/// ascending) so that pagination across the full key range is complete —
/// every key appears exactly once — and resumable in principle. The child
/// fetches return all rows for one employee from one table, in a
/// deterministic order, so that assembled documents are reproducible across
/// runs.
///
/// Any error from these methods is a connectivity or extraction failure and
/// is fatal to the whole migration; there is no partial-progress checkpoint.
///
/// All methods return `Send` futures so fetches can run on a multi-threaded
/// async runtime.
pub trait EmployeeSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// One page of master records, ordered by `emp_no` ascending.
  ///
  /// A page shorter than `page_size` (including an empty one) is the last
  /// page.
  fn fetch_master_page(
    &self,
    offset: u64,
    page_size: u64,
  ) -> impl Future<Output = Result<Vec<EmployeeMaster>, Self::Error>> + Send + '_;

  /// All salary rows for one employee.
  fn fetch_salaries(
    &self,
    emp_no: u32,
  ) -> impl Future<Output = Result<Vec<SalaryRecord>, Self::Error>> + Send + '_;

  /// All title rows for one employee.
  fn fetch_titles(
    &self,
    emp_no: u32,
  ) -> impl Future<Output = Result<Vec<TitleRecord>, Self::Error>> + Send + '_;

  /// All department-assignment rows for one employee.
  fn fetch_assignments(
    &self,
    emp_no: u32,
  ) -> impl Future<Output = Result<Vec<DepartmentAssignment>, Self::Error>> + Send + '_;

  /// All department-management rows for one employee.
  fn fetch_managements(
    &self,
    emp_no: u32,
  ) -> impl Future<Output = Result<Vec<DepartmentManagement>, Self::Error>> + Send + '_;

  /// Check-then-create the source-side lookup indexes.
  ///
  /// A precondition step, run once before extraction starts. Individual
  /// index failures are logged by the implementation and do not surface
  /// here; an `Err` means the store itself was unreachable, which callers
  /// treat as non-fatal for this step only.
  fn provision_indexes(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// The denormalized target collection, keyed by `emp_no`.
///
/// Writes are idempotent upserts: loading the same documents twice leaves
/// the collection unchanged. The read methods carry the query-tool contract
/// over the final document shape; they see whatever state the migration has
/// produced so far.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Loading ───────────────────────────────────────────────────────────

  /// Upsert every document in the batch, keyed by `emp_no`, replacing
  /// existing documents' fields entirely. Returns the number written.
  ///
  /// A failure anywhere in the batch is fatal to the migration; there is
  /// no per-document isolation and no retry.
  fn upsert_batch(
    &self,
    documents: Vec<EmployeeDocument>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Backfill: set `manager_id = manager_emp_no` on the **first** matching
  /// department entry of every document that has an entry for `dept_no`.
  /// Returns the number of documents touched.
  ///
  /// The match filter is on `dept_no` alone — the managing employee's own
  /// document also receives its own `emp_no` as `manager_id`.
  fn assign_manager<'a>(
    &'a self,
    dept_no: &'a str,
    manager_emp_no: u32,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a single document by key. Returns `None` if not present.
  fn get(
    &self,
    emp_no: u32,
  ) -> impl Future<Output = Result<Option<EmployeeDocument>, Self::Error>> + Send + '_;

  /// Number of documents in the collection.
  fn count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Query tool ────────────────────────────────────────────────────────

  /// Documents that have some department entry with `is_manager = false`
  /// and some department entry with `manager_id = manager_emp_no`.
  ///
  /// The two conditions may be satisfied by different entries of the same
  /// document; do not tighten this to a single-entry match.
  fn find_by_manager(
    &self,
    manager_emp_no: u32,
  ) -> impl Future<Output = Result<Vec<EmployeeDocument>, Self::Error>> + Send + '_;

  /// Documents with any title entry whose text equals `title` exactly.
  fn find_by_title<'a>(
    &'a self,
    title: &'a str,
  ) -> impl Future<Output = Result<Vec<EmployeeDocument>, Self::Error>> + Send + 'a;

  /// Documents with any department entry for `dept_no` and some entry with
  /// `is_manager = false` (element-independent, as in `find_by_manager`).
  fn find_by_department<'a>(
    &'a self,
    dept_no: &'a str,
  ) -> impl Future<Output = Result<Vec<EmployeeDocument>, Self::Error>> + Send + 'a;

  /// Average salary per department: the cross product of each document's
  /// department entries and salary rows, grouped by `dept_no`, ordered by
  /// `dept_no` ascending.
  fn average_salary_by_department(
    &self,
  ) -> impl Future<Output = Result<Vec<DeptAverage>, Self::Error>> + Send + '_;

  // ── Provisioning ──────────────────────────────────────────────────────

  /// Check-then-create the collection's `emp_no` index. Same contract as
  /// [`EmployeeSource::provision_indexes`].
  fn provision_indexes(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
