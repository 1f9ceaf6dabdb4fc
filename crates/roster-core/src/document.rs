//! The denormalized target shape — one nested document per employee.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::employee::{Gender, SalaryRecord, TitleRecord};

// ─── Department entry ────────────────────────────────────────────────────────

/// One department membership inside a document.
///
/// `is_manager` is true iff at least one management row exists for the same
/// employee and the same `dept_no` — matched by `dept_no` only, not by
/// overlapping date range. An employee who managed a department in the past
/// is flagged on every assignment entry for that department, even one whose
/// dates are unrelated. This matching policy is deliberate; do not tighten
/// it to require temporal overlap.
///
/// `manager_id` is absent until the backfill pass injects the department's
/// manager of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentEntry {
  pub dept_no:    String,
  pub from_date:  NaiveDate,
  pub to_date:    NaiveDate,
  pub is_manager: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub manager_id: Option<u32>,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// The assembled employee document, keyed by `emp_no` in the target
/// collection. Created or fully replaced by upsert on every run; never
/// partially updated except for `manager_id` backfill.
///
/// Child lists are kept in the deterministic order the source reader emits
/// so that repeated runs against unchanged data serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDocument {
  pub emp_no:      u32,
  pub birth_date:  NaiveDate,
  pub first_name:  String,
  pub last_name:   String,
  pub gender:      Gender,
  pub hire_date:   NaiveDate,
  pub salaries:    Vec<SalaryRecord>,
  pub titles:      Vec<TitleRecord>,
  pub departments: Vec<DepartmentEntry>,
}

impl EmployeeDocument {
  /// The first department entry matching `dept_no`, if any.
  ///
  /// "First matching only" is the backfill contract: when an employee has
  /// several historical entries for the same department, exactly one of
  /// them carries `manager_id`.
  pub fn first_department_mut(
    &mut self,
    dept_no: &str,
  ) -> Option<&mut DepartmentEntry> {
    self.departments.iter_mut().find(|d| d.dept_no == dept_no)
  }
}
