//! Source row types — the normalized relational shape of the employee data.
//!
//! These mirror the read-only input tables one-to-one. Rows are immutable
//! inputs, re-read in full on every migration run; this system never writes
//! to the source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Gender as recorded in the source enum column (`M` | `F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  M,
  F,
}

// ─── Master record ───────────────────────────────────────────────────────────

/// One row of the `employees` master table; `emp_no` is the primary key and
/// the join key for every child table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeMaster {
  pub emp_no:     u32,
  pub birth_date: NaiveDate,
  pub first_name: String,
  pub last_name:  String,
  pub gender:     Gender,
  pub hire_date:  NaiveDate,
}

// ─── Child records ───────────────────────────────────────────────────────────

/// A salary over an effective date range. Zero or more per employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
  pub emp_no:    u32,
  pub salary:    u32,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// A job title over a date range. Zero or more per employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
  pub emp_no:    u32,
  pub title:     String,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// Membership of an employee in a department over a date range.
/// An employee may belong to multiple departments across time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAssignment {
  pub emp_no:    u32,
  pub dept_no:   String,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// Marks an employee as manager of a department during a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentManagement {
  pub emp_no:    u32,
  pub dept_no:   String,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}
