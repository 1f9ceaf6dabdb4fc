//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 calendar dates (`YYYY-MM-DD`). Gender is the
//! source's single-letter code. Documents are stored as compact JSON.

use chrono::NaiveDate;
use roster_core::{
  document::EmployeeDocument,
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, Gender,
    SalaryRecord, TitleRecord,
  },
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse::<NaiveDate>()
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::M => "M",
    Gender::F => "F",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "M" => Ok(Gender::M),
    "F" => Ok(Gender::F),
    other => Err(Error::UnknownGender(other.to_owned())),
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn encode_document(doc: &EmployeeDocument) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<EmployeeDocument> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from an `employees` master row.
pub struct RawEmployee {
  pub emp_no:     i64,
  pub birth_date: String,
  pub first_name: String,
  pub last_name:  String,
  pub gender:     String,
  pub hire_date:  String,
}

impl RawEmployee {
  pub fn into_master(self) -> Result<EmployeeMaster> {
    Ok(EmployeeMaster {
      emp_no:     self.emp_no as u32,
      birth_date: decode_date(&self.birth_date)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      gender:     decode_gender(&self.gender)?,
      hire_date:  decode_date(&self.hire_date)?,
    })
  }
}

/// Raw columns read directly from a `salaries` row.
pub struct RawSalary {
  pub emp_no:    i64,
  pub salary:    i64,
  pub from_date: String,
  pub to_date:   String,
}

impl RawSalary {
  pub fn into_salary(self) -> Result<SalaryRecord> {
    Ok(SalaryRecord {
      emp_no:    self.emp_no as u32,
      salary:    self.salary as u32,
      from_date: decode_date(&self.from_date)?,
      to_date:   decode_date(&self.to_date)?,
    })
  }
}

/// Raw columns read directly from a `titles` row.
pub struct RawTitle {
  pub emp_no:    i64,
  pub title:     String,
  pub from_date: String,
  pub to_date:   String,
}

impl RawTitle {
  pub fn into_title(self) -> Result<TitleRecord> {
    Ok(TitleRecord {
      emp_no:    self.emp_no as u32,
      title:     self.title,
      from_date: decode_date(&self.from_date)?,
      to_date:   decode_date(&self.to_date)?,
    })
  }
}

/// Raw columns of a `dept_emp` or `dept_manager` row; both tables share
/// the same shape.
pub struct RawDeptRange {
  pub emp_no:    i64,
  pub dept_no:   String,
  pub from_date: String,
  pub to_date:   String,
}

impl RawDeptRange {
  pub fn into_assignment(self) -> Result<DepartmentAssignment> {
    Ok(DepartmentAssignment {
      emp_no:    self.emp_no as u32,
      dept_no:   self.dept_no,
      from_date: decode_date(&self.from_date)?,
      to_date:   decode_date(&self.to_date)?,
    })
  }

  pub fn into_management(self) -> Result<DepartmentManagement> {
    Ok(DepartmentManagement {
      emp_no:    self.emp_no as u32,
      dept_no:   self.dept_no,
      from_date: decode_date(&self.from_date)?,
      to_date:   decode_date(&self.to_date)?,
    })
  }
}
