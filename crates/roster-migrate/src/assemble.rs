//! Per-employee document assembly — a pure join of one master row with its
//! child record sets.

use roster_core::{
  document::{DepartmentEntry, EmployeeDocument},
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, SalaryRecord,
    TitleRecord,
  },
};

/// Join one employee's records into a nested document.
///
/// All inputs are already scoped to this employee, so the `(emp_no,
/// dept_no)` membership test for `is_manager` reduces to `dept_no` alone.
/// Date ranges are deliberately not compared: a management row anywhere in
/// the employee's history flags every assignment entry for that department.
///
/// `manager_id` is left unset; the backfill pass injects it after all
/// batches have loaded.
pub fn assemble(
  master: EmployeeMaster,
  salaries: Vec<SalaryRecord>,
  titles: Vec<TitleRecord>,
  assignments: Vec<DepartmentAssignment>,
  managements: Vec<DepartmentManagement>,
) -> EmployeeDocument {
  let departments = assignments
    .into_iter()
    .map(|a| {
      let is_manager = managements.iter().any(|m| m.dept_no == a.dept_no);
      DepartmentEntry {
        dept_no:    a.dept_no,
        from_date:  a.from_date,
        to_date:    a.to_date,
        is_manager,
        manager_id: None,
      }
    })
    .collect();

  EmployeeDocument {
    emp_no:     master.emp_no,
    birth_date: master.birth_date,
    first_name: master.first_name,
    last_name:  master.last_name,
    gender:     master.gender,
    hire_date:  master.hire_date,
    salaries,
    titles,
    departments,
  }
}
