//! The read-only query tool over the migrated document collection.
//!
//! Consumes only the final document shape; it owns no state of its own.

use anyhow::{Context as _, bail};
use clap::Subcommand;
use roster_core::{document::EmployeeDocument, store::DocumentStore};

/// Department name directory for `query by-department`. A raw `dNNN` code
/// is accepted as-is.
const DEPARTMENTS: &[(&str, &str)] = &[
  ("Marketing", "d001"),
  ("Finance", "d002"),
  ("Human Resources", "d003"),
  ("Production", "d004"),
  ("Development", "d005"),
  ("Quality Management", "d006"),
  ("Sales", "d007"),
  ("Research", "d008"),
  ("Customer Service", "d009"),
];

// ─── Subcommands ─────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
  /// Employees reporting to the given manager.
  ByManager {
    /// The manager's employee number.
    emp_no: u32,
  },

  /// Employees who have held the given title (exact match).
  ByTitle { title: String },

  /// Non-manager employees of a department, by name or `dNNN` code.
  ByDepartment { department: String },

  /// Average salary per department.
  AvgSalary,
}

// ─── Execution ───────────────────────────────────────────────────────────────

pub async fn execute<D>(documents: &D, command: QueryCommand) -> anyhow::Result<()>
where
  D: DocumentStore,
{
  match command {
    QueryCommand::ByManager { emp_no } => {
      let found = documents
        .find_by_manager(emp_no)
        .await
        .context("by-manager query failed")?;
      print_employees(&found);
    }

    QueryCommand::ByTitle { title } => {
      let found = documents
        .find_by_title(&title)
        .await
        .context("by-title query failed")?;
      print_employees(&found);
    }

    QueryCommand::ByDepartment { department } => {
      let dept_no = resolve_department(&department)?;
      let found = documents
        .find_by_department(dept_no)
        .await
        .context("by-department query failed")?;
      print_employees(&found);
    }

    QueryCommand::AvgSalary => {
      let averages = documents
        .average_salary_by_department()
        .await
        .context("avg-salary query failed")?;
      println!("Average Salary by Department:");
      for row in &averages {
        println!(
          "Department: {}, Average Salary: ${:.2}",
          row.dept_no, row.avg_salary
        );
      }
    }
  }

  Ok(())
}

fn print_employees(found: &[EmployeeDocument]) {
  for doc in found {
    println!("{} {} {}", doc.emp_no, doc.first_name, doc.last_name);
  }
  println!("{} employee(s)", found.len());
}

/// Translate a department name through the directory, or pass a raw code
/// through unchanged.
fn resolve_department(input: &str) -> anyhow::Result<&str> {
  if let Some(&(_, code)) = DEPARTMENTS.iter().find(|(name, _)| *name == input) {
    return Ok(code);
  }
  if input.len() == 4
    && input.starts_with('d')
    && input[1..].chars().all(|c| c.is_ascii_digit())
  {
    return Ok(input);
  }
  bail!(
    "unknown department {input:?}; expected a dNNN code or one of: {}",
    DEPARTMENTS
      .iter()
      .map(|(name, _)| *name)
      .collect::<Vec<_>>()
      .join(", ")
  )
}

#[cfg(test)]
mod tests {
  use super::resolve_department;

  #[test]
  fn names_translate_through_the_directory() {
    assert_eq!(resolve_department("Marketing").unwrap(), "d001");
    assert_eq!(resolve_department("Customer Service").unwrap(), "d009");
  }

  #[test]
  fn raw_codes_pass_through() {
    assert_eq!(resolve_department("d042").unwrap(), "d042");
  }

  #[test]
  fn unknown_names_are_rejected() {
    assert!(resolve_department("Warehouse").is_err());
    assert!(resolve_department("dxyz").is_err());
  }
}
