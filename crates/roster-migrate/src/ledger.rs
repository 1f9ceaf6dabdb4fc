//! [`ManagerLedger`] — the explicit accumulator for department managers.
//!
//! Built incrementally while employees are processed in extraction order;
//! consumed by the backfill pass once every batch has been loaded. The
//! pipeline task is the single owner, so no locking is needed even when
//! child fetches run in parallel.

use std::collections::BTreeMap;

use roster_core::document::EmployeeDocument;

/// Map from `dept_no` to the manager of record observed for it.
///
/// Last-writer-wins: if multiple distinct employees managed the same
/// department historically, the one processed last in extraction order is
/// retained. This is a defined (if coarse) policy, not an accident — do not
/// "correct" it with date-based tie-breaking.
///
/// A `BTreeMap` keeps iteration in `dept_no` order, so the backfill pass
/// issues its updates deterministically.
#[derive(Debug, Default)]
pub struct ManagerLedger {
  entries: BTreeMap<String, u32>,
}

impl ManagerLedger {
  pub fn new() -> Self { Self::default() }

  /// Record `emp_no` as the manager of `dept_no`, replacing any earlier
  /// observation.
  pub fn observe(&mut self, dept_no: &str, emp_no: u32) {
    self.entries.insert(dept_no.to_owned(), emp_no);
  }

  /// Record every department the document's owner manages.
  pub fn record_document(&mut self, doc: &EmployeeDocument) {
    for dept in &doc.departments {
      if dept.is_manager {
        self.observe(&dept.dept_no, doc.emp_no);
      }
    }
  }

  pub fn manager_of(&self, dept_no: &str) -> Option<u32> {
    self.entries.get(dept_no).copied()
  }

  /// `(dept_no, manager_emp_no)` pairs in `dept_no` order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
    self.entries.iter().map(|(dept, emp)| (dept.as_str(), *emp))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
