//! [`SqliteSource`] — the SQLite implementation of [`EmployeeSource`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use roster_core::{
  employee::{
    DepartmentAssignment, DepartmentManagement, EmployeeMaster, SalaryRecord,
    TitleRecord,
  },
  store::EmployeeSource,
};

use crate::{
  encode::{encode_date, encode_gender, RawDeptRange, RawEmployee, RawSalary, RawTitle},
  schema::SOURCE_SCHEMA,
  Error, Result,
};

/// Lookup indexes provisioned before extraction. Index names are
/// database-global in SQLite, so each carries its table name.
const SOURCE_INDEXES: &[(&str, &str, &str)] = &[
  ("idx_salaries_emp_no", "salaries", "emp_no"),
  ("idx_titles_emp_no", "titles", "emp_no"),
  ("idx_titles_title", "titles", "title"),
  ("idx_dept_emp_emp_no", "dept_emp", "emp_no"),
  ("idx_dept_emp_dept_no", "dept_emp", "dept_no"),
  ("idx_dept_manager_emp_no", "dept_manager", "emp_no"),
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// The relational employee source backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// connection is opened once for the whole migration run and dropped at
/// exit.
#[derive(Clone)]
pub struct SqliteSource {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSource {
  /// Open (or create) the source database at `path` and run schema
  /// initialisation. Initialisation is a no-op on an already-populated
  /// database.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let source = Self { conn };
    source.init_schema().await?;
    Ok(source)
  }

  /// Open an in-memory source — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let source = Self { conn };
    source.init_schema().await?;
    Ok(source)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SOURCE_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn raw_conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  // ── Fixture loading ───────────────────────────────────────────────────────
  //
  // The migration itself never writes to the source; these inserters exist
  // so tests and dataset-import tooling can populate one.

  pub async fn insert_employee(&self, employee: &EmployeeMaster) -> Result<()> {
    let emp_no     = employee.emp_no as i64;
    let birth_date = encode_date(employee.birth_date);
    let first_name = employee.first_name.clone();
    let last_name  = employee.last_name.clone();
    let gender     = encode_gender(employee.gender).to_owned();
    let hire_date  = encode_date(employee.hire_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (emp_no, birth_date, first_name, last_name, gender, hire_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![emp_no, birth_date, first_name, last_name, gender, hire_date],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_salary(&self, record: &SalaryRecord) -> Result<()> {
    let emp_no    = record.emp_no as i64;
    let salary    = record.salary as i64;
    let from_date = encode_date(record.from_date);
    let to_date   = encode_date(record.to_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO salaries (emp_no, salary, from_date, to_date)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![emp_no, salary, from_date, to_date],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_title(&self, record: &TitleRecord) -> Result<()> {
    let emp_no    = record.emp_no as i64;
    let title     = record.title.clone();
    let from_date = encode_date(record.from_date);
    let to_date   = encode_date(record.to_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO titles (emp_no, title, from_date, to_date)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![emp_no, title, from_date, to_date],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_assignment(&self, record: &DepartmentAssignment) -> Result<()> {
    self
      .insert_dept_range(
        "dept_emp",
        record.emp_no,
        record.dept_no.clone(),
        record.from_date,
        record.to_date,
      )
      .await
  }

  pub async fn insert_management(&self, record: &DepartmentManagement) -> Result<()> {
    self
      .insert_dept_range(
        "dept_manager",
        record.emp_no,
        record.dept_no.clone(),
        record.from_date,
        record.to_date,
      )
      .await
  }

  async fn insert_dept_range(
    &self,
    table: &'static str,
    emp_no: u32,
    dept_no: String,
    from_date: chrono::NaiveDate,
    to_date: chrono::NaiveDate,
  ) -> Result<()> {
    let emp_no    = emp_no as i64;
    let from_date = encode_date(from_date);
    let to_date   = encode_date(to_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {table} (emp_no, dept_no, from_date, to_date)
             VALUES (?1, ?2, ?3, ?4)"
          ),
          rusqlite::params![emp_no, dept_no, from_date, to_date],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Shared query shape for `dept_emp` and `dept_manager`.
  async fn fetch_dept_ranges(
    &self,
    table: &'static str,
    emp_no: u32,
  ) -> Result<Vec<RawDeptRange>> {
    let emp_no = emp_no as i64;

    let raws: Vec<RawDeptRange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT emp_no, dept_no, from_date, to_date
             FROM {table}
            WHERE emp_no = ?1
            ORDER BY from_date, to_date, dept_no"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![emp_no], |row| {
            Ok(RawDeptRange {
              emp_no:    row.get(0)?,
              dept_no:   row.get(1)?,
              from_date: row.get(2)?,
              to_date:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws)
  }
}

// ─── EmployeeSource impl ─────────────────────────────────────────────────────

impl EmployeeSource for SqliteSource {
  type Error = Error;

  async fn fetch_master_page(
    &self,
    offset: u64,
    page_size: u64,
  ) -> Result<Vec<EmployeeMaster>> {
    let offset    = offset as i64;
    let page_size = page_size as i64;

    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT emp_no, birth_date, first_name, last_name, gender, hire_date
             FROM employees
            ORDER BY emp_no
            LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![page_size, offset], |row| {
            Ok(RawEmployee {
              emp_no:     row.get(0)?,
              birth_date: row.get(1)?,
              first_name: row.get(2)?,
              last_name:  row.get(3)?,
              gender:     row.get(4)?,
              hire_date:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_master).collect()
  }

  async fn fetch_salaries(&self, emp_no: u32) -> Result<Vec<SalaryRecord>> {
    let emp_no = emp_no as i64;

    let raws: Vec<RawSalary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT emp_no, salary, from_date, to_date
             FROM salaries
            WHERE emp_no = ?1
            ORDER BY from_date, to_date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![emp_no], |row| {
            Ok(RawSalary {
              emp_no:    row.get(0)?,
              salary:    row.get(1)?,
              from_date: row.get(2)?,
              to_date:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSalary::into_salary).collect()
  }

  async fn fetch_titles(&self, emp_no: u32) -> Result<Vec<TitleRecord>> {
    let emp_no = emp_no as i64;

    let raws: Vec<RawTitle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT emp_no, title, from_date, to_date
             FROM titles
            WHERE emp_no = ?1
            ORDER BY from_date, to_date, title",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![emp_no], |row| {
            Ok(RawTitle {
              emp_no:    row.get(0)?,
              title:     row.get(1)?,
              from_date: row.get(2)?,
              to_date:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTitle::into_title).collect()
  }

  async fn fetch_assignments(&self, emp_no: u32) -> Result<Vec<DepartmentAssignment>> {
    let raws = self.fetch_dept_ranges("dept_emp", emp_no).await?;
    raws.into_iter().map(RawDeptRange::into_assignment).collect()
  }

  async fn fetch_managements(&self, emp_no: u32) -> Result<Vec<DepartmentManagement>> {
    let raws = self.fetch_dept_ranges("dept_manager", emp_no).await?;
    raws.into_iter().map(RawDeptRange::into_management).collect()
  }

  async fn provision_indexes(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        for &(name, table, column) in SOURCE_INDEXES {
          let exists: bool = conn
            .query_row(
              "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1",
              rusqlite::params![name],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          if exists {
            tracing::debug!("index {name} already exists on {table}");
            continue;
          }

          match conn.execute(&format!("CREATE INDEX {name} ON {table}({column})"), []) {
            Ok(_) => tracing::info!("index {name} created on {table}"),
            Err(e) => tracing::warn!("failed to create index {name} on {table}: {e}"),
          }
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}
