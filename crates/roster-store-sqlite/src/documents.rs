//! [`SqliteDocuments`] — the SQLite implementation of [`DocumentStore`].
//!
//! Documents are stored as one JSON text column per employee. Array-valued
//! filters use SQLite's `json_each` in correlated EXISTS subqueries, which
//! gives the same document-level match semantics as the array filters of a
//! dedicated document database: each condition may be satisfied by a
//! different element of the same array.

use std::path::Path;

use rusqlite::OptionalExtension as _;

use roster_core::{
  document::EmployeeDocument,
  store::{DeptAverage, DocumentStore},
};

use crate::{
  encode::{decode_document, encode_document},
  schema::DOCUMENTS_SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The target document collection backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDocuments {
  conn: tokio_rusqlite::Connection,
}

impl SqliteDocuments {
  /// Open (or create) the collection at `path` and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory collection — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(DOCUMENTS_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn raw_conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// The stored JSON text for one document, verbatim.
  ///
  /// Byte-level idempotence checks compare these strings directly instead
  /// of going through a decode/encode round trip.
  pub async fn raw_document(&self, emp_no: u32) -> Result<Option<String>> {
    let emp_no = emp_no as i64;

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc FROM employees WHERE emp_no = ?1",
              rusqlite::params![emp_no],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw)
  }

  /// Run a SELECT returning `doc` columns and decode each row.
  async fn fetch_docs(
    &self,
    sql: &'static str,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Vec<EmployeeDocument>> {
    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
        let rows = stmt
          .query_map(&param_refs[..], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_document(s)).collect()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteDocuments {
  type Error = Error;

  // ── Loading ───────────────────────────────────────────────────────────────

  async fn upsert_batch(&self, documents: Vec<EmployeeDocument>) -> Result<usize> {
    let mut rows: Vec<(i64, String)> = Vec::with_capacity(documents.len());
    for doc in &documents {
      rows.push((doc.emp_no as i64, encode_document(doc)?));
    }

    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (emp_no, doc) in &rows {
          tx.execute(
            "INSERT INTO employees (emp_no, doc) VALUES (?1, ?2)
             ON CONFLICT(emp_no) DO UPDATE SET doc = excluded.doc",
            rusqlite::params![emp_no, doc],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(count)
  }

  async fn assign_manager(&self, dept_no: &str, manager_emp_no: u32) -> Result<usize> {
    // Candidates: every document with some department entry for dept_no.
    let dept = dept_no.to_owned();
    let candidates: Vec<(i64, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT emp_no, doc
             FROM employees
            WHERE EXISTS (
                    SELECT 1 FROM json_each(employees.doc, '$.departments') AS d
                     WHERE json_extract(d.value, '$.dept_no') = ?1
                  )
            ORDER BY emp_no",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![dept], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // First matching entry only; re-serialize and write back.
    let mut updates: Vec<(i64, String)> = Vec::with_capacity(candidates.len());
    for (emp_no, raw) in candidates {
      let mut doc = decode_document(&raw)?;
      if let Some(entry) = doc.first_department_mut(dept_no) {
        entry.manager_id = Some(manager_emp_no);
      }
      updates.push((emp_no, encode_document(&doc)?));
    }

    let count = updates.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (emp_no, doc) in &updates {
          tx.execute(
            "UPDATE employees SET doc = ?2 WHERE emp_no = ?1",
            rusqlite::params![emp_no, doc],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(count)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, emp_no: u32) -> Result<Option<EmployeeDocument>> {
    let raw = self.raw_document(emp_no).await?;
    raw.as_deref().map(decode_document).transpose()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Query tool ────────────────────────────────────────────────────────────

  async fn find_by_manager(&self, manager_emp_no: u32) -> Result<Vec<EmployeeDocument>> {
    self
      .fetch_docs(
        "SELECT doc
           FROM employees
          WHERE EXISTS (
                  SELECT 1 FROM json_each(employees.doc, '$.departments') AS d
                   WHERE json_extract(d.value, '$.is_manager') = 0
                )
            AND EXISTS (
                  SELECT 1 FROM json_each(employees.doc, '$.departments') AS d
                   WHERE json_extract(d.value, '$.manager_id') = ?1
                )
          ORDER BY emp_no",
        vec![Box::new(manager_emp_no as i64)],
      )
      .await
  }

  async fn find_by_title(&self, title: &str) -> Result<Vec<EmployeeDocument>> {
    self
      .fetch_docs(
        "SELECT doc
           FROM employees
          WHERE EXISTS (
                  SELECT 1 FROM json_each(employees.doc, '$.titles') AS t
                   WHERE json_extract(t.value, '$.title') = ?1
                )
          ORDER BY emp_no",
        vec![Box::new(title.to_owned())],
      )
      .await
  }

  async fn find_by_department(&self, dept_no: &str) -> Result<Vec<EmployeeDocument>> {
    self
      .fetch_docs(
        "SELECT doc
           FROM employees
          WHERE EXISTS (
                  SELECT 1 FROM json_each(employees.doc, '$.departments') AS d
                   WHERE json_extract(d.value, '$.dept_no') = ?1
                )
            AND EXISTS (
                  SELECT 1 FROM json_each(employees.doc, '$.departments') AS d
                   WHERE json_extract(d.value, '$.is_manager') = 0
                )
          ORDER BY emp_no",
        vec![Box::new(dept_no.to_owned())],
      )
      .await
  }

  async fn average_salary_by_department(&self) -> Result<Vec<DeptAverage>> {
    // The cross product of the two unwound arrays, grouped by department —
    // a document with no salary rows contributes nothing.
    let rows: Vec<(String, f64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT json_extract(d.value, '$.dept_no')     AS dept_no,
                  AVG(json_extract(s.value, '$.salary')) AS avg_salary
             FROM employees AS e,
                  json_each(e.doc, '$.departments') AS d,
                  json_each(e.doc, '$.salaries')    AS s
            GROUP BY dept_no
            ORDER BY dept_no",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(dept_no, avg_salary)| DeptAverage { dept_no, avg_salary })
        .collect(),
    )
  }

  // ── Provisioning ──────────────────────────────────────────────────────────

  async fn provision_indexes(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = 'idx_emp_no'",
            [],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          tracing::debug!("index idx_emp_no already exists on employees");
          return Ok(());
        }

        match conn.execute("CREATE INDEX idx_emp_no ON employees(emp_no)", []) {
          Ok(_) => tracing::info!("index idx_emp_no created on employees"),
          Err(e) => tracing::warn!("failed to create index idx_emp_no on employees: {e}"),
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}
