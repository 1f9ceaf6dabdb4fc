//! SQL schemas for the two SQLite databases.
//!
//! Executed once at connection startup. Both are idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`; future migrations will be gated on
//! `PRAGMA user_version`. Lookup indexes are NOT part of the schema — they
//! are provisioned by the explicit check-then-create step before extraction.

/// The normalized relational source. Read-only input to the migration; the
/// insert helpers exist for fixture loading only.
pub const SOURCE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    emp_no      INTEGER PRIMARY KEY,
    birth_date  TEXT NOT NULL,   -- ISO 8601 date
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    gender      TEXT NOT NULL,   -- 'M' | 'F'
    hire_date   TEXT NOT NULL
);

-- Child tables are time-versioned; rows are never mutated in place.
CREATE TABLE IF NOT EXISTS salaries (
    emp_no    INTEGER NOT NULL REFERENCES employees(emp_no),
    salary    INTEGER NOT NULL,
    from_date TEXT NOT NULL,
    to_date   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS titles (
    emp_no    INTEGER NOT NULL REFERENCES employees(emp_no),
    title     TEXT NOT NULL,
    from_date TEXT NOT NULL,
    to_date   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dept_emp (
    emp_no    INTEGER NOT NULL REFERENCES employees(emp_no),
    dept_no   TEXT NOT NULL,
    from_date TEXT NOT NULL,
    to_date   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dept_manager (
    emp_no    INTEGER NOT NULL REFERENCES employees(emp_no),
    dept_no   TEXT NOT NULL,
    from_date TEXT NOT NULL,
    to_date   TEXT NOT NULL
);

PRAGMA user_version = 1;
";

/// The denormalized target collection: one JSON document per employee,
/// replaced wholesale by upsert.
pub const DOCUMENTS_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS employees (
    emp_no INTEGER PRIMARY KEY,
    doc    TEXT NOT NULL        -- serialized EmployeeDocument
);

PRAGMA user_version = 1;
";
