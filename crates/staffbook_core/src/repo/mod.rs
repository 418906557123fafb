//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define record-oriented data access contracts.
//! - Isolate SQLite query details from callers.
//! - Own the per-entity identity caches.
//!
//! # Invariants
//! - Repository writes only accept records whose fields passed assignment
//!   validation; read paths re-validate persisted state instead of masking
//!   corrupt rows.
//! - At most one live shared instance exists per persisted id within a
//!   repository's cache lifetime.

use crate::db::DbError;
use crate::model::department::{Department, DepartmentValidationError};
use crate::model::employee::{Employee, EmployeeValidationError};
use crate::model::review::{Review, ReviewValidationError};
use rusqlite::Connection;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub mod department_repo;
pub mod employee_repo;
pub mod review_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared handle to an identity-mapped department instance.
pub type SharedDepartment = Rc<RefCell<Department>>;
/// Shared handle to an identity-mapped employee instance.
pub type SharedEmployee = Rc<RefCell<Employee>>;
/// Shared handle to an identity-mapped review instance.
pub type SharedReview = Rc<RefCell<Review>>;

/// Generic repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Department(DepartmentValidationError),
    Employee(EmployeeValidationError),
    Review(ReviewValidationError),
    Db(DbError),
    /// `update`/`delete` was called on a record with no row id.
    NotPersisted { entity: &'static str },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Department(err) => write!(f, "{err}"),
            Self::Employee(err) => write!(f, "{err}"),
            Self::Review(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotPersisted { entity } => {
                write!(f, "this {entity} has no row id and is not persisted")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing from the connection")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Department(err) => Some(err),
            Self::Employee(err) => Some(err),
            Self::Review(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DepartmentValidationError> for RepoError {
    fn from(value: DepartmentValidationError) -> Self {
        Self::Department(value)
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        match value {
            // A failed probe is a database error, not a field violation.
            EmployeeValidationError::Lookup(err) => Self::Db(err),
            other => Self::Employee(other),
        }
    }
}

impl From<ReviewValidationError> for RepoError {
    fn from(value: ReviewValidationError) -> Self {
        match value {
            ReviewValidationError::Lookup(err) => Self::Db(err),
            other => Self::Review(other),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
