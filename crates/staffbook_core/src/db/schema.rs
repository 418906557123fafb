//! HR record schema lifecycle.
//!
//! # Responsibility
//! - Apply per-entity table DDL in foreign-key dependency order.
//! - Keep schema setup idempotent so reopening a database is safe.
//!
//! # Invariants
//! - Parent tables (`departments`, `employees`) are created before tables
//!   referencing them.
//! - Drops run children-first so foreign-key references never dangle.

use crate::db::DbResult;
use crate::repo::department_repo::SqliteDepartmentRepository;
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::review_repo::SqliteReviewRepository;
use rusqlite::Connection;

/// Creates every record table that does not already exist.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    SqliteDepartmentRepository::create_table(conn)?;
    SqliteEmployeeRepository::create_table(conn)?;
    SqliteReviewRepository::create_table(conn)?;
    Ok(())
}

/// Drops every record table that exists.
pub fn drop_schema(conn: &Connection) -> DbResult<()> {
    SqliteReviewRepository::drop_table(conn)?;
    SqliteEmployeeRepository::drop_table(conn)?;
    SqliteDepartmentRepository::drop_table(conn)?;
    Ok(())
}
