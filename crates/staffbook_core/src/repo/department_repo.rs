//! Department repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `departments` table.
//! - Maintain the department identity cache.
//!
//! # Invariants
//! - `find_by_id`/`get_all` return the cached instance for an id when one
//!   exists, refreshed in place from the row.
//! - `delete` evicts the cached instance and detaches the record.

use crate::db::{DbError, DbResult};
use crate::model::department::Department;
use crate::model::employee::DepartmentLookup;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, SharedDepartment};
use log::debug;
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY,
    name TEXT,
    location TEXT
);";

/// Repository interface for department records.
pub trait DepartmentRepository {
    /// Constructs and immediately persists a new department.
    fn create(&self, name: &str, location: &str) -> RepoResult<Department>;
    /// Inserts an unsaved department and captures its generated id.
    /// No-op when the record is already persisted.
    fn save(&self, department: &mut Department) -> RepoResult<()>;
    /// Persists the current field values of an already-saved department.
    fn update(&self, department: &Department) -> RepoResult<()>;
    /// Removes the backing row and detaches the record.
    fn delete(&self, department: &mut Department) -> RepoResult<()>;
    /// Looks one department up by primary key through the identity cache.
    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedDepartment>>;
    /// Returns the first department matching `name`, if any.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<SharedDepartment>>;
    /// Returns all departments in database iteration order.
    fn get_all(&self) -> RepoResult<Vec<SharedDepartment>>;
}

/// Existence probe for department references.
///
/// Kept separate from the repository so dependent models can validate a
/// `department_id` without touching the department identity cache.
pub struct SqliteDepartmentDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepartmentLookup for SqliteDepartmentDirectory<'_> {
    fn department_exists(&self, department_id: i64) -> Result<bool, DbError> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1);",
            [department_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

/// SQLite-backed department repository with an identity cache.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
    cache: RefCell<HashMap<i64, SharedDepartment>>,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Constructs a repository from a schema-ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "departments", &["id", "name", "location"])?;
        Ok(Self {
            conn,
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Creates the `departments` table when it does not exist.
    pub fn create_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// Drops the `departments` table when it exists.
    pub fn drop_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS departments;")?;
        Ok(())
    }

    /// Empties the identity cache. Intended for session teardown and tests.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn materialize_row(
        &self,
        id: i64,
        name: String,
        location: String,
    ) -> RepoResult<SharedDepartment> {
        let mut cache = self.cache.borrow_mut();
        if let Some(existing) = cache.get(&id) {
            {
                let mut record = existing.borrow_mut();
                record.set_name(name)?;
                record.set_location(location)?;
            }
            return Ok(Rc::clone(existing));
        }

        let record = Department::with_id(id, name, location)?;
        let shared = Rc::new(RefCell::new(record));
        cache.insert(id, Rc::clone(&shared));
        Ok(shared)
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create(&self, name: &str, location: &str) -> RepoResult<Department> {
        let mut department = Department::new(name, location)?;
        self.save(&mut department)?;
        Ok(department)
    }

    fn save(&self, department: &mut Department) -> RepoResult<()> {
        if let Some(id) = department.id() {
            debug!("event=department_save module=repo status=skipped reason=already_persisted id={id}");
            return Ok(());
        }

        self.conn.execute(
            "INSERT INTO departments (name, location) VALUES (?1, ?2);",
            params![department.name(), department.location()],
        )?;
        department.assign_id(self.conn.last_insert_rowid());
        Ok(())
    }

    fn update(&self, department: &Department) -> RepoResult<()> {
        let Some(id) = department.id() else {
            return Err(RepoError::NotPersisted {
                entity: "department",
            });
        };

        self.conn.execute(
            "UPDATE departments SET name = ?1, location = ?2 WHERE id = ?3;",
            params![department.name(), department.location(), id],
        )?;
        Ok(())
    }

    fn delete(&self, department: &mut Department) -> RepoResult<()> {
        let Some(id) = department.id() else {
            return Err(RepoError::NotPersisted {
                entity: "department",
            });
        };

        self.conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        self.cache.borrow_mut().remove(&id);
        department.clear_id();
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedDepartment>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, location FROM departments WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let shared = self.materialize_row(row.get("id")?, row.get("name")?, row.get("location")?)?;
            return Ok(Some(shared));
        }
        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<SharedDepartment>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, location FROM departments WHERE name = ?1;")?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            let shared = self.materialize_row(row.get("id")?, row.get("name")?, row.get("location")?)?;
            return Ok(Some(shared));
        }
        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<SharedDepartment>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, location FROM departments;")?;
        let mut rows = stmt.query([])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(self.materialize_row(
                row.get("id")?,
                row.get("name")?,
                row.get("location")?,
            )?);
        }
        Ok(departments)
    }
}
