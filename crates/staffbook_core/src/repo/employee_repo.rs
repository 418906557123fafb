//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `employees` table.
//! - Maintain the employee identity cache.
//! - Enforce the department reference through the department directory.
//!
//! # Invariants
//! - Every write path carries field values that passed assignment
//!   validation, including the live department existence check.
//! - `find_by_id`/`get_all` return the cached instance for an id when one
//!   exists, refreshed in place from the row.

use crate::db::{DbError, DbResult};
use crate::model::employee::Employee;
use crate::model::review::EmployeeLookup;
use crate::repo::department_repo::SqliteDepartmentDirectory;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, SharedEmployee};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT,
    job_title TEXT,
    department_id INTEGER,
    FOREIGN KEY (department_id) REFERENCES departments(id)
);";

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, job_title, department_id FROM employees";

/// Repository interface for employee records.
pub trait EmployeeRepository {
    /// Constructs and immediately persists a new employee.
    fn create(&self, name: &str, job_title: &str, department_id: i64) -> RepoResult<Employee>;
    /// Inserts an unsaved employee and captures its generated id.
    /// No-op when the record is already persisted.
    fn save(&self, employee: &mut Employee) -> RepoResult<()>;
    /// Persists the current field values of an already-saved employee.
    fn update(&self, employee: &Employee) -> RepoResult<()>;
    /// Removes the backing row and detaches the record.
    fn delete(&self, employee: &mut Employee) -> RepoResult<()>;
    /// Looks one employee up by primary key through the identity cache.
    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedEmployee>>;
    /// Returns the first employee matching `name`, if any.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<SharedEmployee>>;
    /// Returns a department's employees in database iteration order.
    fn find_by_department(&self, department_id: i64) -> RepoResult<Vec<SharedEmployee>>;
    /// Returns all employees in database iteration order.
    fn get_all(&self) -> RepoResult<Vec<SharedEmployee>>;
}

/// Existence probe for employee references.
///
/// Kept separate from the repository so dependent models can validate an
/// `employee_id` without touching the employee identity cache.
pub struct SqliteEmployeeDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeLookup for SqliteEmployeeDirectory<'_> {
    fn employee_exists(&self, employee_id: i64) -> Result<bool, DbError> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
            [employee_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

/// SQLite-backed employee repository with an identity cache.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
    departments: SqliteDepartmentDirectory<'conn>,
    cache: RefCell<HashMap<i64, SharedEmployee>>,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a schema-ready connection.
    ///
    /// The `departments` table must also be present: employee validation
    /// probes it on every `department_id` assignment.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "employees", &["id", "name", "job_title", "department_id"])?;
        ensure_connection_ready(conn, "departments", &["id"])?;
        Ok(Self {
            conn,
            departments: SqliteDepartmentDirectory::new(conn),
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Creates the `employees` table when it does not exist.
    pub fn create_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// Drops the `employees` table when it exists.
    pub fn drop_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS employees;")?;
        Ok(())
    }

    /// Empties the identity cache. Intended for session teardown and tests.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn materialize_row(&self, row: &Row<'_>) -> RepoResult<SharedEmployee> {
        let id: i64 = row.get("id")?;
        let name: String = row.get("name")?;
        let job_title: String = row.get("job_title")?;
        let department_id: i64 = row.get("department_id")?;

        let mut cache = self.cache.borrow_mut();
        if let Some(existing) = cache.get(&id) {
            {
                let mut record = existing.borrow_mut();
                record.set_name(name)?;
                record.set_job_title(job_title)?;
                record.set_department_id(department_id, &self.departments)?;
            }
            return Ok(Rc::clone(existing));
        }

        let record = Employee::with_id(id, name, job_title, department_id, &self.departments)?;
        let shared = Rc::new(RefCell::new(record));
        cache.insert(id, Rc::clone(&shared));
        Ok(shared)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create(&self, name: &str, job_title: &str, department_id: i64) -> RepoResult<Employee> {
        let mut employee = Employee::new(name, job_title, department_id, &self.departments)?;
        self.save(&mut employee)?;
        Ok(employee)
    }

    fn save(&self, employee: &mut Employee) -> RepoResult<()> {
        if let Some(id) = employee.id() {
            debug!("event=employee_save module=repo status=skipped reason=already_persisted id={id}");
            return Ok(());
        }

        self.conn.execute(
            "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3);",
            params![employee.name(), employee.job_title(), employee.department_id()],
        )?;
        employee.assign_id(self.conn.last_insert_rowid());
        Ok(())
    }

    fn update(&self, employee: &Employee) -> RepoResult<()> {
        let Some(id) = employee.id() else {
            return Err(RepoError::NotPersisted { entity: "employee" });
        };

        self.conn.execute(
            "UPDATE employees SET name = ?1, job_title = ?2, department_id = ?3 WHERE id = ?4;",
            params![
                employee.name(),
                employee.job_title(),
                employee.department_id(),
                id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, employee: &mut Employee) -> RepoResult<()> {
        let Some(id) = employee.id() else {
            return Err(RepoError::NotPersisted { entity: "employee" });
        };

        self.conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        self.cache.borrow_mut().remove(&id);
        employee.clear_id();
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedEmployee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.materialize_row(row)?));
        }
        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<SharedEmployee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.materialize_row(row)?));
        }
        Ok(None)
    }

    fn find_by_department(&self, department_id: i64) -> RepoResult<Vec<SharedEmployee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE department_id = ?1;"))?;
        let mut rows = stmt.query([department_id])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(self.materialize_row(row)?);
        }
        Ok(employees)
    }

    fn get_all(&self) -> RepoResult<Vec<SharedEmployee>> {
        let mut stmt = self.conn.prepare(&format!("{EMPLOYEE_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(self.materialize_row(row)?);
        }
        Ok(employees)
    }
}
