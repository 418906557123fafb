//! Review repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `reviews` table.
//! - Maintain the review identity cache.
//! - Enforce the employee reference through the employee directory.
//!
//! # Invariants
//! - Every write path carries field values that passed assignment
//!   validation, including the live employee existence check.
//! - `find_by_id`/`get_all` return the cached instance for an id when one
//!   exists, refreshed in place from the row.
//! - `delete` evicts the cached instance and detaches the record; a
//!   detached review can be saved again as a new row.

use crate::db::DbResult;
use crate::model::review::{Review, ReviewValidationError};
use crate::repo::employee_repo::SqliteEmployeeDirectory;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, SharedReview};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY,
    year INT,
    summary TEXT,
    employee_id INTEGER,
    FOREIGN KEY (employee_id) REFERENCES employees(id)
);";

const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// Repository interface for review records.
pub trait ReviewRepository {
    /// Constructs and immediately persists a new review; the returned
    /// instance has its id populated.
    fn create(&self, year: i64, summary: &str, employee_id: i64) -> RepoResult<Review>;
    /// Inserts an unsaved review and captures its generated id.
    /// No-op when the record is already persisted.
    fn save(&self, review: &mut Review) -> RepoResult<()>;
    /// Persists the current field values of an already-saved review.
    fn update(&self, review: &Review) -> RepoResult<()>;
    /// Removes the backing row, evicts the id from the identity cache,
    /// and detaches the record.
    fn delete(&self, review: &mut Review) -> RepoResult<()>;
    /// Looks one review up by primary key through the identity cache.
    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedReview>>;
    /// Returns an employee's reviews in database iteration order.
    fn find_by_employee(&self, employee_id: i64) -> RepoResult<Vec<SharedReview>>;
    /// Returns all reviews in database iteration order.
    fn get_all(&self) -> RepoResult<Vec<SharedReview>>;
}

/// SQLite-backed review repository with an identity cache.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
    employees: SqliteEmployeeDirectory<'conn>,
    cache: RefCell<HashMap<i64, SharedReview>>,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a schema-ready connection.
    ///
    /// The `employees` table must also be present: review validation
    /// probes it on every `employee_id` assignment.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "reviews", &["id", "year", "summary", "employee_id"])?;
        ensure_connection_ready(conn, "employees", &["id"])?;
        Ok(Self {
            conn,
            employees: SqliteEmployeeDirectory::new(conn),
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Creates the `reviews` table when it does not exist.
    pub fn create_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// Drops the `reviews` table when it exists.
    pub fn drop_table(conn: &Connection) -> DbResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        Ok(())
    }

    /// Empties the identity cache. Intended for session teardown and tests.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Validating construction without persistence.
    ///
    /// Mirrors [`ReviewRepository::create`] minus the insert, for callers
    /// that stage a record before explicitly saving it.
    pub fn new_review(
        &self,
        year: i64,
        summary: &str,
        employee_id: i64,
    ) -> Result<Review, ReviewValidationError> {
        Review::new(year, summary, employee_id, &self.employees)
    }

    fn materialize_row(&self, row: &Row<'_>) -> RepoResult<SharedReview> {
        let id: i64 = row.get("id")?;
        let year: i64 = row.get("year")?;
        let summary: String = row.get("summary")?;
        let employee_id: i64 = row.get("employee_id")?;

        let mut cache = self.cache.borrow_mut();
        if let Some(existing) = cache.get(&id) {
            {
                let mut record = existing.borrow_mut();
                record.set_year(year)?;
                record.set_summary(summary)?;
                record.set_employee_id(employee_id, &self.employees)?;
            }
            return Ok(Rc::clone(existing));
        }

        let record = Review::with_id(id, year, summary, employee_id, &self.employees)?;
        let shared = Rc::new(RefCell::new(record));
        cache.insert(id, Rc::clone(&shared));
        Ok(shared)
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create(&self, year: i64, summary: &str, employee_id: i64) -> RepoResult<Review> {
        let mut review = Review::new(year, summary, employee_id, &self.employees)?;
        self.save(&mut review)?;
        Ok(review)
    }

    fn save(&self, review: &mut Review) -> RepoResult<()> {
        if let Some(id) = review.id() {
            debug!("event=review_save module=repo status=skipped reason=already_persisted id={id}");
            return Ok(());
        }

        self.conn.execute(
            "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
            params![review.year(), review.summary(), review.employee_id()],
        )?;
        review.assign_id(self.conn.last_insert_rowid());
        Ok(())
    }

    fn update(&self, review: &Review) -> RepoResult<()> {
        let Some(id) = review.id() else {
            return Err(RepoError::NotPersisted { entity: "review" });
        };

        self.conn.execute(
            "UPDATE reviews SET year = ?1, summary = ?2, employee_id = ?3 WHERE id = ?4;",
            params![review.year(), review.summary(), review.employee_id(), id],
        )?;
        Ok(())
    }

    fn delete(&self, review: &mut Review) -> RepoResult<()> {
        let Some(id) = review.id() else {
            return Err(RepoError::NotPersisted { entity: "review" });
        };

        self.conn.execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        self.cache.borrow_mut().remove(&id);
        review.clear_id();
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> RepoResult<Option<SharedReview>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.materialize_row(row)?));
        }
        Ok(None)
    }

    fn find_by_employee(&self, employee_id: i64) -> RepoResult<Vec<SharedReview>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1;"))?;
        let mut rows = stmt.query([employee_id])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(self.materialize_row(row)?);
        }
        Ok(reviews)
    }

    fn get_all(&self) -> RepoResult<Vec<SharedReview>> {
        let mut stmt = self.conn.prepare(&format!("{REVIEW_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(self.materialize_row(row)?);
        }
        Ok(reviews)
    }
}
