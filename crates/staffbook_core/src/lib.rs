//! Core domain logic for staffbook.
//! This crate is the single source of truth for HR record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{Department, DepartmentValidationError};
pub use model::employee::{DepartmentLookup, Employee, EmployeeValidationError};
pub use model::review::{EmployeeLookup, Review, ReviewValidationError, MIN_REVIEW_YEAR};
pub use repo::department_repo::{
    DepartmentRepository, SqliteDepartmentDirectory, SqliteDepartmentRepository,
};
pub use repo::employee_repo::{
    EmployeeRepository, SqliteEmployeeDirectory, SqliteEmployeeRepository,
};
pub use repo::review_repo::{ReviewRepository, SqliteReviewRepository};
pub use repo::{
    RepoError, RepoResult, SharedDepartment, SharedEmployee, SharedReview,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
