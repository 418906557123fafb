//! Review domain model.
//!
//! # Responsibility
//! - Define the yearly performance review record.
//! - Enforce the employee reference at assignment time, before any SQL
//!   mutation runs.
//!
//! # Invariants
//! - `year` is never below [`MIN_REVIEW_YEAR`].
//! - `employee_id` always names an employee row that resolved at the
//!   moment it was assigned.

use crate::db::DbError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Earliest year a review may cover.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// Resolves whether an employee row currently exists.
///
/// Implemented by the employee persistence layer; the review model
/// consumes it so the reference check stays an application-level lookup.
pub trait EmployeeLookup {
    fn employee_exists(&self, employee_id: i64) -> Result<bool, DbError>;
}

/// Validation failure for review field assignment.
#[derive(Debug)]
pub enum ReviewValidationError {
    YearBeforeMinimum { year: i64 },
    EmptySummary,
    UnknownEmployee { employee_id: i64 },
    /// The employee existence probe itself failed.
    Lookup(DbError),
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearBeforeMinimum { year } => {
                write!(f, "year must be at least {MIN_REVIEW_YEAR}, got {year}")
            }
            Self::EmptySummary => write!(f, "summary must be a non-empty string"),
            Self::UnknownEmployee { employee_id } => {
                write!(f, "employee_id {employee_id} does not match an employee")
            }
            Self::Lookup(err) => write!(f, "employee lookup failed: {err}"),
        }
    }
}

impl Error for ReviewValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ReviewValidationError {
    fn from(value: DbError) -> Self {
        Self::Lookup(value)
    }
}

/// A yearly performance review for one employee.
///
/// Fields are private so every mutation flows through a validating setter;
/// a review can never hold an out-of-range year or a dangling employee
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<i64>,
    year: i64,
    summary: String,
    employee_id: i64,
}

impl Review {
    /// Builds an unsaved review, validating each field in order.
    ///
    /// Fails fast on the first violation; no partially-valid review is
    /// ever observable.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: i64,
        employees: &dyn EmployeeLookup,
    ) -> Result<Self, ReviewValidationError> {
        let summary = summary.into();
        check_year(year)?;
        check_summary(&summary)?;
        check_employee_id(employee_id, employees)?;
        Ok(Self {
            id: None,
            year,
            summary,
            employee_id,
        })
    }

    /// Builds a review carrying a persisted row id.
    ///
    /// Used by row materialization only; external construction goes
    /// through [`Review::new`].
    pub(crate) fn with_id(
        id: i64,
        year: i64,
        summary: impl Into<String>,
        employee_id: i64,
        employees: &dyn EmployeeLookup,
    ) -> Result<Self, ReviewValidationError> {
        let mut review = Self::new(year, summary, employee_id, employees)?;
        review.id = Some(id);
        Ok(review)
    }

    /// Primary key of the backing row, `None` while unsaved/detached.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> i64 {
        self.employee_id
    }

    pub fn set_year(&mut self, year: i64) -> Result<(), ReviewValidationError> {
        check_year(year)?;
        self.year = year;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ReviewValidationError> {
        let summary = summary.into();
        check_summary(&summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Reassigns the employee reference, re-running the live existence
    /// check against the employee collaborator.
    pub fn set_employee_id(
        &mut self,
        employee_id: i64,
        employees: &dyn EmployeeLookup,
    ) -> Result<(), ReviewValidationError> {
        check_employee_id(employee_id, employees)?;
        self.employee_id = employee_id;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(
                f,
                "Review {id}: {}, {} (employee {})",
                self.year, self.summary, self.employee_id
            ),
            None => write!(
                f,
                "Review (unsaved): {}, {} (employee {})",
                self.year, self.summary, self.employee_id
            ),
        }
    }
}

fn check_year(year: i64) -> Result<(), ReviewValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ReviewValidationError::YearBeforeMinimum { year });
    }
    Ok(())
}

fn check_summary(summary: &str) -> Result<(), ReviewValidationError> {
    if summary.is_empty() {
        return Err(ReviewValidationError::EmptySummary);
    }
    Ok(())
}

fn check_employee_id(
    employee_id: i64,
    employees: &dyn EmployeeLookup,
) -> Result<(), ReviewValidationError> {
    if !employees.employee_exists(employee_id)? {
        return Err(ReviewValidationError::UnknownEmployee { employee_id });
    }
    Ok(())
}
