//! Employee domain model.
//!
//! # Responsibility
//! - Define the employee record shared by persistence and display layers.
//! - Enforce the department reference at assignment time, before any SQL
//!   mutation runs.
//!
//! # Invariants
//! - `department_id` always names a department row that resolved at the
//!   moment it was assigned.

use crate::db::DbError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resolves whether a department row currently exists.
///
/// Implemented by the department persistence layer; the employee model
/// consumes it so the reference check stays an application-level lookup.
pub trait DepartmentLookup {
    fn department_exists(&self, department_id: i64) -> Result<bool, DbError>;
}

/// Validation failure for employee field assignment.
#[derive(Debug)]
pub enum EmployeeValidationError {
    EmptyName,
    EmptyJobTitle,
    UnknownDepartment { department_id: i64 },
    /// The department existence probe itself failed.
    Lookup(DbError),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "employee name must be a non-empty string"),
            Self::EmptyJobTitle => write!(f, "employee job title must be a non-empty string"),
            Self::UnknownDepartment { department_id } => {
                write!(f, "department_id {department_id} does not match a department")
            }
            Self::Lookup(err) => write!(f, "department lookup failed: {err}"),
        }
    }
}

impl Error for EmployeeValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for EmployeeValidationError {
    fn from(value: DbError) -> Self {
        Self::Lookup(value)
    }
}

/// An employee record.
///
/// Fields are private so every mutation flows through a validating setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<i64>,
    name: String,
    job_title: String,
    department_id: i64,
}

impl Employee {
    /// Builds an unsaved employee, validating each field in order.
    ///
    /// Fails fast on the first violation; no partially-valid employee is
    /// ever observable.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: i64,
        departments: &dyn DepartmentLookup,
    ) -> Result<Self, EmployeeValidationError> {
        let name = name.into();
        let job_title = job_title.into();
        check_name(&name)?;
        check_job_title(&job_title)?;
        check_department_id(department_id, departments)?;
        Ok(Self {
            id: None,
            name,
            job_title,
            department_id,
        })
    }

    /// Builds an employee carrying a persisted row id.
    pub(crate) fn with_id(
        id: i64,
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: i64,
        departments: &dyn DepartmentLookup,
    ) -> Result<Self, EmployeeValidationError> {
        let mut employee = Self::new(name, job_title, department_id, departments)?;
        employee.id = Some(id);
        Ok(employee)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn department_id(&self) -> i64 {
        self.department_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EmployeeValidationError> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_job_title(
        &mut self,
        job_title: impl Into<String>,
    ) -> Result<(), EmployeeValidationError> {
        let job_title = job_title.into();
        check_job_title(&job_title)?;
        self.job_title = job_title;
        Ok(())
    }

    /// Reassigns the department reference, re-running the live existence
    /// check against the department collaborator.
    pub fn set_department_id(
        &mut self,
        department_id: i64,
        departments: &dyn DepartmentLookup,
    ) -> Result<(), EmployeeValidationError> {
        check_department_id(department_id, departments)?;
        self.department_id = department_id;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(
                f,
                "Employee {id}: {}, {} (department {})",
                self.name, self.job_title, self.department_id
            ),
            None => write!(
                f,
                "Employee (unsaved): {}, {} (department {})",
                self.name, self.job_title, self.department_id
            ),
        }
    }
}

fn check_name(name: &str) -> Result<(), EmployeeValidationError> {
    if name.is_empty() {
        return Err(EmployeeValidationError::EmptyName);
    }
    Ok(())
}

fn check_job_title(job_title: &str) -> Result<(), EmployeeValidationError> {
    if job_title.is_empty() {
        return Err(EmployeeValidationError::EmptyJobTitle);
    }
    Ok(())
}

fn check_department_id(
    department_id: i64,
    departments: &dyn DepartmentLookup,
) -> Result<(), EmployeeValidationError> {
    if !departments.department_exists(department_id)? {
        return Err(EmployeeValidationError::UnknownDepartment { department_id });
    }
    Ok(())
}
