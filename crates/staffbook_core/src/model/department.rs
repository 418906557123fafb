//! Department domain model.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for department field assignment.
#[derive(Debug, PartialEq, Eq)]
pub enum DepartmentValidationError {
    EmptyName,
    EmptyLocation,
}

impl Display for DepartmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "department name must be a non-empty string"),
            Self::EmptyLocation => write!(f, "department location must be a non-empty string"),
        }
    }
}

impl Error for DepartmentValidationError {}

/// A department record.
///
/// Fields are private so every mutation flows through a validating setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    id: Option<i64>,
    name: String,
    location: String,
}

impl Department {
    /// Builds an unsaved department, validating each field in order.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, DepartmentValidationError> {
        let name = name.into();
        let location = location.into();
        check_name(&name)?;
        check_location(&location)?;
        Ok(Self {
            id: None,
            name,
            location,
        })
    }

    /// Builds a department carrying a persisted row id.
    ///
    /// Used by row materialization only; external construction goes
    /// through [`Department::new`].
    pub(crate) fn with_id(
        id: i64,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, DepartmentValidationError> {
        let mut department = Self::new(name, location)?;
        department.id = Some(id);
        Ok(department)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DepartmentValidationError> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_location(
        &mut self,
        location: impl Into<String>,
    ) -> Result<(), DepartmentValidationError> {
        let location = location.into();
        check_location(&location)?;
        self.location = location;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Department {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "Department {id}: {}, {}", self.name, self.location),
            None => write!(f, "Department (unsaved): {}, {}", self.name, self.location),
        }
    }
}

fn check_name(name: &str) -> Result<(), DepartmentValidationError> {
    if name.is_empty() {
        return Err(DepartmentValidationError::EmptyName);
    }
    Ok(())
}

fn check_location(location: &str) -> Result<(), DepartmentValidationError> {
    if location.is_empty() {
        return Err(DepartmentValidationError::EmptyLocation);
    }
    Ok(())
}
