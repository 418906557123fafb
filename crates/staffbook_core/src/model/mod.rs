//! HR domain models.
//!
//! # Responsibility
//! - Define the department/employee/review record types.
//! - Keep field validation co-located with each field definition.
//!
//! # Invariants
//! - Every field is validated on every assignment, never only at save time.
//! - Record ids are assigned and cleared by the persistence layer only.

pub mod department;
pub mod employee;
pub mod review;
