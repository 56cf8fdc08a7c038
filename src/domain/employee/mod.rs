// Employee domain module
// Contains the employee entity and its value objects

#![allow(clippy::module_inception)]

pub mod employee;
pub mod value_objects;

// Re-export main types for convenience
pub use employee::{Employee, EmployeeDisplay, EmployeeDraft, NewEmployee};
pub use value_objects::{EmployeeId, Tenure};
