// Domain layer module exports
// Domain is independent of infrastructure concerns

pub mod employee;
pub mod errors;
pub mod league;
pub mod registry;
pub mod repositories;

pub use errors::{DateRangeError, PersistenceError, PersonnelError, PersonnelResult};
pub use registry::PersonnelRegistry;
