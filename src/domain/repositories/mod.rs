// Repository interfaces (ports)
// Implemented by adapters in the infrastructure layer

pub mod employee_repository;
pub mod league_repository;

pub use employee_repository::EmployeeRepository;
pub use league_repository::LeagueRepository;

/// Everything the personnel registry needs from a store
pub trait PersonnelStore: EmployeeRepository + LeagueRepository {}

impl<T: EmployeeRepository + LeagueRepository> PersonnelStore for T {}
