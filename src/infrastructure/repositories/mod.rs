// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

mod roster;

pub mod in_memory_repository;
pub mod json_file_repository;
pub mod postgres_personnel_repository;

pub use in_memory_repository::InMemoryRepository;
pub use json_file_repository::JsonFileRepository;
pub use postgres_personnel_repository::PostgresPersonnelRepository;
