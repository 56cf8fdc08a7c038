use async_trait::async_trait;

use crate::domain::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::domain::errors::PersistenceResult;
use crate::domain::league::League;

/// Repository trait for Employee records
///
/// Implementations assign identities on insertion; identities grow
/// monotonically and are never reused.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Insert a new employee and return its assigned identity
    async fn insert_employee(&self, employee: &EmployeeDraft) -> PersistenceResult<EmployeeId>;

    /// Persist the current fields of an existing employee
    async fn update_employee(&self, employee: &Employee) -> PersistenceResult<()>;

    /// Delete an employee by ID
    async fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<()>;

    /// Delete an employee and save `handover` in the same unit of work
    ///
    /// `handover` is the employee's league with its administration already
    /// reassigned. Either both changes are stored or neither is.
    async fn remove_employee(
        &self,
        id: EmployeeId,
        handover: Option<&League>,
    ) -> PersistenceResult<()>;

    /// Find an employee by its ID
    async fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>>;

    /// Load every employee, root included
    async fn find_all_employees(&self) -> PersistenceResult<Vec<Employee>>;
}
