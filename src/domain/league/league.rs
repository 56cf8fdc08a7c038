use super::value_objects::LeagueId;
use crate::domain::employee::EmployeeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// League hosting a set of employees, one of whom may administer it
///
/// Membership is a set of identities; the employees themselves live in
/// the `PersonnelRegistry`. Membership is not persisted with the league,
/// it is rebuilt from each employee's league on load.
///
/// # Invariants
/// - An employee appears at most once
/// - The administrator, if any, is a member or the registry root
///   (enforced by the registry, which knows the root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    id: LeagueId,
    name: String,
    #[serde(skip)]
    employees: BTreeSet<EmployeeId>,
    administrator: Option<EmployeeId>,
}

impl League {
    pub(crate) fn new(id: LeagueId, name: String) -> Self {
        Self {
            id,
            name,
            employees: BTreeSet::new(),
            administrator: None,
        }
    }

    pub fn id(&self) -> LeagueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identities of the league's members
    pub fn employees(&self) -> &BTreeSet<EmployeeId> {
        &self.employees
    }

    pub fn contains(&self, employee: EmployeeId) -> bool {
        self.employees.contains(&employee)
    }

    pub fn administrator(&self) -> Option<EmployeeId> {
        self.administrator
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// Returns false if the employee was already a member
    pub(crate) fn join(&mut self, employee: EmployeeId) -> bool {
        self.employees.insert(employee)
    }

    /// Detaches a member; administration is handled by the caller
    pub(crate) fn leave(&mut self, employee: EmployeeId) -> bool {
        self.employees.remove(&employee)
    }

    pub(crate) fn set_administrator(&mut self, administrator: Option<EmployeeId>) {
        self.administrator = administrator;
    }

    /// Reconstructs a League from persistence layer data, without members
    pub fn from_persistence(id: LeagueId, name: String, administrator: Option<EmployeeId>) -> Self {
        Self {
            id,
            name,
            employees: BTreeSet::new(),
            administrator,
        }
    }
}

impl PartialEq for League {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for League {}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
