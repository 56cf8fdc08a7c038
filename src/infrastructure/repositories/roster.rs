use serde::{Deserialize, Serialize};

use crate::domain::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::domain::errors::{PersistenceError, PersistenceResult};
use crate::domain::league::{League, LeagueId};

/// Whole-roster document shared by the in-process stores
///
/// Counters only ever grow, so identities are never reused even after
/// deletions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Roster {
    last_employee_id: i64,
    last_league_id: i64,
    leagues: Vec<League>,
    employees: Vec<Employee>,
}

impl Roster {
    pub(crate) fn insert_employee(&mut self, draft: &EmployeeDraft) -> EmployeeId {
        self.last_employee_id += 1;
        let id = EmployeeId::new(self.last_employee_id);
        self.employees.push(Employee::from_draft(id, draft.clone()));
        id
    }

    pub(crate) fn update_employee(&mut self, employee: &Employee) -> PersistenceResult<()> {
        let slot = self
            .employees
            .iter_mut()
            .find(|e| e.id() == employee.id())
            .ok_or_else(|| {
                PersistenceError::SaveImpossible(format!("Employee not found: {}", employee.id()))
            })?;
        *slot = employee.clone();
        Ok(())
    }

    pub(crate) fn delete_employee(&mut self, id: EmployeeId) -> PersistenceResult<()> {
        let before = self.employees.len();
        self.employees.retain(|e| e.id() != id);
        if self.employees.len() == before {
            return Err(PersistenceError::SaveImpossible(format!(
                "Employee not found: {}",
                id
            )));
        }

        // Mirrors ON DELETE SET NULL on leagues.administrator_id
        for league in self.leagues.iter_mut() {
            if league.administrator() == Some(id) {
                league.set_administrator(None);
            }
        }
        Ok(())
    }

    /// Saves `handover` then deletes the employee, changing nothing on failure
    pub(crate) fn remove_employee(
        &mut self,
        id: EmployeeId,
        handover: Option<&League>,
    ) -> PersistenceResult<()> {
        if !self.employees.iter().any(|e| e.id() == id) {
            return Err(PersistenceError::SaveImpossible(format!(
                "Employee not found: {}",
                id
            )));
        }
        if let Some(league) = handover {
            self.update_league(league)?;
        }
        self.delete_employee(id)
    }

    pub(crate) fn find_employee(&self, id: EmployeeId) -> Option<Employee> {
        self.employees.iter().find(|e| e.id() == id).cloned()
    }

    pub(crate) fn employees(&self) -> Vec<Employee> {
        self.employees.clone()
    }

    pub(crate) fn insert_league(&mut self, name: &str) -> LeagueId {
        self.last_league_id += 1;
        let id = LeagueId::new(self.last_league_id);
        self.leagues.push(League::new(id, name.to_string()));
        id
    }

    pub(crate) fn update_league(&mut self, league: &League) -> PersistenceResult<()> {
        let slot = self
            .leagues
            .iter_mut()
            .find(|l| l.id() == league.id())
            .ok_or_else(|| {
                PersistenceError::SaveImpossible(format!("League not found: {}", league.id()))
            })?;
        *slot = League::from_persistence(
            league.id(),
            league.name().to_string(),
            league.administrator(),
        );
        Ok(())
    }

    /// Deletes the league and, like ON DELETE CASCADE, its employees
    pub(crate) fn delete_league(&mut self, id: LeagueId) -> PersistenceResult<()> {
        let before = self.leagues.len();
        self.leagues.retain(|l| l.id() != id);
        if self.leagues.len() == before {
            return Err(PersistenceError::SaveImpossible(format!(
                "League not found: {}",
                id
            )));
        }
        self.employees.retain(|e| e.league() != Some(id));
        Ok(())
    }

    pub(crate) fn find_league(&self, id: LeagueId) -> Option<League> {
        self.leagues.iter().find(|l| l.id() == id).cloned()
    }

    pub(crate) fn leagues(&self) -> Vec<League> {
        self.leagues.clone()
    }
}
