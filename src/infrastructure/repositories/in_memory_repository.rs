use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::roster::Roster;
use crate::domain::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::domain::errors::{PersistenceError, PersistenceResult};
use crate::domain::league::{League, LeagueId};
use crate::domain::repositories::{EmployeeRepository, LeagueRepository};

/// In-process store keeping the roster in memory
///
/// Nothing survives the process. Saves can be switched off with
/// `fail_saves` to observe how callers handle `SaveImpossible`.
#[derive(Default)]
pub struct InMemoryRepository {
    roster: Mutex<Roster>,
    failing: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again)
    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_writable(&self) -> PersistenceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::SaveImpossible(
                "in-memory store is refusing writes".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryRepository {
    async fn insert_employee(&self, employee: &EmployeeDraft) -> PersistenceResult<EmployeeId> {
        self.check_writable()?;
        Ok(self.roster.lock().await.insert_employee(employee))
    }

    async fn update_employee(&self, employee: &Employee) -> PersistenceResult<()> {
        self.check_writable()?;
        self.roster.lock().await.update_employee(employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<()> {
        self.check_writable()?;
        self.roster.lock().await.delete_employee(id)
    }

    async fn remove_employee(
        &self,
        id: EmployeeId,
        handover: Option<&League>,
    ) -> PersistenceResult<()> {
        self.check_writable()?;
        self.roster.lock().await.remove_employee(id, handover)
    }

    async fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>> {
        Ok(self.roster.lock().await.find_employee(id))
    }

    async fn find_all_employees(&self) -> PersistenceResult<Vec<Employee>> {
        Ok(self.roster.lock().await.employees())
    }
}

#[async_trait]
impl LeagueRepository for InMemoryRepository {
    async fn insert_league(&self, name: &str) -> PersistenceResult<LeagueId> {
        self.check_writable()?;
        Ok(self.roster.lock().await.insert_league(name))
    }

    async fn update_league(&self, league: &League) -> PersistenceResult<()> {
        self.check_writable()?;
        self.roster.lock().await.update_league(league)
    }

    async fn delete_league(&self, id: LeagueId) -> PersistenceResult<()> {
        self.check_writable()?;
        self.roster.lock().await.delete_league(id)
    }

    async fn find_league(&self, id: LeagueId) -> PersistenceResult<Option<League>> {
        Ok(self.roster.lock().await.find_league(id))
    }

    async fn find_all_leagues(&self) -> PersistenceResult<Vec<League>> {
        Ok(self.roster.lock().await.leagues())
    }
}
