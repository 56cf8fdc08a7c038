use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::roster::Roster;
use crate::domain::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::domain::errors::{PersistenceError, PersistenceResult};
use crate::domain::league::{League, LeagueId};
use crate::domain::repositories::{EmployeeRepository, LeagueRepository};

/// Store keeping the whole roster in one JSON document
///
/// Every write rewrites the file through a sibling temporary file and a
/// rename, so a crash never leaves a half-written roster behind. The
/// in-memory copy is only replaced once the file is on disk.
pub struct JsonFileRepository {
    path: PathBuf,
    roster: Mutex<Roster>,
}

impl JsonFileRepository {
    /// Opens the roster at `path`, starting empty if the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref().to_path_buf();

        let roster = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PersistenceError::LoadImpossible(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No roster file yet, starting empty");
                Roster::default()
            }
            Err(e) => {
                return Err(PersistenceError::LoadImpossible(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            roster: Mutex::new(roster),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the roster, writes it, then keeps it
    async fn write<T>(
        &self,
        change: impl FnOnce(&mut Roster) -> PersistenceResult<T>,
    ) -> PersistenceResult<T> {
        let mut roster = self.roster.lock().await;
        let mut updated = roster.clone();
        let result = change(&mut updated)?;

        let bytes = serde_json::to_vec_pretty(&updated)
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to encode roster: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            PersistenceError::SaveImpossible(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            PersistenceError::SaveImpossible(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        *roster = updated;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Roster written");
        Ok(result)
    }
}

#[async_trait]
impl EmployeeRepository for JsonFileRepository {
    async fn insert_employee(&self, employee: &EmployeeDraft) -> PersistenceResult<EmployeeId> {
        self.write(|roster| Ok(roster.insert_employee(employee))).await
    }

    async fn update_employee(&self, employee: &Employee) -> PersistenceResult<()> {
        self.write(|roster| roster.update_employee(employee)).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<()> {
        self.write(|roster| roster.delete_employee(id)).await
    }

    async fn remove_employee(
        &self,
        id: EmployeeId,
        handover: Option<&League>,
    ) -> PersistenceResult<()> {
        self.write(|roster| roster.remove_employee(id, handover)).await
    }

    async fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>> {
        Ok(self.roster.lock().await.find_employee(id))
    }

    async fn find_all_employees(&self) -> PersistenceResult<Vec<Employee>> {
        Ok(self.roster.lock().await.employees())
    }
}

#[async_trait]
impl LeagueRepository for JsonFileRepository {
    async fn insert_league(&self, name: &str) -> PersistenceResult<LeagueId> {
        self.write(|roster| Ok(roster.insert_league(name))).await
    }

    async fn update_league(&self, league: &League) -> PersistenceResult<()> {
        self.write(|roster| roster.update_league(league)).await
    }

    async fn delete_league(&self, id: LeagueId) -> PersistenceResult<()> {
        self.write(|roster| roster.delete_league(id)).await
    }

    async fn find_league(&self, id: LeagueId) -> PersistenceResult<Option<League>> {
        Ok(self.roster.lock().await.find_league(id))
    }

    async fn find_all_leagues(&self) -> PersistenceResult<Vec<League>> {
        Ok(self.roster.lock().await.leagues())
    }
}
