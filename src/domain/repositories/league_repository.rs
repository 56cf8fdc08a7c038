use async_trait::async_trait;

use crate::domain::errors::PersistenceResult;
use crate::domain::league::{League, LeagueId};

/// Repository trait for League records
///
/// Only the league's own fields are stored here; membership is carried
/// by each employee's league.
#[async_trait]
pub trait LeagueRepository: Send + Sync {
    /// Insert a new league and return its assigned identity
    async fn insert_league(&self, name: &str) -> PersistenceResult<LeagueId>;

    /// Persist name and administrator of an existing league
    async fn update_league(&self, league: &League) -> PersistenceResult<()>;

    /// Delete a league by ID
    async fn delete_league(&self, id: LeagueId) -> PersistenceResult<()>;

    /// Find a league by its ID
    async fn find_league(&self, id: LeagueId) -> PersistenceResult<Option<League>>;

    /// Load every league
    async fn find_all_leagues(&self) -> PersistenceResult<Vec<League>>;
}
