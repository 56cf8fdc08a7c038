use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::employee::{Employee, EmployeeDraft, EmployeeId, Tenure};
use crate::domain::errors::{PersistenceError, PersistenceResult};
use crate::domain::league::{League, LeagueId};
use crate::domain::repositories::{EmployeeRepository, LeagueRepository};

/// PostgreSQL implementation of the personnel store
///
/// Identities come from `BIGSERIAL` sequences. The schema lives under
/// `migrations/` and is applied with `migrate`.
pub struct PostgresPersonnelRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    league_id: Option<i64>,
    last_name: String,
    first_name: String,
    email: String,
    password_hash: String,
    arrival_date: Option<NaiveDate>,
    departure_date: Option<NaiveDate>,
}

impl EmployeeRow {
    fn into_employee(self) -> PersistenceResult<Employee> {
        let tenure = Tenure::new(self.arrival_date, self.departure_date).map_err(|e| {
            PersistenceError::LoadImpossible(format!("Invalid tenure for employee {}: {}", self.id, e))
        })?;

        Ok(Employee::from_persistence(
            EmployeeId::new(self.id),
            self.league_id.map(LeagueId::new),
            self.last_name,
            self.first_name,
            self.email,
            self.password_hash,
            tenure,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct LeagueRow {
    id: i64,
    name: String,
    administrator_id: Option<i64>,
}

impl From<LeagueRow> for League {
    fn from(row: LeagueRow) -> Self {
        League::from_persistence(
            LeagueId::new(row.id),
            row.name,
            row.administrator_id.map(EmployeeId::new),
        )
    }
}

const SELECT_EMPLOYEE: &str = r#"
    SELECT
        id, league_id, last_name, first_name, email,
        password_hash, arrival_date, departure_date
    FROM employees
"#;

impl PostgresPersonnelRepository {
    /// Creates a new PostgresPersonnelRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations
    pub async fn migrate(&self) -> PersistenceResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::LoadImpossible(format!("Failed to migrate: {}", e)))
    }
}

#[async_trait]
impl EmployeeRepository for PostgresPersonnelRepository {
    async fn insert_employee(&self, employee: &EmployeeDraft) -> PersistenceResult<EmployeeId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees (
                league_id, last_name, first_name, email,
                password_hash, arrival_date, departure_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(employee.league.map(|l| l.value()))
        .bind(&employee.last_name)
        .bind(&employee.first_name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(employee.tenure.arrival())
        .bind(employee.tenure.departure())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to insert employee: {}", e)))?;

        Ok(EmployeeId::new(id))
    }

    async fn update_employee(&self, employee: &Employee) -> PersistenceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET last_name = $2, first_name = $3, email = $4,
                password_hash = $5, arrival_date = $6, departure_date = $7
            WHERE id = $1
            "#,
        )
        .bind(employee.id().value())
        .bind(employee.last_name())
        .bind(employee.first_name())
        .bind(employee.email())
        .bind(employee.password_hash())
        .bind(employee.arrival_date())
        .bind(employee.departure_date())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to update employee: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::SaveImpossible(format!(
                "Employee not found: {}",
                employee.id()
            )));
        }

        Ok(())
    }

    async fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to delete employee: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::SaveImpossible(format!("Employee not found: {}", id)));
        }

        Ok(())
    }

    async fn remove_employee(
        &self,
        id: EmployeeId,
        handover: Option<&League>,
    ) -> PersistenceResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to begin transaction: {}", e)))?;

        if let Some(league) = handover {
            let result = sqlx::query("UPDATE leagues SET administrator_id = $2 WHERE id = $1")
                .bind(league.id().value())
                .bind(league.administrator().map(|a| a.value()))
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to update league: {}", e)))?;

            if result.rows_affected() == 0 {
                return Err(PersistenceError::SaveImpossible(format!(
                    "League not found: {}",
                    league.id()
                )));
            }
        }

        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to delete employee: {}", e)))?;

        // Dropping the transaction rolls back the league update
        if result.rows_affected() == 0 {
            return Err(PersistenceError::SaveImpossible(format!("Employee not found: {}", id)));
        }

        tx.commit()
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to commit removal: {}", e)))
    }

    async fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!("{SELECT_EMPLOYEE} WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PersistenceError::LoadImpossible(format!("Failed to find employee by id: {}", e)))?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    async fn find_all_employees(&self) -> PersistenceResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(&format!("{SELECT_EMPLOYEE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PersistenceError::LoadImpossible(format!("Failed to load employees: {}", e)))?;

        rows.into_iter().map(EmployeeRow::into_employee).collect()
    }
}

#[async_trait]
impl LeagueRepository for PostgresPersonnelRepository {
    async fn insert_league(&self, name: &str) -> PersistenceResult<LeagueId> {
        let id: i64 = sqlx::query_scalar("INSERT INTO leagues (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to insert league: {}", e)))?;

        Ok(LeagueId::new(id))
    }

    async fn update_league(&self, league: &League) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE leagues SET name = $2, administrator_id = $3 WHERE id = $1")
            .bind(league.id().value())
            .bind(league.name())
            .bind(league.administrator().map(|a| a.value()))
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to update league: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::SaveImpossible(format!(
                "League not found: {}",
                league.id()
            )));
        }

        Ok(())
    }

    async fn delete_league(&self, id: LeagueId) -> PersistenceResult<()> {
        let result = sqlx::query("DELETE FROM leagues WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::SaveImpossible(format!("Failed to delete league: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::SaveImpossible(format!("League not found: {}", id)));
        }

        Ok(())
    }

    async fn find_league(&self, id: LeagueId) -> PersistenceResult<Option<League>> {
        let row: Option<LeagueRow> =
            sqlx::query_as("SELECT id, name, administrator_id FROM leagues WHERE id = $1")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PersistenceError::LoadImpossible(format!("Failed to find league by id: {}", e)))?;

        Ok(row.map(League::from))
    }

    async fn find_all_leagues(&self) -> PersistenceResult<Vec<League>> {
        let rows: Vec<LeagueRow> =
            sqlx::query_as("SELECT id, name, administrator_id FROM leagues ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PersistenceError::LoadImpossible(format!("Failed to load leagues: {}", e)))?;

        Ok(rows.into_iter().map(League::from).collect())
    }
}
