use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::auth::password::DEFAULT_COST;
use crate::domain::employee::{Employee, EmployeeId, NewEmployee};
use crate::domain::errors::{PersonnelError, PersonnelResult};
use crate::domain::league::{League, LeagueId};
use crate::domain::repositories::PersonnelStore;

/// Personnel registry aggregate root
///
/// Owns every league and employee, plus the single root employee, and is
/// the only way to mutate them. Each mutation is validated, persisted
/// through the store and only then applied in memory, so a failed save
/// leaves the registry exactly as it was and reports the failure.
///
/// # Invariants
/// - At most one root employee; once created it cannot be replaced or removed
/// - The root belongs to no league; every other employee belongs to exactly one
/// - A league's administrator is one of its members or the root
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use personnel::auth::password::MIN_COST;
/// use personnel::domain::employee::NewEmployee;
/// use personnel::domain::PersonnelRegistry;
/// use personnel::infrastructure::repositories::InMemoryRepository;
///
/// # tokio_test(async {
/// let mut registry =
///     PersonnelRegistry::new(Arc::new(InMemoryRepository::new())).with_hash_cost(MIN_COST);
/// let root = registry.create_root(NewEmployee::new("Root", "Root", "", "toor")).await.unwrap();
/// let judo = registry.create_league("Judo").await.unwrap();
/// let jean = registry
///     .add_employee(judo, NewEmployee::new("Dupont", "Jean", "jean@judo.fr", "pw"))
///     .await
///     .unwrap();
///
/// registry.set_administrator(judo, jean).await.unwrap();
/// registry.remove_employee(jean).await.unwrap();
///
/// assert_eq!(registry.league(judo).unwrap().administrator(), Some(root));
/// # });
/// # fn tokio_test<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct PersonnelRegistry {
    store: Arc<dyn PersonnelStore>,
    leagues: BTreeMap<LeagueId, League>,
    employees: BTreeMap<EmployeeId, Employee>,
    root: OnceLock<EmployeeId>,
    hash_cost: u32,
}

impl PersonnelRegistry {
    /// Creates an empty registry backed by `store`
    pub fn new(store: Arc<dyn PersonnelStore>) -> Self {
        Self {
            store,
            leagues: BTreeMap::new(),
            employees: BTreeMap::new(),
            root: OnceLock::new(),
            hash_cost: DEFAULT_COST,
        }
    }

    /// Sets the bcrypt cost used for passwords hashed from now on
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    /// Rebuilds a registry from everything `store` holds
    ///
    /// Membership is derived from each employee's league and the root is
    /// the one employee without a league.
    ///
    /// # Errors
    /// * `Persistence(LoadImpossible)` - The store could not be read
    /// * `InconsistentStore` - Several roots, a dangling league reference,
    ///   or an administrator who is neither member nor root
    pub async fn load(store: Arc<dyn PersonnelStore>) -> PersonnelResult<Self> {
        let mut registry = Self::new(store);

        for league in registry.store.find_all_leagues().await? {
            registry.leagues.insert(league.id(), league);
        }

        for employee in registry.store.find_all_employees().await? {
            match employee.league() {
                None => {
                    if registry.root.set(employee.id()).is_err() {
                        return Err(PersonnelError::InconsistentStore(format!(
                            "employee {} is a second root",
                            employee.id()
                        )));
                    }
                }
                Some(league_id) => {
                    let league = registry.leagues.get_mut(&league_id).ok_or_else(|| {
                        PersonnelError::InconsistentStore(format!(
                            "employee {} belongs to missing league {}",
                            employee.id(),
                            league_id
                        ))
                    })?;
                    league.join(employee.id());
                }
            }
            registry.employees.insert(employee.id(), employee);
        }

        for league in registry.leagues.values() {
            if let Some(admin) = league.administrator() {
                if !league.contains(admin) && registry.root.get() != Some(&admin) {
                    return Err(PersonnelError::InconsistentStore(format!(
                        "administrator {} of league {} is neither member nor root",
                        admin,
                        league.id()
                    )));
                }
            }
        }

        tracing::info!(
            leagues = registry.leagues.len(),
            employees = registry.employees.len(),
            has_root = registry.root.get().is_some(),
            "Personnel registry loaded"
        );

        Ok(registry)
    }

    // ===== Root =====

    /// Creates the root employee; succeeds at most once per registry
    pub async fn create_root(&mut self, profile: NewEmployee) -> PersonnelResult<EmployeeId> {
        if self.root.get().is_some() {
            return Err(PersonnelError::RootAlreadyExists);
        }

        let draft = profile.into_draft(None, self.hash_cost)?;
        let id = self.store.insert_employee(&draft).await?;

        self.root
            .set(id)
            .map_err(|_| PersonnelError::RootAlreadyExists)?;
        self.employees.insert(id, Employee::from_draft(id, draft));

        tracing::info!(employee_id = %id, "Root employee created");
        Ok(id)
    }

    pub fn root(&self) -> Option<&Employee> {
        self.root.get().and_then(|id| self.employees.get(id))
    }

    /// Returns true iff `employee` is this registry's root
    pub fn is_root(&self, employee: &Employee) -> bool {
        self.root.get() == Some(&employee.id())
    }

    // ===== Leagues =====

    pub async fn create_league(&mut self, name: impl Into<String>) -> PersonnelResult<LeagueId> {
        let name = name.into();
        let id = self.store.insert_league(&name).await?;

        tracing::info!(league_id = %id, name = %name, "League created");
        self.leagues.insert(id, League::new(id, name));
        Ok(id)
    }

    pub async fn rename_league(
        &mut self,
        league_id: LeagueId,
        name: impl Into<String>,
    ) -> PersonnelResult<()> {
        let mut league = self.require_league(league_id)?.clone();
        league.rename(name.into());

        self.store.update_league(&league).await?;
        self.leagues.insert(league_id, league);
        Ok(())
    }

    /// Removes a league together with all of its members
    ///
    /// Members are deleted one by one before the league itself; if the
    /// store fails part-way, the members already deleted are gone from
    /// memory too and the error is returned.
    pub async fn remove_league(&mut self, league_id: LeagueId) -> PersonnelResult<()> {
        let members: Vec<EmployeeId> = self
            .require_league(league_id)?
            .employees()
            .iter()
            .copied()
            .collect();

        for member in members {
            self.store.delete_employee(member).await?;
            self.employees.remove(&member);
            if let Some(league) = self.leagues.get_mut(&league_id) {
                league.leave(member);
                if league.administrator() == Some(member) {
                    league.set_administrator(None);
                }
            }
        }

        self.store.delete_league(league_id).await?;
        self.leagues.remove(&league_id);

        tracing::info!(league_id = %league_id, "League removed");
        Ok(())
    }

    pub fn league(&self, league_id: LeagueId) -> Option<&League> {
        self.leagues.get(&league_id)
    }

    /// Returns every league sorted by name
    pub fn leagues(&self) -> Vec<&League> {
        let mut leagues: Vec<&League> = self.leagues.values().collect();
        leagues.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
        leagues
    }

    /// Returns the members of a league sorted by last name, then first name
    pub fn league_employees(&self, league_id: LeagueId) -> PersonnelResult<Vec<&Employee>> {
        let league = self.require_league(league_id)?;
        let mut employees: Vec<&Employee> = league
            .employees()
            .iter()
            .filter_map(|id| self.employees.get(id))
            .collect();
        employees.sort();
        Ok(employees)
    }

    pub fn league_administrator(&self, league_id: LeagueId) -> Option<&Employee> {
        self.leagues
            .get(&league_id)
            .and_then(|league| league.administrator())
            .and_then(|id| self.employees.get(&id))
    }

    /// Makes `employee_id` the administrator of `league_id`
    ///
    /// # Errors
    /// * `NotAMember` - The employee is neither a member of the league nor the root
    pub async fn set_administrator(
        &mut self,
        league_id: LeagueId,
        employee_id: EmployeeId,
    ) -> PersonnelResult<()> {
        let is_root = self.is_root(self.require_employee(employee_id)?);

        let mut league = self.require_league(league_id)?.clone();
        if !is_root && !league.contains(employee_id) {
            return Err(PersonnelError::NotAMember {
                employee: employee_id,
                league: league_id,
            });
        }
        league.set_administrator(Some(employee_id));

        self.store.update_league(&league).await?;
        self.leagues.insert(league_id, league);

        tracing::info!(league_id = %league_id, employee_id = %employee_id, "League administrator changed");
        Ok(())
    }

    // ===== Employees =====

    /// Hires a new employee into `league_id`
    pub async fn add_employee(
        &mut self,
        league_id: LeagueId,
        profile: NewEmployee,
    ) -> PersonnelResult<EmployeeId> {
        self.require_league(league_id)?;

        let draft = profile.into_draft(Some(league_id), self.hash_cost)?;
        let id = self.store.insert_employee(&draft).await?;

        self.employees.insert(id, Employee::from_draft(id, draft));
        if let Some(league) = self.leagues.get_mut(&league_id) {
            league.join(id);
        }

        tracing::info!(employee_id = %id, league_id = %league_id, "Employee added");
        Ok(id)
    }

    /// Removes an employee from the registry and their league
    ///
    /// If they administered their league, administration passes to the
    /// root (or is cleared while no root exists).
    ///
    /// # Errors
    /// * `CannotRemoveRoot` - Always, for the root; nothing is changed
    pub async fn remove_employee(&mut self, employee_id: EmployeeId) -> PersonnelResult<()> {
        let employee = self.require_employee(employee_id)?;
        if self.is_root(employee) {
            tracing::warn!(employee_id = %employee_id, "Refused to remove the root employee");
            return Err(PersonnelError::CannotRemoveRoot);
        }

        let mut handover = None;
        if let Some(league_id) = employee.league() {
            let league = self.require_league(league_id)?;
            if employee.is_administrator(league) {
                let mut league = league.clone();
                league.set_administrator(self.root.get().copied());
                handover = Some(league);
            }
        }

        self.store
            .remove_employee(employee_id, handover.as_ref())
            .await?;

        if let Some(league) = handover {
            tracing::info!(league_id = %league.id(), "Administration passed to root");
            self.leagues.insert(league.id(), league);
        }
        if let Some(employee) = self.employees.remove(&employee_id) {
            if let Some(league) = employee.league().and_then(|id| self.leagues.get_mut(&id)) {
                league.leave(employee_id);
            }
        }

        tracing::info!(employee_id = %employee_id, "Employee removed");
        Ok(())
    }

    pub fn employee(&self, employee_id: EmployeeId) -> Option<&Employee> {
        self.employees.get(&employee_id)
    }

    /// Returns every employee, root included, in name order
    pub fn employees(&self) -> Vec<&Employee> {
        let mut employees: Vec<&Employee> = self.employees.values().collect();
        employees.sort();
        employees
    }

    /// Applies `change` to a copy of the employee, persists it, then keeps it
    ///
    /// If `change` fails or the store refuses the update, the employee is
    /// left as it was.
    pub async fn modify_employee<F>(&mut self, employee_id: EmployeeId, change: F) -> PersonnelResult<()>
    where
        F: FnOnce(&mut Employee) -> PersonnelResult<()>,
    {
        let mut employee = self.require_employee(employee_id)?.clone();
        change(&mut employee)?;

        self.store.update_employee(&employee).await?;
        self.employees.insert(employee_id, employee);

        tracing::debug!(employee_id = %employee_id, "Employee updated");
        Ok(())
    }

    pub async fn set_last_name(&mut self, employee_id: EmployeeId, last_name: &str) -> PersonnelResult<()> {
        self.modify_employee(employee_id, |e| {
            e.set_last_name(last_name);
            Ok(())
        })
        .await
    }

    pub async fn set_first_name(&mut self, employee_id: EmployeeId, first_name: &str) -> PersonnelResult<()> {
        self.modify_employee(employee_id, |e| {
            e.set_first_name(first_name);
            Ok(())
        })
        .await
    }

    pub async fn set_email(&mut self, employee_id: EmployeeId, email: &str) -> PersonnelResult<()> {
        self.modify_employee(employee_id, |e| {
            e.set_email(email);
            Ok(())
        })
        .await
    }

    pub async fn set_password(&mut self, employee_id: EmployeeId, password: &str) -> PersonnelResult<()> {
        let hash_cost = self.hash_cost;
        self.modify_employee(employee_id, |e| e.set_password(password, hash_cost))
            .await
    }

    /// # Errors
    /// * `InvalidDateRange` - `arrival` is after the current departure
    pub async fn set_arrival_date(
        &mut self,
        employee_id: EmployeeId,
        arrival: Option<NaiveDate>,
    ) -> PersonnelResult<()> {
        self.modify_employee(employee_id, |e| e.set_arrival_date(arrival))
            .await
    }

    /// # Errors
    /// * `InvalidDateRange` - `departure` is before the current arrival
    pub async fn set_departure_date(
        &mut self,
        employee_id: EmployeeId,
        departure: Option<NaiveDate>,
    ) -> PersonnelResult<()> {
        self.modify_employee(employee_id, |e| e.set_departure_date(departure))
            .await
    }

    /// Formats an employee as `lastname firstname email (league)`
    pub fn describe(&self, employee: &Employee) -> String {
        let league_name = if self.is_root(employee) {
            None
        } else {
            employee
                .league()
                .and_then(|id| self.leagues.get(&id))
                .map(|league| league.name())
        };
        employee.display_with(league_name).to_string()
    }

    fn require_employee(&self, employee_id: EmployeeId) -> PersonnelResult<&Employee> {
        self.employees
            .get(&employee_id)
            .ok_or(PersonnelError::EmployeeNotFound(employee_id))
    }

    fn require_league(&self, league_id: LeagueId) -> PersonnelResult<&League> {
        self.leagues
            .get(&league_id)
            .ok_or(PersonnelError::LeagueNotFound(league_id))
    }
}
