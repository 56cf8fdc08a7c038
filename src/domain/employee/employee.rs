use super::value_objects::{EmployeeId, Tenure};
use crate::auth::password::{hash_password, verify_password};
use crate::domain::errors::PersonnelResult;
use crate::domain::league::{League, LeagueId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Profile submitted when hiring an employee (or creating the root)
///
/// Holds the plaintext password until the registry hashes it.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use personnel::domain::employee::NewEmployee;
///
/// let jean = NewEmployee::new("Dupont", "Jean", "jean@judo.fr", "secret")
///     .arriving(NaiveDate::from_ymd_opt(2021, 9, 1));
/// assert!(jean.tenure().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password: String,
    pub arrival: Option<NaiveDate>,
    pub departure: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: email.into(),
            password: password.into(),
            arrival: None,
            departure: None,
        }
    }

    pub fn arriving(mut self, arrival: Option<NaiveDate>) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn departing(mut self, departure: Option<NaiveDate>) -> Self {
        self.departure = departure;
        self
    }

    /// Validates the submitted dates
    pub fn tenure(&self) -> PersonnelResult<Tenure> {
        Ok(Tenure::new(self.arrival, self.departure)?)
    }

    /// Hashes the password and validates the dates, producing what the
    /// store needs to insert the employee
    pub(crate) fn into_draft(
        self,
        league: Option<LeagueId>,
        hash_cost: u32,
    ) -> PersonnelResult<EmployeeDraft> {
        let tenure = self.tenure()?;
        let password_hash = hash_password(&self.password, hash_cost)?;

        Ok(EmployeeDraft {
            league,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            password_hash,
            tenure,
        })
    }
}

/// An employee that has been validated but not yet given an identity
///
/// Passed to `EmployeeRepository::insert`, which answers with the
/// assigned `EmployeeId`.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub league: Option<LeagueId>,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    pub tenure: Tenure,
}

/// Employee of a league, or the root employee when `league` is `None`
///
/// Employees are only created through the `PersonnelRegistry`, which
/// assigns identities and keeps membership and administration consistent.
///
/// # Invariants
/// - `id` never changes after insertion
/// - `tenure` never has departure before arrival
/// - Equality and hashing are by identity only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    league: Option<LeagueId>,
    last_name: String,
    first_name: String,
    email: String,
    password_hash: String,
    tenure: Tenure,
}

impl Employee {
    pub(crate) fn from_draft(id: EmployeeId, draft: EmployeeDraft) -> Self {
        Self {
            id,
            league: draft.league,
            last_name: draft.last_name,
            first_name: draft.first_name,
            email: draft.email,
            password_hash: draft.password_hash,
            tenure: draft.tenure,
        }
    }

    /// Returns true iff this employee is the administrator of `league`
    pub fn is_administrator(&self, league: &League) -> bool {
        league.administrator() == Some(self.id)
    }

    /// Returns true iff `candidate` is the password last set
    pub fn check_password(&self, candidate: &str) -> bool {
        match verify_password(candidate, &self.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(employee_id = %self.id, error = %e, "Stored credential is unreadable");
                false
            }
        }
    }

    // ===== Mutators =====
    //
    // These only touch the in-memory value. Go through
    // `PersonnelRegistry::modify_employee` so the change is persisted.

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.first_name = first_name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Replaces the password, storing only its bcrypt hash
    pub fn set_password(&mut self, password: &str, hash_cost: u32) -> PersonnelResult<()> {
        self.password_hash = hash_password(password, hash_cost)?;
        Ok(())
    }

    /// Sets the arrival date; the tenure is untouched on failure
    pub fn set_arrival_date(&mut self, arrival: Option<NaiveDate>) -> PersonnelResult<()> {
        self.tenure = self.tenure.with_arrival(arrival)?;
        Ok(())
    }

    /// Sets the departure date; the tenure is untouched on failure
    pub fn set_departure_date(&mut self, departure: Option<NaiveDate>) -> PersonnelResult<()> {
        self.tenure = self.tenure.with_departure(departure)?;
        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    /// Returns the league this employee belongs to, `None` for root
    pub fn league(&self) -> Option<LeagueId> {
        self.league
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the stored bcrypt hash, for repositories only
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn tenure(&self) -> Tenure {
        self.tenure
    }

    pub fn arrival_date(&self) -> Option<NaiveDate> {
        self.tenure.arrival()
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.tenure.departure()
    }

    /// Formats as `lastname firstname email (affiliation)`
    ///
    /// `league_name` is `None` for the root, which shows as `super-user`.
    pub fn display_with<'a>(&'a self, league_name: Option<&'a str>) -> EmployeeDisplay<'a> {
        EmployeeDisplay {
            employee: self,
            league_name,
        }
    }

    /// Reconstructs an Employee from persistence layer data
    ///
    /// Only to be used by repository implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: EmployeeId,
        league: Option<LeagueId>,
        last_name: String,
        first_name: String,
        email: String,
        password_hash: String,
        tenure: Tenure,
    ) -> Self {
        Self {
            id,
            league,
            last_name,
            first_name,
            email,
            password_hash,
            tenure,
        }
    }
}

impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Employee {}

impl std::hash::Hash for Employee {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Last name, then first name; the id only breaks ties between namesakes
impl Ord for Employee {
    fn cmp(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Employee {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct EmployeeDisplay<'a> {
    employee: &'a Employee,
    league_name: Option<&'a str>,
}

impl fmt::Display for EmployeeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.employee.last_name,
            self.employee.first_name,
            self.employee.email,
            self.league_name.unwrap_or("super-user")
        )
    }
}
