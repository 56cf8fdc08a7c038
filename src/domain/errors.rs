use chrono::NaiveDate;
use thiserror::Error;

use super::employee::EmployeeId;
use super::league::LeagueId;

/// Raised when a tenure would end before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("invalid arrival: {arrival} is after departure {departure}")]
    ArrivalAfterDeparture {
        arrival: NaiveDate,
        departure: NaiveDate,
    },

    #[error("invalid departure: {departure} is before arrival {arrival}")]
    DepartureBeforeArrival {
        arrival: NaiveDate,
        departure: NaiveDate,
    },
}

/// Failures reported by a personnel store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("save impossible: {0}")]
    SaveImpossible(String),

    #[error("load impossible: {0}")]
    LoadImpossible(String),
}

/// Errors that can occur while working with the personnel registry
#[derive(Debug, Error)]
pub enum PersonnelError {
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeError),

    #[error("the root employee cannot be removed")]
    CannotRemoveRoot,

    #[error("the root employee already exists")]
    RootAlreadyExists,

    #[error("employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    #[error("league not found: {0}")]
    LeagueNotFound(LeagueId),

    #[error("employee {employee} is not a member of league {league}")]
    NotAMember {
        employee: EmployeeId,
        league: LeagueId,
    },

    #[error("credential error: {0}")]
    Credential(String),

    #[error("inconsistent store: {0}")]
    InconsistentStore(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type PersonnelResult<T> = Result<T, PersonnelError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;
