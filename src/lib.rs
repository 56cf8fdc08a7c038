//! Personnel library
//!
//! Manages the employees and leagues of an organization: league
//! membership and administration, employee tenures, and persistence of
//! the roster to PostgreSQL or a JSON file.

pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
