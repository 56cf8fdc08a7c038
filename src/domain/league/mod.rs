// League domain module

#![allow(clippy::module_inception)]

pub mod league;
pub mod value_objects;

pub use league::League;
pub use value_objects::LeagueId;
