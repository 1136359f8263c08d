//! Storage-backed competition orchestration.
//!
//! [`CompetitionManager`] is the crate's entry point: generation operations
//! turn a roster into persisted rounds, groups, matches and standings rows;
//! progression operations walk matches through their lifecycle, maintain
//! standings tables and push winners through the bracket.

pub mod manager;
pub mod models;

pub use manager::CompetitionManager;
pub use models::{FinishReport, GeneratedFixtures, GroupStandings, StandingsView};
