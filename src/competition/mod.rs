//! Competition entities and engine error types.
//!
//! Everything the fixture engine reads or writes is expressed with the plain
//! data types in this module: competitions, rounds, groups, matches and
//! standings rows. The storage layer (`crate::db`) moves these values in and
//! out of the backing store; the planners (`crate::schedule`) and the manager
//! (`crate::engine`) only ever manipulate them in memory.

pub mod errors;
pub mod models;

pub use errors::{EngineError, EngineResult};
pub use models::{
    Competition, CompetitionFormat, CompetitionId, CompetitionPhase, Group, GroupId, Match,
    MatchId, MatchStatus, Round, RoundId, Side, Standing, StandingId, TeamId,
};
