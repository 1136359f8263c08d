//! Engine error types.

use thiserror::Error;

use super::models::{CompetitionId, MatchId, MatchStatus};
use crate::db::StoreError;

/// Errors surfaced by generation, assignment and progression operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Fewer than 2 entrants
    #[error("at least 2 teams are required, have {have}")]
    InsufficientTeams { have: usize },

    /// Bad format parameters
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Qualified-team count is not a power of two
    #[error("qualified team count {total} is not a power of two >= 2")]
    InvalidBracketSize { total: usize },

    /// Placeholder/slot count mismatch during knockout assignment
    #[error("knockout assignment mismatch: {clashes} clashes for {slots} first-round matches")]
    AssignmentMismatch { clashes: usize, slots: usize },

    /// Match status transition not allowed
    #[error("invalid match state transition: {from} -> {to}")]
    InvalidStateTransition { from: MatchStatus, to: MatchStatus },

    /// Competition format not recognized
    #[error("unknown competition format: {0}")]
    UnknownFormat(String),

    /// A drawn score in a round that must produce a winner
    #[error("match {0} cannot end in a draw")]
    DrawNotAllowed(MatchId),

    /// Finishing a match whose team slots are not both filled yet
    #[error("match {0} has unfilled team slots")]
    MatchNotReady(MatchId),

    #[error("competition not found: {0}")]
    CompetitionNotFound(CompetitionId),

    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    /// Storage error
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
