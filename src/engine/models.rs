//! Result values returned by manager operations.

use serde::{Deserialize, Serialize};

use crate::competition::{Group, Match, Round, Standing};

/// Everything a generation operation created, in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedFixtures {
    pub rounds: Vec<Round>,
    pub groups: Vec<Group>,
    pub standings: Vec<Standing>,
    pub matches: Vec<Match>,
}

/// One group's ranked table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStandings {
    pub group: Group,
    pub table: Vec<Standing>,
}

/// Format-dependent standings shape.
///
/// Leagues rank one table; elimination brackets have no meaningful table, so
/// the bracket itself (matches in stage order) is the standings view; hybrid
/// competitions show per-group tables during the group phase and the
/// knockout bracket afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StandingsView {
    Table(Vec<Standing>),
    Groups(Vec<GroupStandings>),
    Matches(Vec<Match>),
}

/// What finishing a match changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishReport {
    pub fixture: Match,
    /// Standings rows rewritten by this result (empty for bracket matches
    /// outside any standings scope)
    pub standings: Vec<Standing>,
}
