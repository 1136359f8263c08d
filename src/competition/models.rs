//! Competition entity models shared across the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::EngineError;

/// Competition ID type
pub type CompetitionId = Uuid;
/// Team ID type (scoped to one competition)
pub type TeamId = Uuid;
/// Match ID type
pub type MatchId = Uuid;
/// Round ID type
pub type RoundId = Uuid;
/// Group ID type
pub type GroupId = Uuid;
/// Standings row ID type
pub type StandingId = Uuid;

/// Competition format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionFormat {
    /// Full round-robin league
    League,
    /// Single-elimination bracket
    Elimination,
    /// Group stage followed by a knockout bracket
    GroupsElimination,
}

impl CompetitionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionFormat::League => "league",
            CompetitionFormat::Elimination => "elimination",
            CompetitionFormat::GroupsElimination => "groups_elimination",
        }
    }
}

impl FromStr for CompetitionFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "league" => Ok(CompetitionFormat::League),
            "elimination" => Ok(CompetitionFormat::Elimination),
            "groups_elimination" => Ok(CompetitionFormat::GroupsElimination),
            other => Err(EngineError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for CompetitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a hybrid (groups + elimination) competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionPhase {
    /// Group stage in progress
    Groups,
    /// Knockout bracket in progress
    Knockout,
    /// Competition over
    Finished,
}

impl CompetitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionPhase::Groups => "groups",
            CompetitionPhase::Knockout => "knockout",
            CompetitionPhase::Finished => "finished",
        }
    }
}

impl FromStr for CompetitionPhase {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "groups" => Ok(CompetitionPhase::Groups),
            "knockout" => Ok(CompetitionPhase::Knockout),
            "finished" => Ok(CompetitionPhase::Finished),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown competition phase: {other}"
            ))),
        }
    }
}

/// Match lifecycle state. Transitions are monotonic:
/// `Pending -> InProgress -> Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Pending,
    InProgress,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Finished => "finished",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (MatchStatus::Pending, MatchStatus::InProgress)
                | (MatchStatus::InProgress, MatchStatus::Finished)
        )
    }
}

impl FromStr for MatchStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "in_progress" => Ok(MatchStatus::InProgress),
            "finished" => Ok(MatchStatus::Finished),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown match status: {other}"
            ))),
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competition record, as the engine needs to see it. CRUD attributes
/// (name, dates, media) stay with the owning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub format: CompetitionFormat,
    /// Group size for hybrid competitions
    pub teams_per_group: Option<u32>,
    /// Teams qualifying from each group into the knockout bracket
    pub qualified_per_group: Option<u32>,
    /// Current phase; only meaningful for hybrid competitions
    pub phase: CompetitionPhase,
}

/// A named grouping of matches. `stage_rank` is the creation sequence
/// within its competition and drives display ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub stage_rank: u32,
}

/// A group within a hybrid competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub competition_id: CompetitionId,
    pub name: String,
}

/// Which side of a match a slot or feeder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// The central fixture entity.
///
/// A side's team slot and feeder reference are mutually exclusive at
/// creation time. Once a feeder match finishes, its winner is written into
/// the team slot while the feeder reference is kept for back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub competition_id: CompetitionId,
    pub group_id: Option<GroupId>,
    pub round_id: Option<RoundId>,
    /// 1-based, dense and unique within (competition, round)
    pub round_match_number: u32,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub home_team: Option<TeamId>,
    pub away_team: Option<TeamId>,
    pub home_feeder: Option<MatchId>,
    pub away_feeder: Option<MatchId>,
    pub score_home: Option<i32>,
    pub score_away: Option<i32>,
    /// `None` until finished; also `None` for a draw
    pub winner: Option<TeamId>,
}

impl Match {
    /// Both team slots filled, so the match can actually be played.
    pub fn is_ready(&self) -> bool {
        self.home_team.is_some() && self.away_team.is_some()
    }

    pub fn team(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    pub fn set_team(&mut self, side: Side, team: TeamId) {
        match side {
            Side::Home => self.home_team = Some(team),
            Side::Away => self.away_team = Some(team),
        }
    }
}

/// One standings row: a team's cumulative record within its scope
/// (whole competition, or one group for hybrid formats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub id: StandingId,
    pub competition_id: CompetitionId,
    pub team_id: TeamId,
    pub group_id: Option<GroupId>,
    /// 1-based rank within the scope; 0 until first ranked
    pub position: u32,
    pub points: i32,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub score_for: i32,
    pub score_against: i32,
    pub score_difference: i32,
}

impl Standing {
    /// A zeroed row for a team, created at generation time.
    pub fn zeroed(competition_id: CompetitionId, team_id: TeamId, group_id: Option<GroupId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition_id,
            team_id,
            group_id,
            position: 0,
            points: 0,
            games_played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            score_for: 0,
            score_against: 0,
            score_difference: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_monotonic() {
        assert!(MatchStatus::Pending.can_transition_to(MatchStatus::InProgress));
        assert!(MatchStatus::InProgress.can_transition_to(MatchStatus::Finished));

        assert!(!MatchStatus::Pending.can_transition_to(MatchStatus::Finished));
        assert!(!MatchStatus::Finished.can_transition_to(MatchStatus::InProgress));
        assert!(!MatchStatus::Finished.can_transition_to(MatchStatus::Pending));
        assert!(!MatchStatus::InProgress.can_transition_to(MatchStatus::Pending));
    }

    #[test]
    fn test_format_round_trip() {
        for format in [
            CompetitionFormat::League,
            CompetitionFormat::Elimination,
            CompetitionFormat::GroupsElimination,
        ] {
            assert_eq!(format.as_str().parse::<CompetitionFormat>().unwrap(), format);
        }
        assert!("swiss".parse::<CompetitionFormat>().is_err());
    }

    #[test]
    fn test_match_readiness() {
        let mut m = Match {
            id: Uuid::new_v4(),
            competition_id: Uuid::new_v4(),
            group_id: None,
            round_id: None,
            round_match_number: 1,
            status: MatchStatus::Pending,
            scheduled_at: None,
            home_team: None,
            away_team: Some(Uuid::new_v4()),
            home_feeder: Some(Uuid::new_v4()),
            away_feeder: None,
            score_home: None,
            score_away: None,
            winner: None,
        };
        assert!(!m.is_ready());

        m.set_team(Side::Home, Uuid::new_v4());
        assert!(m.is_ready());
    }

    #[test]
    fn test_zeroed_standing() {
        let competition = Uuid::new_v4();
        let team = Uuid::new_v4();
        let row = Standing::zeroed(competition, team, None);
        assert_eq!(row.points, 0);
        assert_eq!(row.games_played, 0);
        assert_eq!(row.position, 0);
        assert_eq!(row.score_difference, 0);
        assert_eq!(row.team_id, team);
    }
}
