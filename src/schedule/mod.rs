//! Pure fixture planners.
//!
//! Each planner turns a roster of team ids into a plan value: which rounds
//! exist, which matches they contain, and how match slots are filled (a team
//! directly, or the winner of an earlier planned match). Planners never touch
//! storage; the manager materializes plans into entities and persists them in
//! one transaction.
//!
//! Plans reference their own matches by index, not by id, because ids are
//! minted at materialization time.

pub mod elimination;
pub mod groups;
pub mod knockout;
pub mod round_robin;

pub use elimination::{plan_bracket, round_labels};
pub use groups::{GroupPlan, plan_groups};
pub use knockout::{first_round_clashes, placeholder_label, plan_skeleton};
pub use round_robin::circle_rounds;

use crate::competition::TeamId;

/// How a planned match slot gets its team: directly, or from the winner of
/// another planned match (referenced by index into the plan's match list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederSlot {
    Team(TeamId),
    PendingMatch(usize),
}

/// A round in a plan; `stage_rank` offsets are applied at materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRound {
    pub name: String,
}

/// A match in a plan. `home`/`away` of `None` mean the slot stays open until
/// assignment fills it (knockout skeletons).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    /// Index into the plan's round list
    pub round: usize,
    /// 1-based number within the round
    pub number: u32,
    pub home: Option<FeederSlot>,
    pub away: Option<FeederSlot>,
}

/// A complete elimination-tree plan.
#[derive(Debug, Clone, Default)]
pub struct BracketPlan {
    pub rounds: Vec<PlannedRound>,
    pub matches: Vec<PlannedMatch>,
}

impl BracketPlan {
    /// Matches belonging to the round at `round_idx`, in number order.
    pub fn matches_in_round(&self, round_idx: usize) -> Vec<&PlannedMatch> {
        self.matches.iter().filter(|m| m.round == round_idx).collect()
    }
}
