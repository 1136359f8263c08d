//! Group-stage partitioning for hybrid competitions.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::competition::{EngineError, EngineResult, TeamId};

/// One planned group: a name and the teams assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub name: String,
    pub teams: Vec<TeamId>,
}

/// Sequential group naming: Group A, Group B, ...
pub fn group_name(index: usize) -> String {
    if index < 26 {
        format!("Group {}", (b'A' + index as u8) as char)
    } else {
        format!("Group {}", index + 1)
    }
}

/// Partition `teams` into groups of up to `teams_per_group`, in shuffle
/// order. The last group may be under-filled when teams run out.
pub fn plan_groups<R: Rng + ?Sized>(
    teams: &[TeamId],
    teams_per_group: u32,
    rng: &mut R,
) -> EngineResult<Vec<GroupPlan>> {
    if teams.is_empty() {
        return Err(EngineError::InvalidConfiguration(
            "a group stage needs at least one team".to_string(),
        ));
    }
    if teams_per_group <= 1 {
        return Err(EngineError::InvalidConfiguration(format!(
            "teams_per_group must be greater than 1, got {teams_per_group}"
        )));
    }

    let mut shuffled = teams.to_vec();
    shuffled.shuffle(rng);

    Ok(shuffled
        .chunks(teams_per_group as usize)
        .enumerate()
        .map(|(i, chunk)| GroupPlan {
            name: group_name(i),
            teams: chunk.to_vec(),
        })
        .collect())
}
