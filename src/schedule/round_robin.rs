//! Round-robin scheduling via the circle method.

use crate::competition::{EngineError, EngineResult, TeamId};

/// Produce a full round-robin schedule for `teams`.
///
/// Returns one entry per round, each holding its (home, away) pairings in
/// order. For an odd team count a placeholder entrant fills the circle and
/// its pairings are dropped, leaving one team idle per round.
///
/// Every unordered pair of real teams appears exactly once across the
/// returned rounds.
pub fn circle_rounds(teams: &[TeamId]) -> EngineResult<Vec<Vec<(TeamId, TeamId)>>> {
    if teams.len() < 2 {
        return Err(EngineError::InsufficientTeams { have: teams.len() });
    }

    // The circle holds `None` for the placeholder slot when the count is odd.
    let mut circle: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if circle.len() % 2 != 0 {
        circle.push(None);
    }

    let total = circle.len();
    let num_rounds = total - 1;
    let pairs_per_round = total / 2;

    let mut rounds = Vec::with_capacity(num_rounds);
    for _ in 0..num_rounds {
        let mut pairings = Vec::with_capacity(pairs_per_round);
        for i in 0..pairs_per_round {
            if let (Some(home), Some(away)) = (circle[i], circle[total - 1 - i]) {
                pairings.push((home, away));
            }
        }
        rounds.push(pairings);

        // Keep index 0 fixed, move the last entry to index 1, shift the rest.
        let last = circle.pop().unwrap_or(None);
        circle.insert(1, last);
    }

    Ok(rounds)
}
