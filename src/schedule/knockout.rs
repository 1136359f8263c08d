//! Knockout bracket skeletons for hybrid competitions, plus the canonical
//! seeding order that maps group finishers into first-round slots.

use super::elimination::round_labels;
use super::{BracketPlan, FeederSlot, PlannedMatch, PlannedRound};
use crate::competition::{EngineError, EngineResult};

/// Placeholder label for a qualified position, e.g. `1º Group A`.
pub fn placeholder_label(position: u32, group_name: &str) -> String {
    format!("{position}º {group_name}")
}

/// Canonical first-round clashes as (home, away) placeholder labels.
///
/// Qualified positions are enumerated first-of-each-group, then
/// second-of-each-group, and so on; the first half of that list meets the
/// reversed second half, so the best positions face the worst.
pub fn first_round_clashes(
    group_names: &[String],
    qualified_per_group: u32,
) -> Vec<(String, String)> {
    let mut placeholders = Vec::with_capacity(group_names.len() * qualified_per_group as usize);
    for position in 1..=qualified_per_group {
        for name in group_names {
            placeholders.push(placeholder_label(position, name));
        }
    }

    let num_clashes = placeholders.len() / 2;
    let low_seeds: Vec<String> = placeholders.split_off(num_clashes);
    placeholders
        .into_iter()
        .zip(low_seeds.into_iter().rev())
        .collect()
}

/// Plan the full knockout tree before any group finishes: first-round
/// matches with both slots open, later rounds linked by feeder references.
///
/// `num_groups * qualified_per_group` must be a power of two of at least 2.
pub fn plan_skeleton(num_groups: u32, qualified_per_group: u32) -> EngineResult<BracketPlan> {
    let total = (num_groups as usize) * (qualified_per_group as usize);
    if total < 2 || !total.is_power_of_two() {
        return Err(EngineError::InvalidBracketSize { total });
    }

    let labels = round_labels(total);
    let mut plan = BracketPlan::default();

    // First round: open slots, numbered in canonical seeding order.
    plan.rounds.push(PlannedRound {
        name: labels[0].clone(),
    });
    let mut feeders: Vec<usize> = Vec::with_capacity(total / 2);
    for i in 0..total / 2 {
        plan.matches.push(PlannedMatch {
            round: 0,
            number: i as u32 + 1,
            home: None,
            away: None,
        });
        feeders.push(i);
    }

    for label in labels.into_iter().skip(1) {
        let round_idx = plan.rounds.len();
        plan.rounds.push(PlannedRound { name: label });

        let mut next_feeders = Vec::with_capacity(feeders.len() / 2);
        for (i, pair) in feeders.chunks_exact(2).enumerate() {
            let match_idx = plan.matches.len();
            plan.matches.push(PlannedMatch {
                round: round_idx,
                number: i as u32 + 1,
                home: Some(FeederSlot::PendingMatch(pair[0])),
                away: Some(FeederSlot::PendingMatch(pair[1])),
            });
            next_feeders.push(match_idx);
        }
        feeders = next_feeders;
    }

    Ok(plan)
}
