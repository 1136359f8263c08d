//! Cumulative statistics and ranking order for standings tables.
//!
//! A win is worth 3 points, a draw 1, a loss 0. Ranking sorts by points,
//! then score difference, then score for, all descending; the sort is
//! stable, so rows tied on all three keep their relative order.

use std::cmp::Ordering;

use crate::competition::{Standing, TeamId};

/// The winning team for a final score, or `None` on a draw.
pub fn winner_of(
    home: TeamId,
    away: TeamId,
    score_home: i32,
    score_away: i32,
) -> Option<TeamId> {
    match score_home.cmp(&score_away) {
        Ordering::Greater => Some(home),
        Ordering::Less => Some(away),
        Ordering::Equal => None,
    }
}

/// Fold a final score into both teams' cumulative rows.
pub fn apply_result(home: &mut Standing, away: &mut Standing, score_home: i32, score_away: i32) {
    home.score_for += score_home;
    home.score_against += score_away;
    away.score_for += score_away;
    away.score_against += score_home;

    home.score_difference = home.score_for - home.score_against;
    away.score_difference = away.score_for - away.score_against;

    match score_home.cmp(&score_away) {
        Ordering::Greater => {
            home.wins += 1;
            home.points += 3;
            away.losses += 1;
        }
        Ordering::Less => {
            away.wins += 1;
            away.points += 3;
            home.losses += 1;
        }
        Ordering::Equal => {
            home.draws += 1;
            away.draws += 1;
            home.points += 1;
            away.points += 1;
        }
    }

    home.games_played += 1;
    away.games_played += 1;
}

/// Ranking comparator: points desc, score difference desc, score for desc.
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.score_difference.cmp(&a.score_difference))
        .then(b.score_for.cmp(&a.score_for))
}

/// Sort `rows` into ranking order and assign 1-based positions.
pub fn rank(rows: &mut [Standing]) {
    rows.sort_by(compare);
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
}
