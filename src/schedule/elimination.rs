//! Single-elimination bracket planning with bye and preliminary-round
//! handling for rosters that are not a power of two.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{BracketPlan, FeederSlot, PlannedMatch, PlannedRound};
use crate::competition::{EngineError, EngineResult, TeamId};

/// Stage label for a round containing `matches` matches.
pub fn stage_label(matches: usize) -> String {
    match matches {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        4 => "Quarterfinals".to_string(),
        8 => "Round of 16".to_string(),
        16 => "Round of 32".to_string(),
        n => format!("Round of {}", n * 2),
    }
}

/// Round labels for a bracket of `bracket_size` entrants (a power of two),
/// from the largest stage down to the final.
pub fn round_labels(bracket_size: usize) -> Vec<String> {
    if bracket_size < 2 {
        return Vec::new();
    }
    let num_rounds = bracket_size.ilog2() as usize;
    (0..num_rounds)
        .map(|i| stage_label(1 << (num_rounds - 1 - i)))
        .collect()
}

/// Plan a single-elimination tree for `teams`.
///
/// Seeding is a random shuffle. With `P` the next power of two at or above
/// the roster size, the first `P - N` shuffled teams advance on a bye and
/// the rest are paired consecutively into a preliminary round. Bye teams
/// and preliminary matches together feed the first full round, reshuffled
/// so byes are not systematically paired with byes.
///
/// The plan always contains `N - 1` matches; the last round holds one.
pub fn plan_bracket<R: Rng + ?Sized>(teams: &[TeamId], rng: &mut R) -> EngineResult<BracketPlan> {
    if teams.len() < 2 {
        return Err(EngineError::InsufficientTeams { have: teams.len() });
    }

    let mut seeded = teams.to_vec();
    seeded.shuffle(rng);

    let num_teams = seeded.len();
    let bracket_size = num_teams.next_power_of_two();
    let byes = bracket_size - num_teams;

    let mut plan = BracketPlan::default();
    let mut feeders: Vec<FeederSlot> = Vec::with_capacity(bracket_size / 2);

    if byes > 0 {
        plan.rounds.push(PlannedRound {
            name: "Preliminary Round".to_string(),
        });
        feeders.extend(seeded[..byes].iter().map(|&t| FeederSlot::Team(t)));
        for (i, pair) in seeded[byes..].chunks_exact(2).enumerate() {
            plan.matches.push(PlannedMatch {
                round: 0,
                number: i as u32 + 1,
                home: Some(FeederSlot::Team(pair[0])),
                away: Some(FeederSlot::Team(pair[1])),
            });
            feeders.push(FeederSlot::PendingMatch(i));
        }
    } else {
        feeders.extend(seeded.iter().map(|&t| FeederSlot::Team(t)));
    }

    feeders.shuffle(rng);

    // Label rounds by the stage the feeder list can actually fill, so the
    // last planned round is always the one-match final.
    let labels = round_labels(bracket_size);
    let skip = labels.len() - (feeders.len().ilog2() as usize);
    for label in labels.into_iter().skip(skip) {
        let round_idx = plan.rounds.len();
        plan.rounds.push(PlannedRound { name: label });

        let mut next_feeders = Vec::with_capacity(feeders.len() / 2);
        for (i, pair) in feeders.chunks_exact(2).enumerate() {
            let match_idx = plan.matches.len();
            plan.matches.push(PlannedMatch {
                round: round_idx,
                number: i as u32 + 1,
                home: Some(pair[0]),
                away: Some(pair[1]),
            });
            next_feeders.push(FeederSlot::PendingMatch(match_idx));
        }
        feeders = next_feeders;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    fn roster(n: usize) -> Vec<TeamId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_rejects_insufficient_teams() {
        assert!(matches!(
            plan_bracket(&roster(1), &mut rng()),
            Err(EngineError::InsufficientTeams { have: 1 })
        ));
    }

    #[test]
    fn test_round_labels() {
        assert_eq!(round_labels(2), vec!["Final"]);
        assert_eq!(round_labels(4), vec!["Semifinals", "Final"]);
        assert_eq!(
            round_labels(8),
            vec!["Quarterfinals", "Semifinals", "Final"]
        );
        assert_eq!(
            round_labels(32),
            vec![
                "Round of 32",
                "Round of 16",
                "Quarterfinals",
                "Semifinals",
                "Final"
            ]
        );
        assert_eq!(round_labels(64)[0], "Round of 64");
        assert!(round_labels(1).is_empty());
    }

    #[test]
    fn test_total_matches_is_n_minus_one() {
        for n in 2..=17 {
            let plan = plan_bracket(&roster(n), &mut rng()).unwrap();
            assert_eq!(plan.matches.len(), n - 1, "wrong match total for {n} teams");
        }
    }

    #[test]
    fn test_power_of_two_roster_uses_full_label_table() {
        let plan = plan_bracket(&roster(8), &mut rng()).unwrap();

        let names: Vec<&str> = plan.rounds.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Quarterfinals", "Semifinals", "Final"]);
        assert_eq!(plan.matches_in_round(0).len(), 4);
        assert_eq!(plan.matches_in_round(1).len(), 2);
        assert_eq!(plan.matches_in_round(2).len(), 1);

        // No byes: every quarterfinal slot is a direct team.
        for m in plan.matches_in_round(0) {
            assert!(matches!(m.home, Some(FeederSlot::Team(_))));
            assert!(matches!(m.away, Some(FeederSlot::Team(_))));
        }
    }

    #[test]
    fn test_five_team_bracket_shape() {
        // P = 8, 3 byes, one preliminary pairing feeding a four-slot stage.
        let plan = plan_bracket(&roster(5), &mut rng()).unwrap();

        assert_eq!(plan.rounds[0].name, "Preliminary Round");
        assert_eq!(plan.matches_in_round(0).len(), 1);

        let sizes: Vec<usize> = (1..plan.rounds.len())
            .map(|r| plan.matches_in_round(r).len())
            .collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(plan.rounds.last().unwrap().name, "Final");

        // Exactly one feeder slot references the preliminary match.
        let prelim_refs = plan
            .matches
            .iter()
            .flat_map(|m| [m.home, m.away])
            .filter(|s| matches!(s, Some(FeederSlot::PendingMatch(0))))
            .count();
        assert_eq!(prelim_refs, 1);
    }

    #[test]
    fn test_feeder_graph_is_acyclic() {
        // Feeder references always point at earlier plan indices, so the
        // materialized graph cannot contain a cycle.
        for n in [3, 6, 9, 12, 16] {
            let plan = plan_bracket(&roster(n), &mut rng()).unwrap();
            for (idx, m) in plan.matches.iter().enumerate() {
                for slot in [m.home, m.away] {
                    if let Some(FeederSlot::PendingMatch(f)) = slot {
                        assert!(f < idx, "feeder {f} does not precede match {idx}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_final_round_has_one_match() {
        for n in 2..=17 {
            let plan = plan_bracket(&roster(n), &mut rng()).unwrap();
            let last = plan.rounds.len() - 1;
            assert_eq!(plan.matches_in_round(last).len(), 1);
        }
    }

    #[test]
    fn test_every_team_enters_exactly_once() {
        let teams = roster(11);
        let plan = plan_bracket(&teams, &mut rng()).unwrap();

        let mut entered: Vec<TeamId> = plan
            .matches
            .iter()
            .flat_map(|m| [m.home, m.away])
            .filter_map(|s| match s {
                Some(FeederSlot::Team(t)) => Some(t),
                _ => None,
            })
            .collect();
        entered.sort();
        let mut expected = teams.clone();
        expected.sort();
        assert_eq!(entered, expected);
    }
}
