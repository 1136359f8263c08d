//! Integration tests for match progression and knockout flows
//!
//! These tests play competitions through their lifecycle: scores move
//! standings, bracket winners advance, and hybrid competitions cross from
//! the group phase into the knockout phase.

use std::sync::Arc;

use campeonato::{
    Competition, CompetitionFormat, CompetitionManager, CompetitionPhase, CompetitionStore,
    EngineError, Match, MatchStatus, MemoryStore, StandingsView, TeamId,
};
use uuid::Uuid;

fn setup(
    format: CompetitionFormat,
    teams_per_group: Option<u32>,
    qualified_per_group: Option<u32>,
) -> (Arc<MemoryStore>, CompetitionManager<MemoryStore>, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let competition_id = Uuid::new_v4();
    store.insert_competition(Competition {
        id: competition_id,
        name: "Copa Regional".to_string(),
        format,
        teams_per_group,
        qualified_per_group,
        phase: CompetitionPhase::Groups,
    });
    let manager = CompetitionManager::new(Arc::clone(&store));
    (store, manager, competition_id)
}

fn roster(n: usize) -> Vec<TeamId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

async fn play(
    manager: &CompetitionManager<MemoryStore>,
    fixture: &Match,
    score_home: i32,
    score_away: i32,
) -> Match {
    manager.start_match(fixture.id).await.unwrap();
    manager
        .finish_match(fixture.id, score_home, score_away)
        .await
        .unwrap()
        .fixture
}

#[tokio::test]
async fn test_winner_advances_before_sibling_finishes() {
    let (store, manager, competition) = setup(CompetitionFormat::Elimination, None, None);
    let generated = manager.generate_fixtures(competition, &roster(4)).await.unwrap();

    let semifinals = store
        .matches_in_round_named(competition, "Semifinals")
        .await
        .unwrap();
    let finished = play(&manager, &semifinals[0], 2, 1).await;
    let winner = finished.winner.unwrap();

    // The final holds the winner on one side while the other stays open.
    let finals = store
        .matches_in_round_named(competition, "Final")
        .await
        .unwrap();
    let final_match = &finals[0];
    let filled: Vec<TeamId> = [final_match.home_team, final_match.away_team]
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(filled, vec![winner]);
    assert_eq!(generated.matches.len(), 3);
}

#[tokio::test]
async fn test_elimination_plays_to_a_champion() {
    let (store, manager, competition) = setup(CompetitionFormat::Elimination, None, None);
    manager.generate_fixtures(competition, &roster(5)).await.unwrap();

    // Finish every match in stage order, always 1-0 to the home side.
    let rounds = store.rounds_by_competition(competition).await.unwrap();
    let mut last = None;
    for round in &rounds {
        let matches = store
            .matches_in_round_named(competition, &round.name)
            .await
            .unwrap();
        for m in &matches {
            last = Some(play(&manager, m, 1, 0).await);
        }
    }

    let final_match = last.unwrap();
    assert_eq!(final_match.status, MatchStatus::Finished);
    assert!(final_match.winner.is_some());

    // All 4 matches are done and nobody is left unresolved.
    let all = store.matches_by_competition(competition).await.unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|m| m.status == MatchStatus::Finished));
}

#[tokio::test]
async fn test_preliminary_winner_enters_first_full_round() {
    let (store, manager, competition) = setup(CompetitionFormat::Elimination, None, None);
    manager.generate_fixtures(competition, &roster(3)).await.unwrap();

    let preliminaries = store
        .matches_in_round_named(competition, "Preliminary Round")
        .await
        .unwrap();
    assert_eq!(preliminaries.len(), 1);

    let finished = play(&manager, &preliminaries[0], 4, 2).await;
    let winner = finished.winner.unwrap();

    let finals = store
        .matches_in_round_named(competition, "Final")
        .await
        .unwrap();
    let final_match = &finals[0];
    assert!(final_match.is_ready(), "bye team plus preliminary winner");
    assert!(
        final_match.home_team == Some(winner) || final_match.away_team == Some(winner)
    );
}

#[tokio::test]
async fn test_double_finish_leaves_standings_untouched() {
    let (store, manager, competition) = setup(CompetitionFormat::League, None, None);
    let generated = manager.generate_fixtures(competition, &roster(4)).await.unwrap();

    let fixture = &generated.matches[0];
    play(&manager, fixture, 3, 0).await;

    let before = store.standings_by_competition(competition).await.unwrap();
    assert!(matches!(
        manager.finish_match(fixture.id, 0, 3).await,
        Err(EngineError::InvalidStateTransition {
            from: MatchStatus::Finished,
            to: MatchStatus::Finished,
        })
    ));

    let after = store.standings_by_competition(competition).await.unwrap();
    let points = |rows: &[campeonato::Standing]| -> i32 { rows.iter().map(|s| s.points).sum() };
    assert_eq!(points(&before), points(&after));

    // The stored score is still the first one.
    let stored = store.match_by_id(fixture.id).await.unwrap().unwrap();
    assert_eq!((stored.score_home, stored.score_away), (Some(3), Some(0)));
}

#[tokio::test]
async fn test_finishing_open_slot_match_fails() {
    let (store, manager, competition) = setup(CompetitionFormat::Elimination, None, None);
    manager.generate_fixtures(competition, &roster(4)).await.unwrap();

    // The final still waits on both semifinals.
    let finals = store
        .matches_in_round_named(competition, "Final")
        .await
        .unwrap();
    assert!(matches!(
        manager.start_match(finals[0].id).await,
        Err(EngineError::MatchNotReady(id)) if id == finals[0].id
    ));
}

#[tokio::test]
async fn test_league_table_tracks_results() {
    let (_, manager, competition) = setup(CompetitionFormat::League, None, None);
    let generated = manager.generate_fixtures(competition, &roster(3)).await.unwrap();

    // A draw gives both sides a point.
    let report = {
        let fixture = &generated.matches[0];
        manager.start_match(fixture.id).await.unwrap();
        manager.finish_match(fixture.id, 2, 2).await.unwrap()
    };
    assert_eq!(report.fixture.winner, None);

    let StandingsView::Table(rows) = manager.get_standings(competition).await.unwrap() else {
        panic!("league standings must be a table");
    };
    let drawn: Vec<_> = rows.iter().filter(|s| s.points == 1).collect();
    assert_eq!(drawn.len(), 2);
    assert_eq!(rows.iter().filter(|s| s.games_played == 0).count(), 1);
}

#[tokio::test]
async fn test_hybrid_flow_from_groups_to_champion() {
    let (store, manager, competition) =
        setup(CompetitionFormat::GroupsElimination, Some(4), Some(2));
    manager.generate_fixtures(competition, &roster(8)).await.unwrap();

    // Play every group match with a fixed hierarchy: within each group, the
    // team with the smaller id always wins big.
    let groups = store.groups_by_competition(competition).await.unwrap();
    let mut expected: Vec<(TeamId, TeamId)> = Vec::new(); // (1st, 2nd) per group
    for group in &groups {
        let mut members: Vec<TeamId> = store
            .standings_by_group(group.id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.team_id)
            .collect();
        members.sort();
        expected.push((members[0], members[1]));

        let group_matches: Vec<Match> = store
            .matches_by_competition(competition)
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.group_id == Some(group.id))
            .collect();
        for m in &group_matches {
            let home_stronger = m.home_team.unwrap() < m.away_team.unwrap();
            let (sh, sa) = if home_stronger { (3, 0) } else { (0, 3) };
            play(&manager, m, sh, sa).await;
        }
    }

    // Group tables rank by wins, so the sorted order is the final order.
    let StandingsView::Groups(tables) = manager.get_standings(competition).await.unwrap() else {
        panic!("group-phase standings must be grouped");
    };
    for (table, (first, second)) in tables.iter().zip(&expected) {
        assert_eq!(table.table[0].team_id, *first);
        assert_eq!(table.table[1].team_id, *second);
    }

    // Assignment fills the semifinals in canonical seeding order.
    let assigned = manager.assign_knockout_teams(competition).await.unwrap();
    assert_eq!(assigned, 2);
    let updated = store.competition(competition).await.unwrap().unwrap();
    assert_eq!(updated.phase, CompetitionPhase::Knockout);

    let semifinals = store
        .matches_in_round_named(competition, "Semifinals")
        .await
        .unwrap();
    let (first_a, second_a) = expected[0];
    let (first_b, second_b) = expected[1];
    assert_eq!(semifinals[0].home_team, Some(first_a));
    assert_eq!(semifinals[0].away_team, Some(second_b));
    assert_eq!(semifinals[1].home_team, Some(first_b));
    assert_eq!(semifinals[1].away_team, Some(second_a));

    // Knockout draws are rejected; wins advance to the final.
    let started = manager.start_match(semifinals[0].id).await.unwrap();
    assert!(matches!(
        manager.finish_match(started.id, 1, 1).await,
        Err(EngineError::DrawNotAllowed(_))
    ));
    let sf1 = manager.finish_match(started.id, 2, 0).await.unwrap();
    // Knockout results never touch group tables.
    assert!(sf1.standings.is_empty());
    let sf2 = play(&manager, &semifinals[1], 0, 1).await;

    let finals = store
        .matches_in_round_named(competition, "Final")
        .await
        .unwrap();
    assert_eq!(finals[0].home_team, sf1.fixture.winner);
    assert_eq!(finals[0].away_team, sf2.winner);

    let final_report = play(&manager, &finals[0], 1, 0).await;
    assert_eq!(final_report.winner, sf1.fixture.winner);

    // Past the group phase, standings are the knockout bracket.
    let StandingsView::Matches(bracket) = manager.get_standings(competition).await.unwrap() else {
        panic!("knockout-phase standings must be the bracket");
    };
    assert_eq!(bracket.len(), 3);
    assert!(bracket.iter().all(|m| m.group_id.is_none()));
}

#[tokio::test]
async fn test_assignment_needs_hybrid_format() {
    let (_, manager, competition) = setup(CompetitionFormat::League, None, None);
    manager.generate_fixtures(competition, &roster(4)).await.unwrap();

    assert!(matches!(
        manager.assign_knockout_teams(competition).await,
        Err(EngineError::InvalidConfiguration(_))
    ));
}
