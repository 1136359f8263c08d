//! Competition manager: the storage-backed orchestration layer.
//!
//! Operations load entities through a [`CompetitionStore`], run the pure
//! planners and ranking helpers, and write every structural change back as
//! one batch. Callers are expected to serialize operations per competition;
//! the manager itself takes no locks.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::competition::{
    Competition, CompetitionFormat, CompetitionId, CompetitionPhase, EngineError, EngineResult,
    Group, GroupId, Match, MatchId, MatchStatus, Round, Side, Standing, TeamId,
};
use crate::db::repository::{CompetitionStore, FinishBatch, GenerationBatch, SlotUpdate};
use crate::notify::MatchNotifier;
use crate::schedule::{self, BracketPlan, FeederSlot};
use crate::standings;

use super::models::{FinishReport, GeneratedFixtures, GroupStandings, StandingsView};

/// Orchestrates fixture generation, knockout progression and standings
/// maintenance on top of a [`CompetitionStore`].
pub struct CompetitionManager<S: CompetitionStore> {
    store: Arc<S>,
    notifier: Option<MatchNotifier>,
}

impl<S: CompetitionStore> CompetitionManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            notifier: None,
        }
    }

    /// A manager that announces created matches after their transaction
    /// commits.
    pub fn with_notifier(store: Arc<S>, notifier: MatchNotifier) -> Self {
        Self {
            store,
            notifier: Some(notifier),
        }
    }

    /// Generate the full fixture structure for a competition, dispatching on
    /// its format. The roster is the competition's registered team ids.
    pub async fn generate_fixtures(
        &self,
        competition_id: CompetitionId,
        teams: &[TeamId],
    ) -> EngineResult<GeneratedFixtures> {
        let competition = self.load_competition(competition_id).await?;
        let generated = match competition.format {
            CompetitionFormat::League => self.generate_league(&competition, teams).await?,
            CompetitionFormat::Elimination => self.generate_elimination(&competition, teams).await?,
            CompetitionFormat::GroupsElimination => {
                self.generate_group_stage(&competition, teams).await?
            }
        };
        log::info!(
            "generated {} fixtures in {} rounds for competition {} ({})",
            generated.matches.len(),
            generated.rounds.len(),
            competition_id,
            competition.format
        );
        self.announce(&generated.matches);
        Ok(generated)
    }

    /// Single round-robin: every pair meets once, rounds named `Round 1..`,
    /// one competition-scoped standings row per team.
    async fn generate_league(
        &self,
        competition: &Competition,
        teams: &[TeamId],
    ) -> EngineResult<GeneratedFixtures> {
        let pairing_rounds = {
            let mut rng = rand::rng();
            let mut seeded = teams.to_vec();
            seeded.shuffle(&mut rng);
            schedule::circle_rounds(&seeded)?
        };

        let offset = self.stage_offset(competition.id).await?;
        let mut out = GeneratedFixtures::default();
        for (i, pairings) in pairing_rounds.into_iter().enumerate() {
            let round = Round {
                id: Uuid::new_v4(),
                name: format!("Round {}", i + 1),
                stage_rank: offset + i as u32,
            };
            for (j, (home, away)) in pairings.into_iter().enumerate() {
                let mut m = blank_match(competition.id, round.id, j as u32 + 1, None);
                m.home_team = Some(home);
                m.away_team = Some(away);
                out.matches.push(m);
            }
            out.rounds.push(round);
        }
        for &team in teams {
            out.standings.push(Standing::zeroed(competition.id, team, None));
        }

        self.persist(&out).await?;
        Ok(out)
    }

    /// Single-elimination bracket with random seeding, byes resolved through
    /// a preliminary round. Standings rows are created zeroed and accumulate
    /// statistics as matches finish, but are never ranked.
    async fn generate_elimination(
        &self,
        competition: &Competition,
        teams: &[TeamId],
    ) -> EngineResult<GeneratedFixtures> {
        let plan = {
            let mut rng = rand::rng();
            schedule::plan_bracket(teams, &mut rng)?
        };

        let offset = self.stage_offset(competition.id).await?;
        let (rounds, matches) = materialize(&plan, competition.id, offset, None);
        let standings = teams
            .iter()
            .map(|&team| Standing::zeroed(competition.id, team, None))
            .collect();

        let out = GeneratedFixtures {
            rounds,
            groups: Vec::new(),
            standings,
            matches,
        };
        self.persist(&out).await?;
        Ok(out)
    }

    /// Group stage plus, when `qualified_per_group` is set, the knockout
    /// skeleton with open first-round slots. Each group gets one round
    /// holding its full round-robin, and one standings row per member.
    async fn generate_group_stage(
        &self,
        competition: &Competition,
        teams: &[TeamId],
    ) -> EngineResult<GeneratedFixtures> {
        let per_group = competition.teams_per_group.ok_or_else(|| {
            EngineError::InvalidConfiguration(
                "groups_elimination competitions need teams_per_group".to_string(),
            )
        })?;
        let plans = {
            let mut rng = rand::rng();
            schedule::plan_groups(teams, per_group, &mut rng)?
        };

        let mut offset = self.stage_offset(competition.id).await?;
        let mut out = GeneratedFixtures::default();
        for plan in &plans {
            let group = Group {
                id: Uuid::new_v4(),
                competition_id: competition.id,
                name: plan.name.clone(),
            };
            for &team in &plan.teams {
                out.standings
                    .push(Standing::zeroed(competition.id, team, Some(group.id)));
            }
            // A lone team has nobody to play; its row still exists.
            if plan.teams.len() >= 2 {
                let round = Round {
                    id: Uuid::new_v4(),
                    name: format!("Group Stage - {}", plan.name),
                    stage_rank: offset,
                };
                offset += 1;
                let mut number = 1;
                for pairings in schedule::circle_rounds(&plan.teams)? {
                    for (home, away) in pairings {
                        let mut m = blank_match(competition.id, round.id, number, Some(group.id));
                        m.home_team = Some(home);
                        m.away_team = Some(away);
                        out.matches.push(m);
                        number += 1;
                    }
                }
                out.rounds.push(round);
            }
            out.groups.push(group);
        }

        if let Some(qualified) = competition.qualified_per_group {
            let skeleton = schedule::plan_skeleton(out.groups.len() as u32, qualified)?;
            let (rounds, matches) = materialize(&skeleton, competition.id, offset, None);
            out.rounds.extend(rounds);
            out.matches.extend(matches);
        }

        self.persist(&out).await?;
        Ok(out)
    }

    /// Fill the knockout skeleton's first round from final group tables and
    /// move the competition into its knockout phase. Returns the number of
    /// first-round matches that received both teams.
    pub async fn assign_knockout_teams(
        &self,
        competition_id: CompetitionId,
    ) -> EngineResult<usize> {
        let competition = self.load_competition(competition_id).await?;
        if competition.format != CompetitionFormat::GroupsElimination {
            return Err(EngineError::InvalidConfiguration(format!(
                "knockout assignment only applies to groups_elimination, not {}",
                competition.format
            )));
        }
        let qualified = competition.qualified_per_group.ok_or_else(|| {
            EngineError::InvalidConfiguration(
                "knockout assignment needs qualified_per_group".to_string(),
            )
        })?;

        let groups = self.store.groups_by_competition(competition_id).await?;
        let total = groups.len() * qualified as usize;
        if total < 2 || !total.is_power_of_two() {
            return Err(EngineError::InvalidBracketSize { total });
        }

        let mut resolved: HashMap<String, TeamId> = HashMap::new();
        for group in &groups {
            let mut table = self.store.standings_by_group(group.id).await?;
            table.sort_by(standings::compare);
            for (i, row) in table.iter().take(qualified as usize).enumerate() {
                resolved.insert(
                    schedule::placeholder_label(i as u32 + 1, &group.name),
                    row.team_id,
                );
            }
        }

        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let clashes = schedule::first_round_clashes(&names, qualified);
        let labels = schedule::round_labels(total);
        let slots = self
            .store
            .matches_in_round_named(competition_id, &labels[0])
            .await?;
        if slots.len() != clashes.len() {
            return Err(EngineError::AssignmentMismatch {
                clashes: clashes.len(),
                slots: slots.len(),
            });
        }

        let mut updates = Vec::new();
        let mut assigned = 0;
        for (slot, (home_label, away_label)) in slots.iter().zip(&clashes) {
            match (resolved.get(home_label), resolved.get(away_label)) {
                (Some(&home), Some(&away)) => {
                    updates.push(SlotUpdate {
                        match_id: slot.id,
                        side: Side::Home,
                        team: home,
                    });
                    updates.push(SlotUpdate {
                        match_id: slot.id,
                        side: Side::Away,
                        team: away,
                    });
                    assigned += 1;
                }
                _ => log::warn!(
                    "skipping {} match {}: cannot resolve {home_label} vs {away_label}",
                    labels[0],
                    slot.round_match_number
                ),
            }
        }

        self.store.apply_slot_updates(&updates).await?;
        self.store
            .set_phase(competition_id, CompetitionPhase::Knockout)
            .await?;
        log::info!(
            "assigned {assigned} of {} {} matches for competition {competition_id}",
            slots.len(),
            labels[0]
        );
        Ok(assigned)
    }

    /// Move a pending match with both teams known into play.
    pub async fn start_match(&self, match_id: MatchId) -> EngineResult<Match> {
        let mut fixture = self.load_match(match_id).await?;
        if !fixture.status.can_transition_to(MatchStatus::InProgress) {
            return Err(EngineError::InvalidStateTransition {
                from: fixture.status,
                to: MatchStatus::InProgress,
            });
        }
        if !fixture.is_ready() {
            return Err(EngineError::MatchNotReady(match_id));
        }

        fixture.status = MatchStatus::InProgress;
        self.store.save_match(&fixture).await?;
        log::debug!("match {match_id} started");
        Ok(fixture)
    }

    /// Record a final score: fold it into standings, re-rank where a table
    /// exists, and push the winner into any match fed by this one. All
    /// writes land in one batch.
    pub async fn finish_match(
        &self,
        match_id: MatchId,
        score_home: i32,
        score_away: i32,
    ) -> EngineResult<FinishReport> {
        let mut fixture = self.load_match(match_id).await?;
        if !fixture.status.can_transition_to(MatchStatus::Finished) {
            return Err(EngineError::InvalidStateTransition {
                from: fixture.status,
                to: MatchStatus::Finished,
            });
        }
        let (home, away) = match (fixture.home_team, fixture.away_team) {
            (Some(home), Some(away)) => (home, away),
            _ => return Err(EngineError::MatchNotReady(match_id)),
        };

        let competition = self.load_competition(fixture.competition_id).await?;
        let in_bracket = match competition.format {
            CompetitionFormat::League => false,
            CompetitionFormat::Elimination => true,
            CompetitionFormat::GroupsElimination => fixture.group_id.is_none(),
        };
        if in_bracket && score_home == score_away {
            return Err(EngineError::DrawNotAllowed(match_id));
        }

        let winner = standings::winner_of(home, away, score_home, score_away);
        fixture.score_home = Some(score_home);
        fixture.score_away = Some(score_away);
        fixture.winner = winner;
        fixture.status = MatchStatus::Finished;

        // Knockout matches of a hybrid competition sit outside any table.
        let tracks_statistics = !(competition.format == CompetitionFormat::GroupsElimination
            && fixture.group_id.is_none());
        let mut changed: Vec<Standing> = Vec::new();
        if tracks_statistics {
            let mut scope = match fixture.group_id {
                Some(group) => self.store.standings_by_group(group).await?,
                None => {
                    self.store
                        .standings_by_competition(fixture.competition_id)
                        .await?
                }
            };
            let home_idx = scope.iter().position(|s| s.team_id == home);
            let away_idx = scope.iter().position(|s| s.team_id == away);
            if let (Some(hi), Some(ai)) = (home_idx, away_idx) {
                let mut home_row = scope[hi].clone();
                let mut away_row = scope[ai].clone();
                standings::apply_result(&mut home_row, &mut away_row, score_home, score_away);
                scope[hi] = home_row;
                scope[ai] = away_row;

                let ranked = competition.format == CompetitionFormat::League
                    || fixture.group_id.is_some();
                if ranked {
                    standings::rank(&mut scope);
                    changed = scope;
                } else {
                    changed = vec![scope[hi].clone(), scope[ai].clone()];
                }
            } else {
                log::warn!("match {match_id} has no standings rows in scope; skipping statistics");
            }
        }

        let mut slot_updates = Vec::new();
        if in_bracket {
            if let Some(winner_team) = winner {
                for dependent in self.store.matches_fed_by(fixture.id).await? {
                    let side = if dependent.home_feeder == Some(fixture.id) {
                        Side::Home
                    } else {
                        Side::Away
                    };
                    slot_updates.push(SlotUpdate {
                        match_id: dependent.id,
                        side,
                        team: winner_team,
                    });
                }
                if !slot_updates.is_empty() {
                    log::debug!(
                        "advancing winner of match {match_id} into {} slot(s)",
                        slot_updates.len()
                    );
                }
            }
        }

        let batch = FinishBatch {
            fixture: fixture.clone(),
            standings: changed.clone(),
            slot_updates,
        };
        self.store.apply_finish(&batch).await?;
        log::info!("match {match_id} finished {score_home}-{score_away}");
        Ok(FinishReport {
            fixture,
            standings: changed,
        })
    }

    /// Standings in the shape the competition's format calls for.
    pub async fn get_standings(
        &self,
        competition_id: CompetitionId,
    ) -> EngineResult<StandingsView> {
        let competition = self.load_competition(competition_id).await?;
        match competition.format {
            CompetitionFormat::League => {
                let mut rows = self.store.standings_by_competition(competition_id).await?;
                rows.sort_by(standings::compare);
                Ok(StandingsView::Table(rows))
            }
            CompetitionFormat::Elimination => Ok(StandingsView::Matches(
                self.bracket_matches(competition_id, false).await?,
            )),
            CompetitionFormat::GroupsElimination => {
                if competition.phase == CompetitionPhase::Groups {
                    let groups = self.store.groups_by_competition(competition_id).await?;
                    let mut out = Vec::with_capacity(groups.len());
                    for group in groups {
                        let mut table = self.store.standings_by_group(group.id).await?;
                        table.sort_by(standings::compare);
                        out.push(GroupStandings { group, table });
                    }
                    Ok(StandingsView::Groups(out))
                } else {
                    Ok(StandingsView::Matches(
                        self.bracket_matches(competition_id, true).await?,
                    ))
                }
            }
        }
    }

    /// Bracket matches in stage order, then by number within the round.
    async fn bracket_matches(
        &self,
        competition_id: CompetitionId,
        knockout_only: bool,
    ) -> EngineResult<Vec<Match>> {
        let rounds = self.store.rounds_by_competition(competition_id).await?;
        let rank_of: HashMap<Uuid, u32> = rounds.iter().map(|r| (r.id, r.stage_rank)).collect();

        let mut matches = self.store.matches_by_competition(competition_id).await?;
        if knockout_only {
            matches.retain(|m| m.group_id.is_none());
        }
        matches.sort_by_key(|m| {
            let rank = m
                .round_id
                .and_then(|r| rank_of.get(&r).copied())
                .unwrap_or(u32::MAX);
            (rank, m.round_match_number)
        });
        Ok(matches)
    }

    async fn stage_offset(&self, competition_id: CompetitionId) -> EngineResult<u32> {
        Ok(self.store.rounds_by_competition(competition_id).await?.len() as u32)
    }

    async fn persist(&self, generated: &GeneratedFixtures) -> EngineResult<()> {
        let batch = GenerationBatch {
            rounds: generated.rounds.clone(),
            groups: generated.groups.clone(),
            standings: generated.standings.clone(),
            matches: generated.matches.clone(),
        };
        Ok(self.store.persist_generation(&batch).await?)
    }

    fn announce(&self, matches: &[Match]) {
        if let Some(notifier) = &self.notifier {
            notifier.notify_all(matches);
        }
    }

    async fn load_competition(&self, id: CompetitionId) -> EngineResult<Competition> {
        self.store
            .competition(id)
            .await?
            .ok_or(EngineError::CompetitionNotFound(id))
    }

    async fn load_match(&self, id: MatchId) -> EngineResult<Match> {
        self.store
            .match_by_id(id)
            .await?
            .ok_or(EngineError::MatchNotFound(id))
    }
}

fn blank_match(
    competition_id: CompetitionId,
    round_id: Uuid,
    number: u32,
    group_id: Option<GroupId>,
) -> Match {
    Match {
        id: Uuid::new_v4(),
        competition_id,
        group_id,
        round_id: Some(round_id),
        round_match_number: number,
        status: MatchStatus::Pending,
        scheduled_at: None,
        home_team: None,
        away_team: None,
        home_feeder: None,
        away_feeder: None,
        score_home: None,
        score_away: None,
        winner: None,
    }
}

/// Turn a plan into persistable rounds and matches, minting ids up front so
/// feeder references resolve before anything is written.
fn materialize(
    plan: &BracketPlan,
    competition_id: CompetitionId,
    stage_offset: u32,
    group_id: Option<GroupId>,
) -> (Vec<Round>, Vec<Match>) {
    let rounds: Vec<Round> = plan
        .rounds
        .iter()
        .enumerate()
        .map(|(i, r)| Round {
            id: Uuid::new_v4(),
            name: r.name.clone(),
            stage_rank: stage_offset + i as u32,
        })
        .collect();

    let ids: Vec<MatchId> = plan.matches.iter().map(|_| Uuid::new_v4()).collect();
    let matches = plan
        .matches
        .iter()
        .zip(&ids)
        .map(|(planned, &id)| {
            let mut m = blank_match(
                competition_id,
                rounds[planned.round].id,
                planned.number,
                group_id,
            );
            m.id = id;
            match planned.home {
                Some(FeederSlot::Team(team)) => m.home_team = Some(team),
                Some(FeederSlot::PendingMatch(feeder)) => m.home_feeder = Some(ids[feeder]),
                None => {}
            }
            match planned.away {
                Some(FeederSlot::Team(team)) => m.away_team = Some(team),
                Some(FeederSlot::PendingMatch(feeder)) => m.away_feeder = Some(ids[feeder]),
                None => {}
            }
            m
        })
        .collect();

    (rounds, matches)
}
