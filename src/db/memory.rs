//! In-memory `CompetitionStore` for tests and demos.
//!
//! Batch writes are applied under one lock acquisition, so the atomicity the
//! engine relies on holds here the same way it does in PostgreSQL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::repository::{CompetitionStore, FinishBatch, GenerationBatch, SlotUpdate};
use super::StoreResult;
use crate::competition::{
    Competition, CompetitionId, CompetitionPhase, Group, GroupId, Match, MatchId, Round, Side,
    Standing,
};

#[derive(Default)]
struct Inner {
    competitions: HashMap<CompetitionId, Competition>,
    rounds: Vec<Round>,
    groups: Vec<Group>,
    matches: Vec<Match>,
    standings: Vec<Standing>,
}

impl Inner {
    fn apply_slot_update(&mut self, update: &SlotUpdate) {
        if let Some(m) = self.matches.iter_mut().find(|m| m.id == update.match_id) {
            match update.side {
                Side::Home => m.home_team = Some(update.team),
                Side::Away => m.away_team = Some(update.team),
            }
        }
    }

    fn replace_match(&mut self, fixture: &Match) {
        if let Some(m) = self.matches.iter_mut().find(|m| m.id == fixture.id) {
            *m = fixture.clone();
        }
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a competition record; the engine only ever reads these.
    pub fn insert_competition(&self, competition: Competition) {
        self.inner
            .lock()
            .unwrap()
            .competitions
            .insert(competition.id, competition);
    }
}

#[async_trait]
impl CompetitionStore for MemoryStore {
    async fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>> {
        Ok(self.inner.lock().unwrap().competitions.get(&id).cloned())
    }

    async fn set_phase(&self, id: CompetitionId, phase: CompetitionPhase) -> StoreResult<()> {
        if let Some(c) = self.inner.lock().unwrap().competitions.get_mut(&id) {
            c.phase = phase;
        }
        Ok(())
    }

    async fn match_by_id(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .matches
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn matches_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Match>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .matches
            .iter()
            .filter(|m| m.competition_id == id)
            .cloned()
            .collect())
    }

    async fn matches_fed_by(&self, id: MatchId) -> StoreResult<Vec<Match>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .matches
            .iter()
            .filter(|m| m.home_feeder == Some(id) || m.away_feeder == Some(id))
            .cloned()
            .collect())
    }

    async fn matches_in_round_named(
        &self,
        competition: CompetitionId,
        round_name: &str,
    ) -> StoreResult<Vec<Match>> {
        let inner = self.inner.lock().unwrap();
        let round_ids: Vec<_> = inner
            .rounds
            .iter()
            .filter(|r| r.name == round_name)
            .map(|r| r.id)
            .collect();
        let mut matches: Vec<Match> = inner
            .matches
            .iter()
            .filter(|m| {
                m.competition_id == competition
                    && m.round_id.is_some_and(|rid| round_ids.contains(&rid))
            })
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.round_match_number);
        Ok(matches)
    }

    async fn rounds_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Round>> {
        let inner = self.inner.lock().unwrap();
        let referenced: Vec<_> = inner
            .matches
            .iter()
            .filter(|m| m.competition_id == id)
            .filter_map(|m| m.round_id)
            .collect();
        let mut rounds: Vec<Round> = inner
            .rounds
            .iter()
            .filter(|r| referenced.contains(&r.id))
            .cloned()
            .collect();
        rounds.sort_by_key(|r| r.stage_rank);
        Ok(rounds)
    }

    async fn groups_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .inner
            .lock()
            .unwrap()
            .groups
            .iter()
            .filter(|g| g.competition_id == id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn standings_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Standing>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .standings
            .iter()
            .filter(|s| s.competition_id == id && s.group_id.is_none())
            .cloned()
            .collect())
    }

    async fn standings_by_group(&self, group: GroupId) -> StoreResult<Vec<Standing>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .standings
            .iter()
            .filter(|s| s.group_id == Some(group))
            .cloned()
            .collect())
    }

    async fn save_match(&self, fixture: &Match) -> StoreResult<()> {
        self.inner.lock().unwrap().replace_match(fixture);
        Ok(())
    }

    async fn persist_generation(&self, batch: &GenerationBatch) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.rounds.extend(batch.rounds.iter().cloned());
        inner.groups.extend(batch.groups.iter().cloned());
        inner.standings.extend(batch.standings.iter().cloned());
        inner.matches.extend(batch.matches.iter().cloned());
        Ok(())
    }

    async fn apply_slot_updates(&self, updates: &[SlotUpdate]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for update in updates {
            inner.apply_slot_update(update);
        }
        Ok(())
    }

    async fn apply_finish(&self, batch: &FinishBatch) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.replace_match(&batch.fixture);
        for updated in &batch.standings {
            if let Some(row) = inner.standings.iter_mut().find(|s| s.id == updated.id) {
                *row = updated.clone();
            }
        }
        for update in &batch.slot_updates {
            inner.apply_slot_update(update);
        }
        Ok(())
    }
}
