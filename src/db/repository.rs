//! The `CompetitionStore` trait and its PostgreSQL implementation.
//!
//! The trait keeps the engine testable: the manager only sees plain entity
//! values and batch writes. `PgCompetitionStore` is the production
//! implementation; `MemoryStore` (in `super::memory`) backs the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::competition::{
    Competition, CompetitionFormat, CompetitionId, CompetitionPhase, Group, GroupId, Match,
    MatchId, MatchStatus, Round, Side, Standing, TeamId,
};

/// Everything one structure-generation operation writes, persisted as a
/// single transaction.
#[derive(Debug, Clone, Default)]
pub struct GenerationBatch {
    pub rounds: Vec<Round>,
    pub groups: Vec<Group>,
    pub standings: Vec<Standing>,
    pub matches: Vec<Match>,
}

/// Write one team into one side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUpdate {
    pub match_id: MatchId,
    pub side: Side,
    pub team: TeamId,
}

/// Everything one match-finish operation writes: the finished match, the
/// standings rows it touched, and the downstream slots its winner fills.
#[derive(Debug, Clone)]
pub struct FinishBatch {
    pub fixture: Match,
    pub standings: Vec<Standing>,
    pub slot_updates: Vec<SlotUpdate>,
}

/// Transactional read/write access to competition structure.
///
/// Read methods make no ordering promises; the engine sorts what it needs.
#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>>;
    async fn set_phase(&self, id: CompetitionId, phase: CompetitionPhase) -> StoreResult<()>;

    async fn match_by_id(&self, id: MatchId) -> StoreResult<Option<Match>>;
    async fn matches_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Match>>;
    /// Matches whose `home_feeder` or `away_feeder` is `id`.
    async fn matches_fed_by(&self, id: MatchId) -> StoreResult<Vec<Match>>;
    async fn matches_in_round_named(
        &self,
        competition: CompetitionId,
        round_name: &str,
    ) -> StoreResult<Vec<Match>>;

    /// Rounds referenced by the competition's matches.
    async fn rounds_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Round>>;
    async fn groups_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Group>>;

    /// Competition-scoped standings rows (no group).
    async fn standings_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Standing>>;
    async fn standings_by_group(&self, group: GroupId) -> StoreResult<Vec<Standing>>;

    async fn save_match(&self, fixture: &Match) -> StoreResult<()>;
    async fn persist_generation(&self, batch: &GenerationBatch) -> StoreResult<()>;
    async fn apply_slot_updates(&self, updates: &[SlotUpdate]) -> StoreResult<()>;
    async fn apply_finish(&self, batch: &FinishBatch) -> StoreResult<()>;
}

/// PostgreSQL implementation of `CompetitionStore`
#[derive(Clone)]
pub struct PgCompetitionStore {
    pool: PgPool,
}

impl PgCompetitionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn competition_from_row(row: &PgRow) -> StoreResult<Competition> {
    let format: String = row.get("format");
    let phase: String = row.get("phase");
    Ok(Competition {
        id: row.get("id"),
        name: row.get("name"),
        format: format
            .parse::<CompetitionFormat>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
        teams_per_group: row
            .get::<Option<i32>, _>("teams_per_group")
            .map(|v| v as u32),
        qualified_per_group: row
            .get::<Option<i32>, _>("qualified_per_group")
            .map(|v| v as u32),
        phase: phase
            .parse::<CompetitionPhase>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
    })
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    let status: String = row.get("status");
    Ok(Match {
        id: row.get("id"),
        competition_id: row.get("competition_id"),
        group_id: row.get::<Option<Uuid>, _>("group_id"),
        round_id: row.get::<Option<Uuid>, _>("round_id"),
        round_match_number: row.get::<i32, _>("round_match_number") as u32,
        status: status
            .parse::<MatchStatus>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
        scheduled_at: row.get::<Option<DateTime<Utc>>, _>("scheduled_at"),
        home_team: row.get::<Option<Uuid>, _>("home_team"),
        away_team: row.get::<Option<Uuid>, _>("away_team"),
        home_feeder: row.get::<Option<Uuid>, _>("home_feeder"),
        away_feeder: row.get::<Option<Uuid>, _>("away_feeder"),
        score_home: row.get::<Option<i32>, _>("score_home"),
        score_away: row.get::<Option<i32>, _>("score_away"),
        winner: row.get::<Option<Uuid>, _>("winner"),
    })
}

fn round_from_row(row: &PgRow) -> Round {
    Round {
        id: row.get("id"),
        name: row.get("name"),
        stage_rank: row.get::<i32, _>("stage_rank") as u32,
    }
}

fn standing_from_row(row: &PgRow) -> Standing {
    Standing {
        id: row.get("id"),
        competition_id: row.get("competition_id"),
        team_id: row.get("team_id"),
        group_id: row.get::<Option<Uuid>, _>("group_id"),
        position: row.get::<i32, _>("position") as u32,
        points: row.get("points"),
        games_played: row.get::<i32, _>("games_played") as u32,
        wins: row.get::<i32, _>("wins") as u32,
        draws: row.get::<i32, _>("draws") as u32,
        losses: row.get::<i32, _>("losses") as u32,
        score_for: row.get("score_for"),
        score_against: row.get("score_against"),
        score_difference: row.get("score_difference"),
    }
}

const MATCH_COLUMNS: &str = "id, competition_id, group_id, round_id, round_match_number, status, \
     scheduled_at, home_team, away_team, home_feeder, away_feeder, score_home, score_away, winner";

async fn insert_match(conn: &mut PgConnection, m: &Match) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO matches (id, competition_id, group_id, round_id, round_match_number, status,
                             scheduled_at, home_team, away_team, home_feeder, away_feeder,
                             score_home, score_away, winner)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(m.id)
    .bind(m.competition_id)
    .bind(m.group_id)
    .bind(m.round_id)
    .bind(m.round_match_number as i32)
    .bind(m.status.as_str())
    .bind(m.scheduled_at)
    .bind(m.home_team)
    .bind(m.away_team)
    .bind(m.home_feeder)
    .bind(m.away_feeder)
    .bind(m.score_home)
    .bind(m.score_away)
    .bind(m.winner)
    .execute(conn)
    .await?;
    Ok(())
}

async fn update_match(conn: &mut PgConnection, m: &Match) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE matches
        SET status = $1, score_home = $2, score_away = $3, winner = $4,
            home_team = $5, away_team = $6, scheduled_at = $7
        WHERE id = $8
        "#,
    )
    .bind(m.status.as_str())
    .bind(m.score_home)
    .bind(m.score_away)
    .bind(m.winner)
    .bind(m.home_team)
    .bind(m.away_team)
    .bind(m.scheduled_at)
    .bind(m.id)
    .execute(conn)
    .await?;
    Ok(())
}

async fn update_standing(conn: &mut PgConnection, s: &Standing) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE standings
        SET position = $1, points = $2, games_played = $3, wins = $4, draws = $5, losses = $6,
            score_for = $7, score_against = $8, score_difference = $9
        WHERE id = $10
        "#,
    )
    .bind(s.position as i32)
    .bind(s.points)
    .bind(s.games_played as i32)
    .bind(s.wins as i32)
    .bind(s.draws as i32)
    .bind(s.losses as i32)
    .bind(s.score_for)
    .bind(s.score_against)
    .bind(s.score_difference)
    .bind(s.id)
    .execute(conn)
    .await?;
    Ok(())
}

async fn apply_slot_update(conn: &mut PgConnection, update: &SlotUpdate) -> StoreResult<()> {
    let sql = match update.side {
        Side::Home => "UPDATE matches SET home_team = $1 WHERE id = $2",
        Side::Away => "UPDATE matches SET away_team = $1 WHERE id = $2",
    };
    sqlx::query(sql)
        .bind(update.team)
        .bind(update.match_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl CompetitionStore for PgCompetitionStore {
    async fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>> {
        let row = sqlx::query(
            "SELECT id, name, format, teams_per_group, qualified_per_group, phase
             FROM competitions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(competition_from_row).transpose()
    }

    async fn set_phase(&self, id: CompetitionId, phase: CompetitionPhase) -> StoreResult<()> {
        sqlx::query("UPDATE competitions SET phase = $1 WHERE id = $2")
            .bind(phase.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn match_by_id(&self, id: MatchId) -> StoreResult<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(match_from_row).transpose()
    }

    async fn matches_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE competition_id = $1"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    async fn matches_fed_by(&self, id: MatchId) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE home_feeder = $1 OR away_feeder = $1"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    async fn matches_in_round_named(
        &self,
        competition: CompetitionId,
        round_name: &str,
    ) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.competition_id, m.group_id, m.round_id, m.round_match_number,
                   m.status, m.scheduled_at, m.home_team, m.away_team, m.home_feeder,
                   m.away_feeder, m.score_home, m.score_away, m.winner
            FROM matches m
            JOIN rounds r ON r.id = m.round_id
            WHERE m.competition_id = $1 AND r.name = $2
            ORDER BY m.round_match_number
            "#,
        )
        .bind(competition)
        .bind(round_name)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    async fn rounds_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Round>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT r.id, r.name, r.stage_rank
            FROM rounds r
            JOIN matches m ON m.round_id = r.id
            WHERE m.competition_id = $1
            ORDER BY r.stage_rank
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(round_from_row).collect())
    }

    async fn groups_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Group>> {
        let rows = sqlx::query(
            "SELECT id, competition_id, name FROM groups WHERE competition_id = $1 ORDER BY name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| Group {
                id: row.get("id"),
                competition_id: row.get("competition_id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn standings_by_competition(&self, id: CompetitionId) -> StoreResult<Vec<Standing>> {
        let rows = sqlx::query(
            r#"
            SELECT id, competition_id, team_id, group_id, position, points, games_played,
                   wins, draws, losses, score_for, score_against, score_difference
            FROM standings
            WHERE competition_id = $1 AND group_id IS NULL
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(standing_from_row).collect())
    }

    async fn standings_by_group(&self, group: GroupId) -> StoreResult<Vec<Standing>> {
        let rows = sqlx::query(
            r#"
            SELECT id, competition_id, team_id, group_id, position, points, games_played,
                   wins, draws, losses, score_for, score_against, score_difference
            FROM standings
            WHERE group_id = $1
            "#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(standing_from_row).collect())
    }

    async fn save_match(&self, fixture: &Match) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        update_match(&mut *tx, fixture).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn persist_generation(&self, batch: &GenerationBatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for round in &batch.rounds {
            sqlx::query("INSERT INTO rounds (id, name, stage_rank) VALUES ($1, $2, $3)")
                .bind(round.id)
                .bind(&round.name)
                .bind(round.stage_rank as i32)
                .execute(&mut *tx)
                .await?;
        }
        for group in &batch.groups {
            sqlx::query("INSERT INTO groups (id, competition_id, name) VALUES ($1, $2, $3)")
                .bind(group.id)
                .bind(group.competition_id)
                .bind(&group.name)
                .execute(&mut *tx)
                .await?;
        }
        for standing in &batch.standings {
            sqlx::query(
                r#"
                INSERT INTO standings (id, competition_id, team_id, group_id, position, points,
                                       games_played, wins, draws, losses, score_for,
                                       score_against, score_difference)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(standing.id)
            .bind(standing.competition_id)
            .bind(standing.team_id)
            .bind(standing.group_id)
            .bind(standing.position as i32)
            .bind(standing.points)
            .bind(standing.games_played as i32)
            .bind(standing.wins as i32)
            .bind(standing.draws as i32)
            .bind(standing.losses as i32)
            .bind(standing.score_for)
            .bind(standing.score_against)
            .bind(standing.score_difference)
            .execute(&mut *tx)
            .await?;
        }
        for m in &batch.matches {
            insert_match(&mut *tx, m).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply_slot_updates(&self, updates: &[SlotUpdate]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for update in updates {
            apply_slot_update(&mut *tx, update).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn apply_finish(&self, batch: &FinishBatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        update_match(&mut *tx, &batch.fixture).await?;
        for standing in &batch.standings {
            update_standing(&mut *tx, standing).await?;
        }
        for update in &batch.slot_updates {
            apply_slot_update(&mut *tx, update).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
