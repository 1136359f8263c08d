//! # Campeonato
//!
//! A tournament structure generation and progression engine.
//!
//! This library turns a competition's registered teams into a complete
//! fixture structure and then drives those fixtures through their lifecycle:
//! scores feed standings tables, bracket winners advance into the matches
//! they seed, and hybrid competitions move from a group phase into a
//! knockout phase.
//!
//! ## Formats
//!
//! Three competition formats are supported:
//!
//! - **League**: a single round-robin where every pair of teams meets once,
//!   ranked in one standings table
//! - **Elimination**: a single-elimination bracket with random seeding;
//!   rosters that are not a power of two get byes resolved through a
//!   preliminary round
//! - **GroupsElimination**: random group allocation with per-group
//!   round-robins, followed by a knockout bracket whose first round is
//!   filled from final group positions
//!
//! ## Core Modules
//!
//! - [`engine`]: the [`CompetitionManager`] orchestrating generation and
//!   progression on top of a store
//! - [`schedule`]: pure fixture planners (round-robin, brackets, groups)
//! - [`standings`]: points, ranking order and winner determination
//! - [`competition`]: shared entity models and error types
//! - [`db`]: the `CompetitionStore` trait with PostgreSQL and in-memory
//!   implementations
//! - [`notify`]: best-effort "match created" notifications
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use campeonato::{CompetitionManager, MemoryStore};
//!
//! # async fn demo(competition_id: uuid::Uuid, teams: Vec<uuid::Uuid>) {
//! let store = Arc::new(MemoryStore::new());
//! let manager = CompetitionManager::new(store);
//! let fixtures = manager.generate_fixtures(competition_id, &teams).await;
//! # }
//! ```

/// Shared entity models and engine errors.
pub mod competition;
pub use competition::{
    Competition, CompetitionFormat, CompetitionId, CompetitionPhase, EngineError, EngineResult,
    Group, Match, MatchStatus, Round, Side, Standing, TeamId,
};

/// Storage layer: the store trait, PostgreSQL and in-memory backends.
pub mod db;
pub use db::{
    Database, DatabaseConfig, StoreError, StoreResult, memory::MemoryStore,
    repository::{CompetitionStore, PgCompetitionStore},
};

/// Competition orchestration.
pub mod engine;
pub use engine::{CompetitionManager, FinishReport, GeneratedFixtures, StandingsView};

/// Match-created notifications.
pub mod notify;
pub use notify::{LogSink, MatchNotifier, NotifierConfig};

/// Pure fixture planners.
pub mod schedule;

/// Standings arithmetic and ranking order.
pub mod standings;
