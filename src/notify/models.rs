//! Notification payloads and delivery configuration.

use serde::{Deserialize, Serialize};
use std::env;

use crate::competition::{CompetitionId, Match, MatchId, MatchStatus, TeamId};

/// Payload published for every created match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCreated {
    pub match_id: MatchId,
    pub competition_id: CompetitionId,
    pub team_home_id: Option<TeamId>,
    pub team_away_id: Option<TeamId>,
    pub status: MatchStatus,
}

impl From<&Match> for MatchCreated {
    fn from(m: &Match) -> Self {
        Self {
            match_id: m.id,
            competition_id: m.competition_id,
            team_home_id: m.home_team,
            team_away_id: m.away_team,
            status: m.status,
        }
    }
}

/// Delivery configuration for the notifier worker.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Exchange the sink publishes to
    pub exchange: String,
    /// Routing key for created matches
    pub routing_key: String,
    /// Delivery attempts per event before it is dropped
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Queued events before `notify` starts shedding
    pub queue_capacity: usize,
}

impl NotifierConfig {
    /// Create configuration from environment variables
    ///
    /// - `NOTIFY_EXCHANGE` (default: `matches_commands_exchange`)
    /// - `NOTIFY_ROUTING_KEY` (default: `match_created`)
    /// - `NOTIFY_MAX_ATTEMPTS` (default: 3)
    /// - `NOTIFY_RETRY_DELAY_MS` (default: 250)
    /// - `NOTIFY_QUEUE_CAPACITY` (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            exchange: env::var("NOTIFY_EXCHANGE").unwrap_or(defaults.exchange),
            routing_key: env::var("NOTIFY_ROUTING_KEY").unwrap_or(defaults.routing_key),
            max_attempts: env::var("NOTIFY_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attempts),
            retry_delay_ms: env::var("NOTIFY_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
            queue_capacity: env::var("NOTIFY_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            exchange: "matches_commands_exchange".to_string(),
            routing_key: "match_created".to_string(),
            max_attempts: 3,
            retry_delay_ms: 250,
            queue_capacity: 256,
        }
    }
}
