use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::BonusType;

pub type PickemResult<T> = Result<T, PickemError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the data store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read store {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write store {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate {collection} key: {key}")]
    Duplicate { collection: &'static str, key: String },
    #[error("no {collection} record with id {id}")]
    Missing { collection: &'static str, id: String },
}

/// Coarse grouping the command layer uses to pick its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    Locked,
    NotFound,
    Store,
}

#[derive(Debug, Error)]
pub enum PickemError {
    // validation
    #[error("invalid timestamp `{0}`; use ISO8601 like 2025-10-21T17:00:00Z")]
    InvalidTimestamp(String),
    #[error("team A and team B must be different")]
    SameTeams,
    #[error("best-of must be between {min} and {max}, got {got}")]
    InvalidBestOf { got: i64, min: u8, max: u8 },
    #[error("scores cannot be negative ({score_a}-{score_b})")]
    NegativeScore { score_a: i64, score_b: i64 },
    #[error("provide at least one team name")]
    EmptySelection,
    #[error("{given} teams provided but the max is {max}")]
    TooManySelections { given: usize, max: usize },
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("team `{0}` already exists")]
    DuplicateTeam(String),
    #[error("player `{player}` is already registered for {team}")]
    DuplicatePlayer { player: String, team: String },
    #[error("a match with these teams at this time already exists")]
    DuplicateMatch,
    #[error("team `{team}` plays in {matches} match(es); re-run with force to delete them and their predictions")]
    TeamInUse {
        team: String,
        matches: usize,
        players: usize,
    },

    // state gate
    #[error("picks for this match closed at {lock_at}")]
    MatchLocked { lock_at: DateTime<Utc> },
    #[error("match is already completed")]
    MatchCompleted,
    #[error("{} picks locked at {lock_at}", kind.as_str())]
    BonusLocked {
        kind: BonusType,
        lock_at: DateTime<Utc>,
    },
    #[error("bonus picks are closed right now")]
    PicksClosed,
    #[error("group stage schedule is not configured yet; bonus picks are not open")]
    ScheduleUndetermined,

    // not found
    #[error("team `{0}` not found")]
    TeamNotFound(String),
    #[error("team(s) not found: {}", .0.join(", "))]
    TeamsNotFound(Vec<String>),
    #[error("player `{0}` not found")]
    PlayerNotFound(String),
    #[error("match `{0}` not found")]
    MatchNotFound(String),
    #[error("user `{0}` not found")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PickemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PickemError::InvalidTimestamp(_)
            | PickemError::SameTeams
            | PickemError::InvalidBestOf { .. }
            | PickemError::NegativeScore { .. }
            | PickemError::EmptySelection
            | PickemError::TooManySelections { .. }
            | PickemError::Invalid(_)
            | PickemError::DuplicateTeam(_)
            | PickemError::DuplicatePlayer { .. }
            | PickemError::DuplicateMatch
            | PickemError::TeamInUse { .. } => ErrorKind::Invalid,
            PickemError::MatchLocked { .. }
            | PickemError::MatchCompleted
            | PickemError::BonusLocked { .. }
            | PickemError::PicksClosed
            | PickemError::ScheduleUndetermined => ErrorKind::Locked,
            PickemError::TeamNotFound(_)
            | PickemError::TeamsNotFound(_)
            | PickemError::PlayerNotFound(_)
            | PickemError::MatchNotFound(_)
            | PickemError::UserNotFound(_) => ErrorKind::NotFound,
            PickemError::Store(_) => ErrorKind::Store,
        }
    }
}
