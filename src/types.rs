use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};

use crate::store::JsonStore;

// ── Constants ──────────────────────────────────────────────────────────

pub const LOCK_OFFSET_HOURS: i64 = 2;
pub const EXACT_SCORE_POINTS: i64 = 2;
pub const OUTCOME_POINTS: i64 = 1;
pub const WINNER_POINTS: i64 = 4;
pub const ADVANCER_POINTS: i64 = 3;
pub const MVP_POINTS: i64 = 5;
pub const MIN_BEST_OF: u8 = 1;
pub const MAX_BEST_OF: u8 = 7;
pub const DEFAULT_ADVANCERS_MAX: usize = 8;
pub const DEFAULT_STANDINGS_LIMIT: usize = 10;
pub const LOCK_JOB_INTERVAL_SECS: u64 = 60;
pub const OBJECT_ID_LEN: usize = 24;

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedStore = Arc<Mutex<JsonStore>>;

/// What every chat command handler gets: the store plus the loaded config.
#[derive(Clone)]
pub struct CommandState {
    pub store: SharedStore,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct StatusServerState {
    pub store: SharedStore,
    pub standings_limit: usize,
}

// ── Identifiers ────────────────────────────────────────────────────────

/// Opaque record handle. Freshly generated ids are 24 lowercase hex chars
/// (4-byte seconds timestamp followed by 8 random bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp().max(0) as u32;
        let random = uuid::Uuid::new_v4();
        let mut out = format!("{secs:08x}");
        for byte in &random.as_bytes()[..8] {
            out.push_str(&format!("{byte:02x}"));
        }
        Id(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `raw` has the shape of an internal identifier.
    pub fn is_object_id(raw: &str) -> bool {
        raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Id(raw.trim().to_string())
    }
}

impl From<String> for Id {
    fn from(raw: String) -> Self {
        Id::from(raw.as_str())
    }
}

// ── Enums ──────────────────────────────────────────────────────────────

/// Tournament stage a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchPhase {
    #[serde(rename = "group_stage")]
    GroupStage,
    #[serde(rename = "top_4")]
    Top4,
    #[serde(rename = "finals")]
    Finals,
}

impl MatchPhase {
    pub const ALL: [MatchPhase; 3] = [MatchPhase::GroupStage, MatchPhase::Top4, MatchPhase::Finals];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::GroupStage => "group_stage",
            MatchPhase::Top4 => "top_4",
            MatchPhase::Finals => "finals",
        }
    }
}

impl FromStr for MatchPhase {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "group_stage" => Ok(MatchPhase::GroupStage),
            "top_4" => Ok(MatchPhase::Top4),
            "finals" => Ok(MatchPhase::Finals),
            other => Err(format!("unknown match phase `{other}`")),
        }
    }
}

/// Value of the global phase record. `Closed` freezes every bonus pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentPhase {
    #[serde(rename = "group_stage")]
    GroupStage,
    #[serde(rename = "top_4")]
    Top4,
    #[serde(rename = "finals")]
    Finals,
    #[serde(rename = "closed")]
    Closed,
}

impl TournamentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentPhase::GroupStage => "group_stage",
            TournamentPhase::Top4 => "top_4",
            TournamentPhase::Finals => "finals",
            TournamentPhase::Closed => "closed",
        }
    }
}

impl FromStr for TournamentPhase {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "group_stage" => Ok(TournamentPhase::GroupStage),
            "top_4" => Ok(TournamentPhase::Top4),
            "finals" => Ok(TournamentPhase::Finals),
            "closed" => Ok(TournamentPhase::Closed),
            other => Err(format!("unknown phase `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Locked,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusType {
    WorldsWinner,
    GroupsAdvancers,
    Mvp,
}

impl BonusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonusType::WorldsWinner => "worlds_winner",
            BonusType::GroupsAdvancers => "groups_advancers",
            BonusType::Mvp => "mvp",
        }
    }
}

// ── Persisted records ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub role: String,
    pub team: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(rename = "_id")]
    pub id: Id,
    pub team_a: Id,
    pub team_b: Id,
    pub start_time: DateTime<Utc>,
    pub phase: MatchPhase,
    #[serde(default = "default_best_of")]
    pub best_of: u8,
    pub lock_at: DateTime<Utc>,
    #[serde(default)]
    pub score_a: Option<u32>,
    #[serde(default)]
    pub score_b: Option<u32>,
    pub status: MatchStatus,
}

fn default_best_of() -> u8 {
    MIN_BEST_OF
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, team: &Id) -> bool {
        &self.team_a == team || &self.team_b == team
    }

    pub fn final_score(&self) -> Option<(u32, u32)> {
        match (self.score_a, self.score_b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(rename = "_id")]
    pub id: Id,
    pub user: Id,
    #[serde(rename = "match")]
    pub match_id: Id,
    pub score_a: u32,
    pub score_b: u32,
    #[serde(default)]
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpSelection {
    pub name: String,
    #[serde(default)]
    pub player_id: Option<Id>,
}

/// Bonus pick payload, discriminated by the record's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "selections", rename_all = "snake_case")]
pub enum BonusPick {
    WorldsWinner([Id; 1]),
    GroupsAdvancers(Vec<Id>),
    Mvp([MvpSelection; 1]),
}

impl BonusPick {
    pub fn kind(&self) -> BonusType {
        match self {
            BonusPick::WorldsWinner(_) => BonusType::WorldsWinner,
            BonusPick::GroupsAdvancers(_) => BonusType::GroupsAdvancers,
            BonusPick::Mvp(_) => BonusType::Mvp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusPrediction {
    #[serde(rename = "_id")]
    pub id: Id,
    pub user: Id,
    #[serde(flatten)]
    pub pick: BonusPick,
    #[serde(default)]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points: i64,
}

impl BonusPrediction {
    pub fn kind(&self) -> BonusType {
        self.pick.kind()
    }
}

/// Points earned from match predictions, per phase. Bonus points never land here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhasePoints {
    pub group_stage: i64,
    #[serde(rename = "top_4")]
    pub top_4: i64,
    pub finals: i64,
}

impl PhasePoints {
    pub fn get(&self, phase: MatchPhase) -> i64 {
        match phase {
            MatchPhase::GroupStage => self.group_stage,
            MatchPhase::Top4 => self.top_4,
            MatchPhase::Finals => self.finals,
        }
    }

    pub fn add(&mut self, phase: MatchPhase, delta: i64) {
        match phase {
            MatchPhase::GroupStage => self.group_stage += delta,
            MatchPhase::Top4 => self.top_4 += delta,
            MatchPhase::Finals => self.finals += delta,
        }
    }

    pub fn absorb(&mut self, other: &PhasePoints) {
        for phase in MatchPhase::ALL {
            self.add(phase, other.get(phase));
        }
    }

    pub fn negated(&self) -> PhasePoints {
        PhasePoints {
            group_stage: -self.group_stage,
            top_4: -self.top_4,
            finals: -self.finals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub discord_id: String,
    pub username: String,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub phase_points: PhasePoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub current: TournamentPhase,
}

// ── Command inputs ─────────────────────────────────────────────────────

/// The chat identity behind a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub discord_id: String,
    pub username: String,
}

impl Member {
    pub fn new(discord_id: impl Into<String>, username: impl Into<String>) -> Self {
        Member {
            discord_id: discord_id.into(),
            username: username.into(),
        }
    }
}

/// How an admin or user points at a match: by id, or by its identifying triple.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRef {
    ById(String),
    ByTeams {
        team_a: String,
        team_b: String,
        start: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerRef {
    ById(String),
    ByName { name: String, team: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    Lock,
    Unlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFilter {
    #[default]
    Upcoming,
    Completed,
    All,
}

// ── Reports ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringReport {
    pub match_id: Id,
    pub team_a: String,
    pub team_b: String,
    pub score_a: u32,
    pub score_b: u32,
    pub considered: usize,
    pub updated: usize,
    pub skipped: usize,
    pub awarded: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusSettlementReport {
    pub kind: BonusType,
    pub actual: Vec<String>,
    pub considered: usize,
    pub correct: usize,
    pub users_updated: usize,
    pub skipped: usize,
    pub awarded: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub merged: usize,
    pub transferred_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRemoval {
    pub team: String,
    pub players_removed: usize,
    pub matches_removed: usize,
    pub predictions_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRemoval {
    pub match_id: Id,
    pub matches_removed: usize,
    pub predictions_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: Id,
    pub team_a: String,
    pub team_b: String,
    pub start_time: DateTime<Utc>,
    pub lock_at: DateTime<Utc>,
    pub phase: MatchPhase,
    pub best_of: u8,
    pub status: MatchStatus,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReceipt {
    pub matchup: MatchSummary,
    pub score_a: u32,
    pub score_b: u32,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusReceipt {
    pub kind: BonusType,
    pub selections: Vec<String>,
    pub lock_at: DateTime<Utc>,
    pub roster_match: bool,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: usize,
    pub user: Id,
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionLine {
    pub matchup: MatchSummary,
    pub score_a: u32,
    pub score_b: u32,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusLine {
    pub kind: BonusType,
    pub selections: Vec<String>,
    pub lock_at: Option<DateTime<Utc>>,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    pub team: Team,
    pub players: Vec<Player>,
}

// ── Config types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub data_path: String,
    pub http_addr: String,
    pub http_enabled: bool,
    pub advancers_max: usize,
    pub standings_limit: usize,
    pub lock_job_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: "data/pickem.json".to_string(),
            http_addr: "127.0.0.1:17900".to_string(),
            http_enabled: true,
            advancers_max: DEFAULT_ADVANCERS_MAX,
            standings_limit: DEFAULT_STANDINGS_LIMIT,
            lock_job_interval_secs: LOCK_JOB_INTERVAL_SECS,
        }
    }
}
