//! Command boundary for the chat transport. Each function maps to one slash
//! command: it locks the shared store, stamps the current time, runs the core
//! operation and logs what went wrong. Rendering the reply is left to the caller.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::config::now_utc;
use crate::error::{ErrorKind, PickemError, PickemResult};
use crate::store::JsonStore;
use crate::types::*;
use crate::{admin, lock_clock, phase_gate, picks, reconcile, settlement, standings};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Lock the store, then call `f` with `(&mut JsonStore, now)`. Failures are logged here.
fn with_store<F, R>(state: &CommandState, command: &str, f: F) -> PickemResult<R>
where
    F: FnOnce(&mut JsonStore, DateTime<Utc>) -> PickemResult<R>,
{
    let now = now_utc();
    let mut guard = state.store.lock().unwrap_or_else(|e| e.into_inner());
    let result = f(&mut *guard, now);
    if let Err(e) = &result {
        log_failure(command, e);
    }
    result
}

fn log_failure(command: &str, e: &PickemError) {
    match e.kind() {
        ErrorKind::Store => error!("/{command} failed: {e}"),
        _ => debug!("/{command} refused: {e}"),
    }
}

fn parse_match_phase(raw: &str) -> PickemResult<MatchPhase> {
    raw.parse::<MatchPhase>().map_err(PickemError::Invalid)
}

fn match_ref(match_id: Option<&str>, team_a: Option<&str>, team_b: Option<&str>, start: Option<&str>) -> MatchRef {
    match match_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => MatchRef::ById(id.to_string()),
        None => MatchRef::ByTeams {
            team_a: team_a.unwrap_or_default().to_string(),
            team_b: team_b.unwrap_or_default().to_string(),
            start: start.unwrap_or_default().to_string(),
        },
    }
}

/// Options a match-targeting command accepts: an id, or the identifying triple.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions<'a> {
    pub match_id: Option<&'a str>,
    pub team_a: Option<&'a str>,
    pub team_b: Option<&'a str>,
    pub start: Option<&'a str>,
}

impl MatchOptions<'_> {
    fn target(&self) -> MatchRef {
        match_ref(self.match_id, self.team_a, self.team_b, self.start)
    }
}

// ── Admin: registry ────────────────────────────────────────────────────

pub fn add_team(state: &CommandState, name: &str, region: &str) -> PickemResult<Team> {
    with_store(state, "addteam", |store, _| admin::add_team(store, name, region))
}

pub fn add_player(state: &CommandState, name: &str, role: &str, team: &str) -> PickemResult<Player> {
    with_store(state, "addplayer", |store, _| admin::add_player(store, name, role, team))
}

pub fn remove_player(
    state: &CommandState,
    player_id: Option<&str>,
    name: Option<&str>,
    team: Option<&str>,
) -> PickemResult<Player> {
    let target = match (player_id.map(str::trim).filter(|id| !id.is_empty()), name, team) {
        (Some(id), _, _) => PlayerRef::ById(id.to_string()),
        (None, Some(name), Some(team)) => PlayerRef::ByName {
            name: name.to_string(),
            team: team.to_string(),
        },
        _ => {
            return Err(PickemError::Invalid(
                "provide a player id or both name and team".to_string(),
            ))
        }
    };
    with_store(state, "removeplayer", |store, _| admin::remove_player(store, &target))
}

pub fn remove_team(state: &CommandState, name: &str, force: bool) -> PickemResult<TeamRemoval> {
    with_store(state, "removeteam", |store, _| admin::remove_team(store, name, force))
}

pub fn teams_book(state: &CommandState) -> PickemResult<Vec<TeamRoster>> {
    with_store(state, "teamsbook", |store, _| standings::team_rosters(store))
}

// ── Admin: matches & results ───────────────────────────────────────────

pub fn add_match(
    state: &CommandState,
    team_a: &str,
    team_b: &str,
    start: &str,
    phase: &str,
    best_of: Option<i64>,
) -> PickemResult<Match> {
    with_store(state, "addmatch", |store, _| {
        let phase = parse_match_phase(phase)?;
        admin::add_match(store, team_a, team_b, start, phase, best_of)
    })
}

pub fn remove_match(state: &CommandState, options: &MatchOptions<'_>) -> PickemResult<MatchRemoval> {
    with_store(state, "removematch", |store, _| admin::remove_match(store, &options.target()))
}

pub fn results(
    state: &CommandState,
    options: &MatchOptions<'_>,
    score_a: i64,
    score_b: i64,
) -> PickemResult<ScoringReport> {
    with_store(state, "results", |store, _| {
        admin::declare_result(store, &options.target(), score_a, score_b)
    })
}

pub fn lock_match(state: &CommandState, action: LockAction, options: &MatchOptions<'_>) -> PickemResult<Match> {
    with_store(state, "lockmatch", |store, _| {
        admin::set_match_lock(store, &options.target(), action)
    })
}

pub fn update_phase(state: &CommandState, phase: &str) -> PickemResult<PhaseRecord> {
    with_store(state, "updatephase", |store, _| admin::set_phase(store, phase))
}

/// Body of the periodic lock job.
pub fn lock_overdue(state: &CommandState) -> PickemResult<usize> {
    with_store(state, "lock-job", |store, now| {
        Ok(lock_clock::lock_overdue_matches(store, now)?.len())
    })
}

// ── Admin: settlement ──────────────────────────────────────────────────

pub fn settle_winner(state: &CommandState, team: &str) -> PickemResult<BonusSettlementReport> {
    with_store(state, "settle_winner", |store, _| settlement::settle_winner(store, team))
}

pub fn settle_advancers(state: &CommandState, teams: &str) -> PickemResult<BonusSettlementReport> {
    with_store(state, "settle_advancers", |store, _| settlement::settle_advancers(store, teams))
}

pub fn settle_mvp(state: &CommandState, player: &str) -> PickemResult<BonusSettlementReport> {
    with_store(state, "settle_mvp", |store, _| settlement::settle_mvp(store, player))
}

pub fn fix_users(state: &CommandState) -> PickemResult<ReconcileReport> {
    with_store(state, "fix_users", |store, _| reconcile::reconcile_ghost_users(store))
}

// ── Members: picks ─────────────────────────────────────────────────────

pub fn predict(
    state: &CommandState,
    member: &Member,
    team_a: &str,
    team_b: &str,
    start: &str,
    score_a: i64,
    score_b: i64,
) -> PickemResult<PredictionReceipt> {
    let target = MatchRef::ByTeams {
        team_a: team_a.to_string(),
        team_b: team_b.to_string(),
        start: start.to_string(),
    };
    with_store(state, "predict", |store, now| {
        picks::submit_prediction(store, member, &target, score_a, score_b, now)
    })
}

pub fn bonus_winner(state: &CommandState, member: &Member, team: &str) -> PickemResult<BonusReceipt> {
    with_store(state, "bonus_winner", |store, now| picks::submit_winner(store, member, team, now))
}

/// `max` falls back to the configured `advancersMax`.
pub fn bonus_advancers(
    state: &CommandState,
    member: &Member,
    teams: &str,
    max: Option<i64>,
) -> PickemResult<BonusReceipt> {
    let max = match max {
        None => state.config.advancers_max,
        Some(n) => usize::try_from(n)
            .map_err(|_| PickemError::Invalid(format!("max must be at least 1, got {n}")))?,
    };
    with_store(state, "bonus_advancers", |store, now| {
        picks::submit_advancers(store, member, teams, max, now)
    })
}

pub fn bonus_mvp(state: &CommandState, member: &Member, player: &str) -> PickemResult<BonusReceipt> {
    with_store(state, "bonus_mvp", |store, now| picks::submit_mvp(store, member, player, now))
}

// ── Members: read side ─────────────────────────────────────────────────

pub fn standings(state: &CommandState, limit: Option<usize>) -> PickemResult<Vec<StandingRow>> {
    let limit = limit.unwrap_or(state.config.standings_limit);
    with_store(state, "standings", |store, _| standings::standings(store, limit))
}

pub fn phase_standings(state: &CommandState, phase: &str, limit: Option<usize>) -> PickemResult<Vec<StandingRow>> {
    let limit = limit.unwrap_or(state.config.standings_limit);
    with_store(state, "standings", |store, _| {
        let phase = parse_match_phase(phase)?;
        standings::phase_standings(store, phase, limit)
    })
}

pub fn my_predictions(state: &CommandState, member: &Member) -> PickemResult<Vec<PredictionLine>> {
    with_store(state, "mypredictions", |store, _| {
        standings::my_predictions(store, &member.discord_id)
    })
}

pub fn my_bonuses(state: &CommandState, member: &Member) -> PickemResult<Vec<BonusLine>> {
    with_store(state, "mybonuses", |store, _| standings::my_bonuses(store, &member.discord_id))
}

pub fn matches(state: &CommandState, filter: MatchFilter, phase: Option<&str>) -> PickemResult<Vec<MatchSummary>> {
    with_store(state, "matches", |store, _| {
        let phase = phase.map(parse_match_phase).transpose()?;
        standings::list_matches(store, filter, phase)
    })
}

pub fn current_phase(state: &CommandState) -> PickemResult<Option<TournamentPhase>> {
    with_store(state, "phase", |store, _| phase_gate::current_phase(store))
}
