use chrono::{DateTime, Utc};
use tracing::info;

use crate::admin::{resolve_match, resolve_team, resolve_teams};
use crate::config::split_name_list;
use crate::error::{PickemError, PickemResult};
use crate::lock_clock::{check_bonus_open, check_match_open, resolve_bonus_lock};
use crate::phase_gate::ensure_bonus_picks_allowed;
use crate::standings::summarize_match;
use crate::store::EntityStore;
use crate::types::*;

/// Create or replace the member's score guess for `target`.
pub fn submit_prediction(
    store: &mut dyn EntityStore,
    member: &Member,
    target: &MatchRef,
    score_a: i64,
    score_b: i64,
    now: DateTime<Utc>,
) -> PickemResult<PredictionReceipt> {
    let (a, b) = match (u32::try_from(score_a), u32::try_from(score_b)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return Err(PickemError::NegativeScore { score_a, score_b }),
    };
    let record = resolve_match(store, target)?;
    check_match_open(&record, now)?;

    let user = store.find_or_create_user(&member.discord_id, &member.username)?;
    let (_, created) = store.upsert_prediction(&user.id, &record.id, a, b)?;
    info!(
        "prediction {} by {} on match {}: {a}-{b}",
        if created { "created" } else { "updated" },
        member.username,
        record.id
    );
    Ok(PredictionReceipt {
        matchup: summarize_match(store, &record),
        score_a: a,
        score_b: b,
        created,
    })
}

/// Lock-check then upsert a bonus pick. The lock frozen on an existing pick
/// wins; a first pick stores the lock derived from the schedule.
fn save_bonus_pick(
    store: &mut dyn EntityStore,
    member: &Member,
    pick: BonusPick,
    now: DateTime<Utc>,
) -> PickemResult<(DateTime<Utc>, bool)> {
    let kind = pick.kind();
    let existing = match store.find_user_by_discord_id(&member.discord_id)? {
        Some(user) => store.bonus_prediction(&user.id, kind)?,
        None => None,
    };
    let lock = resolve_bonus_lock(store, existing.as_ref())?;
    let lock_at = check_bonus_open(kind, lock, now)?;

    let user = store.find_or_create_user(&member.discord_id, &member.username)?;
    store.save_bonus_prediction(BonusPrediction {
        id: Id::generate(),
        user: user.id,
        pick,
        lock_at: Some(lock_at),
        points: 0,
    })?;
    let created = existing.is_none();
    info!(
        "{} pick {} by {} (locks {})",
        kind.as_str(),
        if created { "created" } else { "updated" },
        member.username,
        lock_at.to_rfc3339()
    );
    Ok((lock_at, created))
}

pub fn submit_winner(
    store: &mut dyn EntityStore,
    member: &Member,
    team_name: &str,
    now: DateTime<Utc>,
) -> PickemResult<BonusReceipt> {
    ensure_bonus_picks_allowed(store)?;
    let team = resolve_team(store, team_name)?;
    let (lock_at, created) = save_bonus_pick(store, member, BonusPick::WorldsWinner([team.id]), now)?;
    Ok(BonusReceipt {
        kind: BonusType::WorldsWinner,
        selections: vec![team.name],
        lock_at,
        roster_match: false,
        created,
    })
}

/// `max` caps how many names may be given, counted before de-duplication.
pub fn submit_advancers(
    store: &mut dyn EntityStore,
    member: &Member,
    raw_names: &str,
    max: usize,
    now: DateTime<Utc>,
) -> PickemResult<BonusReceipt> {
    ensure_bonus_picks_allowed(store)?;
    if max == 0 {
        return Err(PickemError::Invalid("max must be at least 1".to_string()));
    }
    let given = split_name_list(raw_names).len();
    if given > max {
        return Err(PickemError::TooManySelections { given, max });
    }
    let teams = resolve_teams(store, raw_names)?;
    let ids = teams.iter().map(|t| t.id.clone()).collect();
    let (lock_at, created) = save_bonus_pick(store, member, BonusPick::GroupsAdvancers(ids), now)?;
    Ok(BonusReceipt {
        kind: BonusType::GroupsAdvancers,
        selections: teams.into_iter().map(|t| t.name).collect(),
        lock_at,
        roster_match: false,
        created,
    })
}

/// Names found on a roster are stored with their player reference and canonical
/// spelling; anything else is kept as typed.
pub fn submit_mvp(
    store: &mut dyn EntityStore,
    member: &Member,
    player_name: &str,
    now: DateTime<Utc>,
) -> PickemResult<BonusReceipt> {
    ensure_bonus_picks_allowed(store)?;
    let raw = player_name.trim();
    if raw.is_empty() {
        return Err(PickemError::Invalid("player name is empty".to_string()));
    }
    let selection = match store.find_player_by_name(raw)? {
        Some(player) => MvpSelection {
            name: player.name,
            player_id: Some(player.id),
        },
        None => MvpSelection {
            name: raw.to_string(),
            player_id: None,
        },
    };
    let roster_match = selection.player_id.is_some();
    let name = selection.name.clone();
    let (lock_at, created) = save_bonus_pick(store, member, BonusPick::Mvp([selection]), now)?;
    Ok(BonusReceipt {
        kind: BonusType::Mvp,
        selections: vec![name],
        lock_at,
        roster_match,
        created,
    })
}
