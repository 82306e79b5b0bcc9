use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::error::{PickemError, PickemResult};
use crate::store::EntityStore;
use crate::types::*;

pub fn lock_offset() -> Duration {
    Duration::hours(LOCK_OFFSET_HOURS)
}

/// Lock instant for anything keyed off a start time.
pub fn lock_instant_for(start: DateTime<Utc>) -> DateTime<Utc> {
    start - lock_offset()
}

/// Picks stay open strictly before the lock instant.
pub fn is_open(now: DateTime<Utc>, lock_at: DateTime<Utc>) -> bool {
    now < lock_at
}

/// Lock for bonus picks: two hours before the earliest group-stage match.
/// `None` means the schedule has not been published yet.
pub fn compute_group_stage_lock(store: &dyn EntityStore) -> PickemResult<Option<DateTime<Utc>>> {
    let first = store
        .matches()?
        .into_iter()
        .filter(|m| m.phase == MatchPhase::GroupStage)
        .map(|m| m.start_time)
        .min();
    Ok(first.map(lock_instant_for))
}

/// Refuse a per-match pick once the match is completed, locked, or past its lock instant.
pub fn check_match_open(record: &Match, now: DateTime<Utc>) -> PickemResult<()> {
    if record.is_completed() {
        return Err(PickemError::MatchCompleted);
    }
    if record.status == MatchStatus::Locked || !is_open(now, record.lock_at) {
        return Err(PickemError::MatchLocked {
            lock_at: record.lock_at,
        });
    }
    Ok(())
}

/// Where a bonus pick's effective lock came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusLock {
    /// Frozen on the pick the first time it was saved.
    Stored(DateTime<Utc>),
    /// Freshly derived from the schedule; must be persisted with the pick.
    Fresh(DateTime<Utc>),
}

impl BonusLock {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            BonusLock::Stored(at) | BonusLock::Fresh(at) => *at,
        }
    }
}

/// Trust the lock stored on an existing pick; otherwise derive it from the schedule.
pub fn resolve_bonus_lock(
    store: &dyn EntityStore,
    existing: Option<&BonusPrediction>,
) -> PickemResult<BonusLock> {
    if let Some(stored) = existing.and_then(|b| b.lock_at) {
        return Ok(BonusLock::Stored(stored));
    }
    compute_group_stage_lock(store)?
        .map(BonusLock::Fresh)
        .ok_or(PickemError::ScheduleUndetermined)
}

pub fn check_bonus_open(kind: BonusType, lock: BonusLock, now: DateTime<Utc>) -> PickemResult<DateTime<Utc>> {
    let lock_at = lock.instant();
    if !is_open(now, lock_at) {
        return Err(PickemError::BonusLocked { kind, lock_at });
    }
    Ok(lock_at)
}

/// Flip every scheduled match whose lock instant has passed to `locked`.
/// Returns the matches that changed; a failed write is logged and skipped.
pub fn lock_overdue_matches(store: &mut dyn EntityStore, now: DateTime<Utc>) -> PickemResult<Vec<Match>> {
    let due: Vec<Match> = store
        .matches()?
        .into_iter()
        .filter(|m| m.status == MatchStatus::Scheduled && m.lock_at <= now)
        .collect();

    let mut locked = Vec::with_capacity(due.len());
    for mut record in due {
        record.status = MatchStatus::Locked;
        match store.update_match(&record) {
            Ok(()) => {
                info!(
                    "auto-locked match {} ({} vs {}) starting {}",
                    record.id,
                    record.team_a,
                    record.team_b,
                    record.start_time.to_rfc3339()
                );
                locked.push(record);
            }
            Err(e) => warn!("auto-lock of match {} failed: {e}", record.id),
        }
    }
    Ok(locked)
}
