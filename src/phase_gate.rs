use tracing::info;

use crate::error::{PickemError, PickemResult};
use crate::store::EntityStore;
use crate::types::*;

/// Current global phase. `None` until an admin sets it for the first time.
pub fn current_phase(store: &dyn EntityStore) -> PickemResult<Option<TournamentPhase>> {
    Ok(store.phase()?.map(|record| record.current))
}

pub fn set_phase(store: &mut dyn EntityStore, phase: TournamentPhase) -> PickemResult<PhaseRecord> {
    let record = store.set_phase(phase)?;
    info!("phase set to {}", phase.as_str());
    Ok(record)
}

/// Only an explicit `closed` refuses; every other value (or no record) defers to the lock clock.
pub fn ensure_bonus_picks_allowed(store: &dyn EntityStore) -> PickemResult<()> {
    match current_phase(store)? {
        Some(TournamentPhase::Closed) => Err(PickemError::PicksClosed),
        _ => Ok(()),
    }
}
