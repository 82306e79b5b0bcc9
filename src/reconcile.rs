use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::PickemResult;
use crate::store::EntityStore;
use crate::types::*;

/// A ghost carries another user's internal id in its `discordId`.
fn ghost_target<'a>(user: &User, known: &'a HashSet<Id>) -> Option<&'a Id> {
    if !Id::is_object_id(&user.discord_id) || user.discord_id == user.id.as_str() {
        return None;
    }
    known.get(&Id::from(user.discord_id.as_str()))
}

/// Fold every ghost user's totals into the user it points at, then delete the ghost.
/// Safe to repeat: a merged ghost no longer exists.
pub fn reconcile_ghost_users(store: &mut dyn EntityStore) -> PickemResult<ReconcileReport> {
    let users = store.users()?;
    let known: HashSet<Id> = users.iter().map(|u| u.id.clone()).collect();
    let mut report = ReconcileReport::default();

    for ghost in &users {
        let Some(target) = ghost_target(ghost, &known) else {
            continue;
        };
        // An earlier merge in this run may have removed either side.
        if store.user(&ghost.id)?.is_none() || store.user(target)?.is_none() {
            continue;
        }

        if let Err(e) = store.add_user_totals(target, ghost.total_points, &ghost.phase_points) {
            warn!("merge of ghost {} into {target} failed: {e}", ghost.id);
            continue;
        }
        if let Err(e) = store.delete_user(&ghost.id) {
            warn!("ghost {} could not be deleted: {e}", ghost.id);
            // The ghost survives, so take its points back off the target for the next run.
            if let Err(e) = store.add_user_totals(target, -ghost.total_points, &ghost.phase_points.negated()) {
                warn!("undoing merge of ghost {} into {target} failed: {e}", ghost.id);
            }
            continue;
        }

        info!(
            "merged ghost user {} ({} pts) into {target}",
            ghost.id, ghost.total_points
        );
        report.merged += 1;
        report.transferred_points += ghost.total_points;
    }

    info!(
        "ghost reconciliation: {} merged, {} point(s) transferred",
        report.merged, report.transferred_points
    );
    Ok(report)
}
