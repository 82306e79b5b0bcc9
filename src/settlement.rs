use std::collections::HashSet;

use tracing::{info, warn};

use crate::admin::{resolve_team, resolve_teams};
use crate::config::normalize_player_key;
use crate::error::PickemResult;
use crate::store::EntityStore;
use crate::types::*;

/// Settle the tournament-winner bonus: 4 points for picking `team_name`.
pub fn settle_winner(store: &mut dyn EntityStore, team_name: &str) -> PickemResult<BonusSettlementReport> {
    let winner = resolve_team(store, team_name)?;
    let actual = vec![winner.name.clone()];
    apply_bonus_points(store, BonusType::WorldsWinner, actual, |pick| match pick {
        BonusPick::WorldsWinner([team]) if team == &winner.id => WINNER_POINTS,
        _ => 0,
    })
}

/// Settle the advancers bonus: 3 points per correctly picked team.
/// Every name must resolve before anything is written.
pub fn settle_advancers(store: &mut dyn EntityStore, raw_names: &str) -> PickemResult<BonusSettlementReport> {
    let teams = resolve_teams(store, raw_names)?;
    let actual_ids: HashSet<Id> = teams.iter().map(|t| t.id.clone()).collect();
    let actual = teams.iter().map(|t| t.name.clone()).collect();
    apply_bonus_points(store, BonusType::GroupsAdvancers, actual, |pick| match pick {
        BonusPick::GroupsAdvancers(selections) => {
            let picked: HashSet<&Id> = selections.iter().collect();
            let correct = picked.into_iter().filter(|id| actual_ids.contains(*id)).count();
            ADVANCER_POINTS * correct as i64
        }
        _ => 0,
    })
}

/// Settle the MVP bonus. The actual name is resolved against the roster when
/// possible; picks match on player reference first, then on normalized name.
pub fn settle_mvp(store: &mut dyn EntityStore, player_name: &str) -> PickemResult<BonusSettlementReport> {
    let resolved = store.find_player_by_name(player_name)?;
    let actual_name = resolved
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| player_name.trim().to_string());
    let actual_id = resolved.map(|p| p.id);
    let actual_key = normalize_player_key(&actual_name);

    apply_bonus_points(store, BonusType::Mvp, vec![actual_name], |pick| match pick {
        BonusPick::Mvp([selection]) => {
            if mvp_matches(selection, actual_id.as_ref(), &actual_key) {
                MVP_POINTS
            } else {
                0
            }
        }
        _ => 0,
    })
}

fn mvp_matches(selection: &MvpSelection, actual_id: Option<&Id>, actual_key: &str) -> bool {
    if let (Some(actual), Some(picked)) = (actual_id, selection.player_id.as_ref()) {
        if actual == picked {
            return true;
        }
    }
    let picked_key = normalize_player_key(&selection.name);
    !picked_key.is_empty() && picked_key == actual_key
}

fn apply_bonus_points<F>(
    store: &mut dyn EntityStore,
    kind: BonusType,
    actual: Vec<String>,
    score: F,
) -> PickemResult<BonusSettlementReport>
where
    F: Fn(&BonusPick) -> i64,
{
    let picks = store.bonus_predictions_of(kind)?;
    let mut report = BonusSettlementReport {
        kind,
        actual,
        considered: picks.len(),
        correct: 0,
        users_updated: 0,
        skipped: 0,
        awarded: 0,
    };

    for bonus in picks {
        let new_points = score(&bonus.pick);
        if new_points > 0 {
            report.correct += 1;
        }
        let delta = new_points - bonus.points;
        if delta == 0 {
            continue;
        }

        match store.user(&bonus.user) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!("{} pick {}: owner {} missing, skipped", kind.as_str(), bonus.id, bonus.user);
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("{} pick {}: owner lookup failed: {e}", kind.as_str(), bonus.id);
                report.skipped += 1;
                continue;
            }
        }
        if let Err(e) = store.set_bonus_points(&bonus.id, new_points) {
            warn!("{} pick {}: points update failed: {e}", kind.as_str(), bonus.id);
            report.skipped += 1;
            continue;
        }
        if let Err(e) = store.add_user_points(&bonus.user, delta, None) {
            warn!("{} pick {}: user {} total update failed: {e}", kind.as_str(), bonus.id, bonus.user);
            if let Err(e) = store.set_bonus_points(&bonus.id, bonus.points) {
                warn!("{} pick {}: rollback to {} failed: {e}", kind.as_str(), bonus.id, bonus.points);
            }
            report.skipped += 1;
            continue;
        }

        report.users_updated += 1;
        report.awarded += delta;
    }

    info!(
        "settled {} ({}): {} pick(s), {} correct, {} user(s) updated, {} skipped, {} point(s) awarded",
        kind.as_str(),
        report.actual.join(", "),
        report.considered,
        report.correct,
        report.users_updated,
        report.skipped,
        report.awarded
    );
    Ok(report)
}
