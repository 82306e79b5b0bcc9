use std::cmp::Ordering;

use tracing::{info, warn};

use crate::error::{PickemError, PickemResult};
use crate::store::EntityStore;
use crate::types::*;

/// 2 for the exact score, 1 for the right outcome (A wins / B wins / draw), else 0.
pub fn points_for(predicted: (u32, u32), actual: (u32, u32)) -> i64 {
    if predicted == actual {
        return EXACT_SCORE_POINTS;
    }
    if outcome(predicted) == outcome(actual) {
        return OUTCOME_POINTS;
    }
    0
}

fn outcome((a, b): (u32, u32)) -> Ordering {
    a.cmp(&b)
}

pub(crate) fn team_label(store: &dyn EntityStore, id: &Id) -> String {
    match store.team(id) {
        Ok(Some(team)) => team.name,
        _ => id.to_string(),
    }
}

/// Re-score every prediction on a completed match and push only the change in
/// points onto user totals. Running it again with the same score is a no-op.
pub fn score_match(store: &mut dyn EntityStore, record: &Match) -> PickemResult<ScoringReport> {
    let actual = match (record.is_completed(), record.final_score()) {
        (true, Some(score)) => score,
        _ => {
            return Err(PickemError::Invalid(format!(
                "match {} has no final score to settle",
                record.id
            )))
        }
    };

    let predictions = store.predictions_for_match(&record.id)?;
    let mut report = ScoringReport {
        match_id: record.id.clone(),
        team_a: team_label(store, &record.team_a),
        team_b: team_label(store, &record.team_b),
        score_a: actual.0,
        score_b: actual.1,
        considered: predictions.len(),
        updated: 0,
        skipped: 0,
        awarded: 0,
    };

    for prediction in predictions {
        let new_points = points_for((prediction.score_a, prediction.score_b), actual);
        let delta = new_points - prediction.points;
        if delta == 0 {
            continue;
        }

        if let Err(e) = store.ensure_user(&prediction.user) {
            warn!("prediction {}: owner {} unavailable: {e}", prediction.id, prediction.user);
            report.skipped += 1;
            continue;
        }
        if let Err(e) = store.set_prediction_points(&prediction.id, new_points) {
            warn!("prediction {}: points update failed: {e}", prediction.id);
            report.skipped += 1;
            continue;
        }
        if let Err(e) = store.add_user_points(&prediction.user, delta, Some(record.phase)) {
            warn!(
                "prediction {}: user {} total update failed: {e}",
                prediction.id, prediction.user
            );
            // Put the old value back so the next run sees the same delta again.
            if let Err(e) = store.set_prediction_points(&prediction.id, prediction.points) {
                warn!("prediction {}: rollback to {} failed: {e}", prediction.id, prediction.points);
            }
            report.skipped += 1;
            continue;
        }

        report.updated += 1;
        report.awarded += delta;
    }

    info!(
        "scored match {} ({} {}-{} {}): {} prediction(s), {} updated, {} skipped, {} point(s) awarded",
        report.match_id,
        report.team_a,
        report.score_a,
        report.score_b,
        report.team_b,
        report.considered,
        report.updated,
        report.skipped,
        report.awarded
    );
    Ok(report)
}
