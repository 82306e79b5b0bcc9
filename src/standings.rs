use std::cmp::Ordering;

use crate::error::PickemResult;
use crate::scoring::team_label;
use crate::store::EntityStore;
use crate::types::*;

pub fn summarize_match(store: &dyn EntityStore, record: &Match) -> MatchSummary {
    MatchSummary {
        id: record.id.clone(),
        team_a: team_label(store, &record.team_a),
        team_b: team_label(store, &record.team_b),
        start_time: record.start_time,
        lock_at: record.lock_at,
        phase: record.phase,
        best_of: record.best_of,
        status: record.status,
        score_a: record.score_a,
        score_b: record.score_b,
    }
}

fn display_name(user: &User) -> String {
    if user.username.trim().is_empty() {
        user.discord_id.clone()
    } else {
        user.username.clone()
    }
}

fn ranked<F>(store: &dyn EntityStore, limit: usize, points: F) -> PickemResult<Vec<StandingRow>>
where
    F: Fn(&User) -> i64,
{
    let mut users = store.users()?;
    users.sort_by(|a, b| match points(b).cmp(&points(a)) {
        Ordering::Equal => display_name(a).to_lowercase().cmp(&display_name(b).to_lowercase()),
        other => other,
    });
    Ok(users
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, user)| StandingRow {
            rank: i + 1,
            user: user.id.clone(),
            name: display_name(user),
            points: points(user),
        })
        .collect())
}

/// Leaderboard by total points.
pub fn standings(store: &dyn EntityStore, limit: usize) -> PickemResult<Vec<StandingRow>> {
    ranked(store, limit, |u| u.total_points)
}

/// Leaderboard by match points earned in a single phase.
pub fn phase_standings(store: &dyn EntityStore, phase: MatchPhase, limit: usize) -> PickemResult<Vec<StandingRow>> {
    ranked(store, limit, |u| u.phase_points.get(phase))
}

/// A member's predictions, newest match first. Predictions whose match is gone are dropped.
pub fn my_predictions(store: &dyn EntityStore, discord_id: &str) -> PickemResult<Vec<PredictionLine>> {
    let Some(user) = store.find_user_by_discord_id(discord_id)? else {
        return Ok(Vec::new());
    };
    let mut lines = Vec::new();
    for prediction in store.predictions_for_user(&user.id)? {
        let Some(record) = store.get_match(&prediction.match_id)? else {
            continue;
        };
        lines.push(PredictionLine {
            matchup: summarize_match(store, &record),
            score_a: prediction.score_a,
            score_b: prediction.score_b,
            points: prediction.points,
        });
    }
    lines.sort_by(|a, b| b.matchup.start_time.cmp(&a.matchup.start_time));
    Ok(lines)
}

fn unknown_team(id: &Id) -> String {
    let raw = id.as_str();
    let skip = raw.chars().count().saturating_sub(5);
    let tail: String = raw.chars().skip(skip).collect();
    format!("Unknown({tail})")
}

fn team_name_or_unknown(store: &dyn EntityStore, id: &Id) -> PickemResult<String> {
    Ok(store.team(id)?.map(|t| t.name).unwrap_or_else(|| unknown_team(id)))
}

/// A member's bonus picks with names resolved, in winner / advancers / MVP order.
pub fn my_bonuses(store: &dyn EntityStore, discord_id: &str) -> PickemResult<Vec<BonusLine>> {
    let Some(user) = store.find_user_by_discord_id(discord_id)? else {
        return Ok(Vec::new());
    };
    let mut picks = store.bonus_predictions_for_user(&user.id)?;
    picks.sort_by_key(|b| match b.kind() {
        BonusType::WorldsWinner => 0,
        BonusType::GroupsAdvancers => 1,
        BonusType::Mvp => 2,
    });

    let mut lines = Vec::with_capacity(picks.len());
    for bonus in picks {
        let selections = match &bonus.pick {
            BonusPick::WorldsWinner([team]) => vec![team_name_or_unknown(store, team)?],
            BonusPick::GroupsAdvancers(teams) => teams
                .iter()
                .map(|id| team_name_or_unknown(store, id))
                .collect::<PickemResult<Vec<_>>>()?,
            BonusPick::Mvp([selection]) => {
                let rostered = match &selection.player_id {
                    Some(id) => store.player(id)?.map(|p| p.name),
                    None => None,
                };
                vec![rostered.unwrap_or_else(|| selection.name.clone())]
            }
        };
        lines.push(BonusLine {
            kind: bonus.kind(),
            selections,
            lock_at: bonus.lock_at,
            points: bonus.points,
        });
    }
    Ok(lines)
}

/// Matches by status bucket and optional phase, earliest start first.
pub fn list_matches(
    store: &dyn EntityStore,
    filter: MatchFilter,
    phase: Option<MatchPhase>,
) -> PickemResult<Vec<MatchSummary>> {
    let mut records: Vec<Match> = store
        .matches()?
        .into_iter()
        .filter(|m| match filter {
            MatchFilter::Upcoming => !m.is_completed(),
            MatchFilter::Completed => m.is_completed(),
            MatchFilter::All => true,
        })
        .filter(|m| phase.map_or(true, |p| m.phase == p))
        .collect();
    records.sort_by_key(|m| m.start_time);
    Ok(records.iter().map(|m| summarize_match(store, m)).collect())
}

/// Every team with its players, both sorted by name.
pub fn team_rosters(store: &dyn EntityStore) -> PickemResult<Vec<TeamRoster>> {
    let mut teams = store.teams()?;
    teams.sort_by_key(|t| t.name.to_lowercase());
    let mut rosters = Vec::with_capacity(teams.len());
    for team in teams {
        let mut players = store.players_for_team(&team.id)?;
        players.sort_by_key(|p| p.name.to_lowercase());
        rosters.push(TeamRoster { team, players });
    }
    Ok(rosters)
}
