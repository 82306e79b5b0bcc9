use tracing::info;

use crate::config::{normalize_name, parse_instant, split_name_list};
use crate::error::{PickemError, PickemResult, StoreError};
use crate::lock_clock::lock_instant_for;
use crate::phase_gate;
use crate::scoring::{score_match, team_label};
use crate::store::EntityStore;
use crate::types::*;

// ── Name resolution ────────────────────────────────────────────────────

pub fn resolve_team(store: &dyn EntityStore, name: &str) -> PickemResult<Team> {
    store
        .find_team_by_name(name)?
        .ok_or_else(|| PickemError::TeamNotFound(name.trim().to_string()))
}

/// Resolve a comma-separated list of team names. Unknown names fail the whole
/// list; repeated teams collapse to their first occurrence.
pub fn resolve_teams(store: &dyn EntityStore, raw: &str) -> PickemResult<Vec<Team>> {
    let names = split_name_list(raw);
    if names.is_empty() {
        return Err(PickemError::EmptySelection);
    }

    let mut teams: Vec<Team> = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match store.find_team_by_name(&name)? {
            Some(team) => {
                if !teams.iter().any(|t| t.id == team.id) {
                    teams.push(team);
                }
            }
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        return Err(PickemError::TeamsNotFound(missing));
    }
    Ok(teams)
}

fn resolve_pair(store: &dyn EntityStore, team_a: &str, team_b: &str) -> PickemResult<(Team, Team)> {
    if normalize_name(team_a) == normalize_name(team_b) {
        return Err(PickemError::SameTeams);
    }
    Ok((resolve_team(store, team_a)?, resolve_team(store, team_b)?))
}

pub fn resolve_match(store: &dyn EntityStore, target: &MatchRef) -> PickemResult<Match> {
    match target {
        MatchRef::ById(raw) => store
            .get_match(&Id::from(raw.as_str()))?
            .ok_or_else(|| PickemError::MatchNotFound(raw.trim().to_string())),
        MatchRef::ByTeams { team_a, team_b, start } => {
            if [team_a, team_b, start].iter().any(|s| s.trim().is_empty()) {
                return Err(PickemError::Invalid(
                    "provide a match id or all of team A, team B and start".to_string(),
                ));
            }
            let team_a = resolve_team(store, team_a)?;
            let team_b = resolve_team(store, team_b)?;
            let start_time = parse_instant(start)?;
            store
                .find_match(&team_a.id, &team_b.id, start_time)?
                .ok_or_else(|| {
                    PickemError::MatchNotFound(format!(
                        "{} vs {} at {}",
                        team_a.name,
                        team_b.name,
                        start_time.to_rfc3339()
                    ))
                })
        }
    }
}

// ── Teams & players ────────────────────────────────────────────────────

pub fn add_team(store: &mut dyn EntityStore, name: &str, region: &str) -> PickemResult<Team> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PickemError::Invalid("team name is empty".to_string()));
    }
    if store.find_team_by_name(name)?.is_some() {
        return Err(PickemError::DuplicateTeam(name.to_string()));
    }
    let team = store.insert_team(name, region).map_err(|e| match e {
        StoreError::Duplicate { .. } => PickemError::DuplicateTeam(name.to_string()),
        other => other.into(),
    })?;
    info!("team added: {} ({})", team.name, team.region);
    Ok(team)
}

pub fn add_player(store: &mut dyn EntityStore, name: &str, role: &str, team_name: &str) -> PickemResult<Player> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PickemError::Invalid("player name is empty".to_string()));
    }
    let team = resolve_team(store, team_name)?;
    let duplicate = || PickemError::DuplicatePlayer {
        player: name.to_string(),
        team: team.name.clone(),
    };
    if store.find_team_player(name, &team.id)?.is_some() {
        return Err(duplicate());
    }
    let player = store.insert_player(name, role, &team.id).map_err(|e| match e {
        StoreError::Duplicate { .. } => duplicate(),
        other => other.into(),
    })?;
    info!("player added: {} ({}) to {}", player.name, player.role, team.name);
    Ok(player)
}

pub fn remove_player(store: &mut dyn EntityStore, target: &PlayerRef) -> PickemResult<Player> {
    let player = match target {
        PlayerRef::ById(raw) => store
            .player(&Id::from(raw.as_str()))?
            .ok_or_else(|| PickemError::PlayerNotFound(raw.trim().to_string()))?,
        PlayerRef::ByName { name, team } => {
            let team = resolve_team(store, team)?;
            store
                .find_team_player(name, &team.id)?
                .ok_or_else(|| PickemError::PlayerNotFound(format!("{} in {}", name.trim(), team.name)))?
        }
    };
    if !store.delete_player(&player.id)? {
        return Err(PickemError::PlayerNotFound(player.id.to_string()));
    }
    info!("player removed: {} ({})", player.name, player.id);
    Ok(player)
}

/// Delete a team and its roster. Matches that reference it block the removal
/// unless `force`, in which case they go too, along with their predictions.
pub fn remove_team(store: &mut dyn EntityStore, name: &str, force: bool) -> PickemResult<TeamRemoval> {
    let team = resolve_team(store, name)?;
    let match_ids: Vec<Id> = store
        .matches()?
        .into_iter()
        .filter(|m| m.involves(&team.id))
        .map(|m| m.id)
        .collect();

    if !match_ids.is_empty() && !force {
        return Err(PickemError::TeamInUse {
            team: team.name,
            matches: match_ids.len(),
            players: store.players_for_team(&team.id)?.len(),
        });
    }

    let predictions_removed = if match_ids.is_empty() {
        0
    } else {
        store.delete_predictions_for_matches(&match_ids)?
    };
    let matches_removed = if match_ids.is_empty() {
        0
    } else {
        store.delete_matches(&match_ids)?
    };
    let players_removed = store.delete_players_for_team(&team.id)?;
    store.delete_team(&team.id)?;

    info!(
        "team removed: {} ({} player(s), {} match(es), {} prediction(s))",
        team.name, players_removed, matches_removed, predictions_removed
    );
    Ok(TeamRemoval {
        team: team.name,
        players_removed,
        matches_removed,
        predictions_removed,
    })
}

// ── Matches ────────────────────────────────────────────────────────────

pub fn add_match(
    store: &mut dyn EntityStore,
    team_a: &str,
    team_b: &str,
    start: &str,
    phase: MatchPhase,
    best_of: Option<i64>,
) -> PickemResult<Match> {
    let (team_a, team_b) = resolve_pair(store, team_a, team_b)?;
    let start_time = parse_instant(start)?;
    let best_of = match best_of {
        None => MIN_BEST_OF,
        Some(n) if (MIN_BEST_OF as i64..=MAX_BEST_OF as i64).contains(&n) => n as u8,
        Some(n) => {
            return Err(PickemError::InvalidBestOf {
                got: n,
                min: MIN_BEST_OF,
                max: MAX_BEST_OF,
            })
        }
    };
    if store.find_match(&team_a.id, &team_b.id, start_time)?.is_some() {
        return Err(PickemError::DuplicateMatch);
    }

    let record = Match {
        id: Id::generate(),
        team_a: team_a.id,
        team_b: team_b.id,
        start_time,
        phase,
        best_of,
        lock_at: lock_instant_for(start_time),
        score_a: None,
        score_b: None,
        status: MatchStatus::Scheduled,
    };
    let record = store.insert_match(record).map_err(|e| match e {
        StoreError::Duplicate { .. } => PickemError::DuplicateMatch,
        other => other.into(),
    })?;
    info!(
        "match added: {} vs {} ({}, Bo{}) starts {} locks {}",
        team_a.name,
        team_b.name,
        phase.as_str(),
        best_of,
        record.start_time.to_rfc3339(),
        record.lock_at.to_rfc3339()
    );
    Ok(record)
}

/// Delete a match and its predictions. Points already awarded stay on user totals.
pub fn remove_match(store: &mut dyn EntityStore, target: &MatchRef) -> PickemResult<MatchRemoval> {
    let record = resolve_match(store, target)?;
    let ids = [record.id.clone()];
    let predictions_removed = store.delete_predictions_for_matches(&ids)?;
    let matches_removed = store.delete_matches(&ids)?;
    info!(
        "match removed: {} ({} prediction(s))",
        record.id, predictions_removed
    );
    Ok(MatchRemoval {
        match_id: record.id,
        matches_removed,
        predictions_removed,
    })
}

/// Record the final score and settle every prediction on the match. Declaring
/// again with a corrected score applies only the difference.
pub fn declare_result(
    store: &mut dyn EntityStore,
    target: &MatchRef,
    score_a: i64,
    score_b: i64,
) -> PickemResult<ScoringReport> {
    let (a, b) = match (u32::try_from(score_a), u32::try_from(score_b)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return Err(PickemError::NegativeScore { score_a, score_b }),
    };
    let mut record = resolve_match(store, target)?;
    record.score_a = Some(a);
    record.score_b = Some(b);
    record.status = MatchStatus::Completed;
    store.update_match(&record)?;
    info!(
        "result recorded: {} {}-{} {}",
        team_label(store, &record.team_a),
        a,
        b,
        team_label(store, &record.team_b)
    );
    score_match(store, &record)
}

/// Force a match's status. Completed matches are final.
pub fn set_match_lock(store: &mut dyn EntityStore, target: &MatchRef, action: LockAction) -> PickemResult<Match> {
    let mut record = resolve_match(store, target)?;
    if record.is_completed() {
        return Err(PickemError::MatchCompleted);
    }
    record.status = match action {
        LockAction::Lock => MatchStatus::Locked,
        LockAction::Unlock => MatchStatus::Scheduled,
    };
    store.update_match(&record)?;
    info!("match {} status forced to {:?}", record.id, record.status);
    Ok(record)
}

pub fn set_phase(store: &mut dyn EntityStore, raw: &str) -> PickemResult<PhaseRecord> {
    let phase = raw.parse::<TournamentPhase>().map_err(PickemError::Invalid)?;
    phase_gate::set_phase(store, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, Fixture};

    #[test]
    fn duplicate_team_names_are_refused() {
        let mut fx = Fixture::new();
        assert!(matches!(
            add_team(&mut fx.store, " t1 ", "KR"),
            Err(PickemError::DuplicateTeam(_))
        ));
        let added = add_team(&mut fx.store, "FNC", "EU").unwrap();
        assert_eq!(added.name, "FNC");
    }

    #[test]
    fn players_are_unique_within_a_team() {
        let mut fx = Fixture::new();
        assert!(matches!(
            add_player(&mut fx.store, "faker", "mid", "T1"),
            Err(PickemError::DuplicatePlayer { .. })
        ));
        assert!(add_player(&mut fx.store, "Faker", "mid", "G2").is_ok());
        assert!(matches!(
            add_player(&mut fx.store, "Zeus", "top", "HLE"),
            Err(PickemError::TeamNotFound(_))
        ));
    }

    #[test]
    fn remove_player_by_name_or_id() {
        let mut fx = Fixture::new();
        let removed = remove_player(
            &mut fx.store,
            &PlayerRef::ByName {
                name: "keria".into(),
                team: "t1".into(),
            },
        )
        .unwrap();
        assert_eq!(removed.name, "Keria");

        let caps = fx.store.find_player_by_name("Caps").unwrap().unwrap();
        remove_player(&mut fx.store, &PlayerRef::ById(caps.id.to_string())).unwrap();
        assert!(matches!(
            remove_player(&mut fx.store, &PlayerRef::ById(caps.id.to_string())),
            Err(PickemError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn add_match_validates_and_derives_lock() {
        let mut fx = Fixture::new();
        let record = add_match(&mut fx.store, "T1", "G2", "2025-10-14T12:00:00Z", MatchPhase::GroupStage, None).unwrap();
        assert_eq!(record.best_of, 1);
        assert_eq!(record.lock_at, at(14, 10));
        assert_eq!(record.status, MatchStatus::Scheduled);

        assert!(matches!(
            add_match(&mut fx.store, "T1", "G2", "2025-10-14T12:00:00Z", MatchPhase::GroupStage, None),
            Err(PickemError::DuplicateMatch)
        ));
        assert!(matches!(
            add_match(&mut fx.store, "T1", "t1", "2025-10-14T12:00:00Z", MatchPhase::GroupStage, None),
            Err(PickemError::SameTeams)
        ));
        assert!(matches!(
            add_match(&mut fx.store, "T1", "GEN", "next tuesday", MatchPhase::GroupStage, None),
            Err(PickemError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            add_match(&mut fx.store, "T1", "GEN", "2025-10-15T12:00:00Z", MatchPhase::Finals, Some(9)),
            Err(PickemError::InvalidBestOf { got: 9, .. })
        ));
        let bo5 = add_match(&mut fx.store, "T1", "GEN", "2025-10-15T12:00:00Z", MatchPhase::Finals, Some(5)).unwrap();
        assert_eq!(bo5.best_of, 5);
    }

    #[test]
    fn remove_team_requires_force_when_referenced() {
        let mut fx = Fixture::new();
        let first = fx.add_match("T1", "G2", at(14, 12), MatchPhase::GroupStage);
        let second = fx.add_match("GEN", "T1", at(15, 12), MatchPhase::GroupStage);
        let untouched = fx.add_match("GEN", "TES", at(16, 12), MatchPhase::GroupStage);
        fx.predict("alice", &first, 1, 0);
        fx.predict("bob", &first, 0, 1);
        fx.predict("alice", &second, 1, 0);
        fx.predict("alice", &untouched, 1, 0);

        assert!(matches!(
            remove_team(&mut fx.store, "T1", false),
            Err(PickemError::TeamInUse { matches: 2, players: 2, .. })
        ));

        let removal = remove_team(&mut fx.store, "T1", true).unwrap();
        assert_eq!(
            removal,
            TeamRemoval {
                team: "T1".into(),
                players_removed: 2,
                matches_removed: 2,
                predictions_removed: 3,
            }
        );
        assert!(fx.store.find_team_by_name("T1").unwrap().is_none());
        assert!(fx.store.find_player_by_name("Faker").unwrap().is_none());
        assert_eq!(fx.store.matches().unwrap().len(), 1);
        assert_eq!(fx.store.predictions_for_match(&untouched.id).unwrap().len(), 1);
    }

    #[test]
    fn unreferenced_team_is_removed_without_force() {
        let mut fx = Fixture::new();
        let removal = remove_team(&mut fx.store, "DRX", false).unwrap();
        assert_eq!(removal.matches_removed, 0);
        assert_eq!(removal.players_removed, 0);
    }

    #[test]
    fn declare_result_by_triple_settles_and_redeclares() {
        let mut fx = Fixture::new();
        let record = fx.add_match("T1", "G2", at(14, 12), MatchPhase::GroupStage);
        let alice = fx.predict("alice", &record, 2, 1);
        let target = MatchRef::ByTeams {
            team_a: "t1".into(),
            team_b: "g2".into(),
            start: "2025-10-14T12:00:00Z".into(),
        };

        let report = declare_result(&mut fx.store, &target, 3, 1).unwrap();
        assert_eq!(report.awarded, 1);
        assert_eq!(report.team_a, "T1");

        let report = declare_result(&mut fx.store, &MatchRef::ById(record.id.to_string()), 2, 1).unwrap();
        assert_eq!(report.awarded, 1);
        assert_eq!(fx.user_by_id(&alice).total_points, 2);

        let stored = fx.store.get_match(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Completed);
        assert_eq!(stored.final_score(), Some((2, 1)));
    }

    #[test]
    fn declare_result_rejects_negative_scores_and_unknown_matches() {
        let mut fx = Fixture::new();
        let record = fx.add_match("T1", "G2", at(14, 12), MatchPhase::GroupStage);
        assert!(matches!(
            declare_result(&mut fx.store, &MatchRef::ById(record.id.to_string()), -1, 0),
            Err(PickemError::NegativeScore { .. })
        ));
        assert!(matches!(
            declare_result(&mut fx.store, &MatchRef::ById("nope".into()), 1, 0),
            Err(PickemError::MatchNotFound(ref id)) if id == "nope"
        ));
    }

    #[test]
    fn lock_toggle_refuses_completed_matches() {
        let mut fx = Fixture::new();
        let record = fx.add_match("T1", "G2", at(14, 12), MatchPhase::GroupStage);
        let target = MatchRef::ById(record.id.to_string());
        assert_eq!(set_match_lock(&mut fx.store, &target, LockAction::Lock).unwrap().status, MatchStatus::Locked);
        assert_eq!(
            set_match_lock(&mut fx.store, &target, LockAction::Unlock).unwrap().status,
            MatchStatus::Scheduled
        );
        declare_result(&mut fx.store, &target, 1, 0).unwrap();
        assert!(matches!(
            set_match_lock(&mut fx.store, &target, LockAction::Unlock),
            Err(PickemError::MatchCompleted)
        ));
    }

    #[test]
    fn remove_match_keeps_awarded_points() {
        let mut fx = Fixture::new();
        let record = fx.add_match("T1", "G2", at(14, 12), MatchPhase::GroupStage);
        let alice = fx.predict("alice", &record, 1, 0);
        let target = MatchRef::ById(record.id.to_string());
        declare_result(&mut fx.store, &target, 1, 0).unwrap();

        let removal = remove_match(&mut fx.store, &target).unwrap();
        assert_eq!(removal.matches_removed, 1);
        assert_eq!(removal.predictions_removed, 1);
        assert_eq!(fx.user_by_id(&alice).total_points, 2);
    }

    #[test]
    fn advancer_names_resolve_all_or_nothing() {
        let fx = Fixture::new();
        let teams = resolve_teams(&fx.store, "t1, G2 ,T1,,gen").unwrap();
        let names: Vec<_> = teams.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["T1", "G2", "GEN"]);
        assert!(matches!(resolve_teams(&fx.store, " , "), Err(PickemError::EmptySelection)));
    }

    #[test]
    fn set_phase_parses_the_value() {
        let mut fx = Fixture::new();
        assert_eq!(set_phase(&mut fx.store, "closed").unwrap().current, TournamentPhase::Closed);
        assert!(matches!(set_phase(&mut fx.store, "playoffs"), Err(PickemError::Invalid(_))));
    }
}
