use crate::config::normalize_name;
use crate::error::{StoreError, StoreResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The data-store seam. Every call is atomic for the record(s) it names; nothing
/// spans calls, so callers treat a failure between two calls as a partial write.
pub trait EntityStore {
    // teams
    fn insert_team(&mut self, name: &str, region: &str) -> StoreResult<Team>;
    fn team(&self, id: &Id) -> StoreResult<Option<Team>>;
    fn find_team_by_name(&self, name: &str) -> StoreResult<Option<Team>>;
    fn teams(&self) -> StoreResult<Vec<Team>>;
    fn delete_team(&mut self, id: &Id) -> StoreResult<bool>;

    // players
    fn insert_player(&mut self, name: &str, role: &str, team: &Id) -> StoreResult<Player>;
    fn player(&self, id: &Id) -> StoreResult<Option<Player>>;
    fn find_player_by_name(&self, name: &str) -> StoreResult<Option<Player>>;
    fn find_team_player(&self, name: &str, team: &Id) -> StoreResult<Option<Player>>;
    fn players_for_team(&self, team: &Id) -> StoreResult<Vec<Player>>;
    fn delete_player(&mut self, id: &Id) -> StoreResult<bool>;
    fn delete_players_for_team(&mut self, team: &Id) -> StoreResult<usize>;

    // matches
    fn insert_match(&mut self, record: Match) -> StoreResult<Match>;
    fn get_match(&self, id: &Id) -> StoreResult<Option<Match>>;
    fn find_match(&self, team_a: &Id, team_b: &Id, start: DateTime<Utc>) -> StoreResult<Option<Match>>;
    fn matches(&self) -> StoreResult<Vec<Match>>;
    fn update_match(&mut self, record: &Match) -> StoreResult<()>;
    fn delete_matches(&mut self, ids: &[Id]) -> StoreResult<usize>;

    // predictions
    /// Insert or overwrite the guess for `(user, match)`. The bool is true on insert.
    fn upsert_prediction(
        &mut self,
        user: &Id,
        match_id: &Id,
        score_a: u32,
        score_b: u32,
    ) -> StoreResult<(Prediction, bool)>;
    fn predictions_for_match(&self, match_id: &Id) -> StoreResult<Vec<Prediction>>;
    fn predictions_for_user(&self, user: &Id) -> StoreResult<Vec<Prediction>>;
    fn set_prediction_points(&mut self, id: &Id, points: i64) -> StoreResult<()>;
    fn delete_predictions_for_matches(&mut self, match_ids: &[Id]) -> StoreResult<usize>;

    // bonus predictions
    fn bonus_prediction(&self, user: &Id, kind: BonusType) -> StoreResult<Option<BonusPrediction>>;
    fn bonus_predictions_of(&self, kind: BonusType) -> StoreResult<Vec<BonusPrediction>>;
    fn bonus_predictions_for_user(&self, user: &Id) -> StoreResult<Vec<BonusPrediction>>;
    /// Upsert keyed by `(user, type)`: an existing record keeps its id and points.
    fn save_bonus_prediction(&mut self, record: BonusPrediction) -> StoreResult<BonusPrediction>;
    fn set_bonus_points(&mut self, id: &Id, points: i64) -> StoreResult<()>;

    // users
    fn user(&self, id: &Id) -> StoreResult<Option<User>>;
    fn find_user_by_discord_id(&self, discord_id: &str) -> StoreResult<Option<User>>;
    fn find_or_create_user(&mut self, discord_id: &str, username: &str) -> StoreResult<User>;
    /// Materialize a placeholder record under an internal id that has no user yet.
    fn ensure_user(&mut self, id: &Id) -> StoreResult<User>;
    fn users(&self) -> StoreResult<Vec<User>>;
    /// Add to a user's running totals. Fails with `Missing` when the user is gone.
    fn add_user_totals(&mut self, id: &Id, total: i64, phases: &PhasePoints) -> StoreResult<User>;
    fn delete_user(&mut self, id: &Id) -> StoreResult<bool>;

    // phase singleton
    fn phase(&self) -> StoreResult<Option<PhaseRecord>>;
    fn set_phase(&mut self, current: TournamentPhase) -> StoreResult<PhaseRecord>;

    fn add_user_points(&mut self, id: &Id, delta: i64, phase: Option<MatchPhase>) -> StoreResult<User> {
        let mut phases = PhasePoints::default();
        if let Some(phase) = phase {
            phases.add(phase, delta);
        }
        self.add_user_totals(id, delta, &phases)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub predictions: Vec<Prediction>,
    pub bonus_predictions: Vec<BonusPrediction>,
    pub users: Vec<User>,
    pub phase: Option<PhaseRecord>,
}

/// In-memory collections, optionally mirrored to a pretty-printed JSON file after
/// every successful mutation.
#[derive(Debug, Default)]
pub struct JsonStore {
    path: Option<PathBuf>,
    data: Snapshot,
}

impl JsonStore {
    pub fn in_memory() -> Self {
        JsonStore::default()
    }

    pub fn open(path: &Path) -> StoreResult<Self> {
        let data = if path.is_file() {
            let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<Snapshot>(&raw)?
        } else {
            Snapshot::default()
        };
        Ok(JsonStore {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    /// Apply `change` to a copy of the data and write that copy out; memory only
    /// moves forward once the write succeeds. `change` must fail before mutating.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Snapshot) -> StoreResult<T>) -> StoreResult<T> {
        if self.path.is_none() {
            return change(&mut self.data);
        }
        let mut next = self.data.clone();
        let out = change(&mut next)?;
        self.write_snapshot(&next)?;
        self.data = next;
        Ok(out)
    }

    fn write_snapshot(&self, data: &Snapshot) -> StoreResult<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let write_err = |source| StoreError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let payload = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)?;
        debug!("store snapshot written to {}", path.display());
        Ok(())
    }

    fn team_name_taken(&self, name: &str) -> bool {
        let key = normalize_name(name);
        self.data.teams.iter().any(|t| normalize_name(&t.name) == key)
    }
}

impl EntityStore for JsonStore {
    fn insert_team(&mut self, name: &str, region: &str) -> StoreResult<Team> {
        if self.team_name_taken(name) {
            return Err(StoreError::Duplicate {
                collection: "teams",
                key: name.to_string(),
            });
        }
        let team = Team {
            id: Id::generate(),
            name: name.trim().to_string(),
            region: region.trim().to_string(),
        };
        self.commit(|data| {
            data.teams.push(team.clone());
            Ok(team)
        })
    }

    fn team(&self, id: &Id) -> StoreResult<Option<Team>> {
        Ok(self.data.teams.iter().find(|t| &t.id == id).cloned())
    }

    fn find_team_by_name(&self, name: &str) -> StoreResult<Option<Team>> {
        let key = normalize_name(name);
        Ok(self.data.teams.iter().find(|t| normalize_name(&t.name) == key).cloned())
    }

    fn teams(&self) -> StoreResult<Vec<Team>> {
        Ok(self.data.teams.clone())
    }

    fn delete_team(&mut self, id: &Id) -> StoreResult<bool> {
        if !self.data.teams.iter().any(|t| &t.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            data.teams.retain(|t| &t.id != id);
            Ok(true)
        })
    }

    fn insert_player(&mut self, name: &str, role: &str, team: &Id) -> StoreResult<Player> {
        if self.find_team_player(name, team)?.is_some() {
            return Err(StoreError::Duplicate {
                collection: "players",
                key: format!("{}@{team}", name.trim()),
            });
        }
        let player = Player {
            id: Id::generate(),
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            team: team.clone(),
        };
        self.commit(|data| {
            data.players.push(player.clone());
            Ok(player)
        })
    }

    fn player(&self, id: &Id) -> StoreResult<Option<Player>> {
        Ok(self.data.players.iter().find(|p| &p.id == id).cloned())
    }

    fn find_player_by_name(&self, name: &str) -> StoreResult<Option<Player>> {
        let key = normalize_name(name);
        Ok(self.data.players.iter().find(|p| normalize_name(&p.name) == key).cloned())
    }

    fn find_team_player(&self, name: &str, team: &Id) -> StoreResult<Option<Player>> {
        let key = normalize_name(name);
        Ok(self
            .data
            .players
            .iter()
            .find(|p| &p.team == team && normalize_name(&p.name) == key)
            .cloned())
    }

    fn players_for_team(&self, team: &Id) -> StoreResult<Vec<Player>> {
        Ok(self.data.players.iter().filter(|p| &p.team == team).cloned().collect())
    }

    fn delete_player(&mut self, id: &Id) -> StoreResult<bool> {
        if !self.data.players.iter().any(|p| &p.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            data.players.retain(|p| &p.id != id);
            Ok(true)
        })
    }

    fn delete_players_for_team(&mut self, team: &Id) -> StoreResult<usize> {
        let doomed = self.data.players.iter().filter(|p| &p.team == team).count();
        if doomed == 0 {
            return Ok(0);
        }
        self.commit(|data| {
            data.players.retain(|p| &p.team != team);
            Ok(doomed)
        })
    }

    fn insert_match(&mut self, record: Match) -> StoreResult<Match> {
        if self.find_match(&record.team_a, &record.team_b, record.start_time)?.is_some() {
            return Err(StoreError::Duplicate {
                collection: "matches",
                key: format!("{}|{}|{}", record.team_a, record.team_b, record.start_time.to_rfc3339()),
            });
        }
        if self.data.matches.iter().any(|m| m.id == record.id) {
            return Err(StoreError::Duplicate {
                collection: "matches",
                key: record.id.to_string(),
            });
        }
        self.commit(|data| {
            data.matches.push(record.clone());
            Ok(record)
        })
    }

    fn get_match(&self, id: &Id) -> StoreResult<Option<Match>> {
        Ok(self.data.matches.iter().find(|m| &m.id == id).cloned())
    }

    fn find_match(&self, team_a: &Id, team_b: &Id, start: DateTime<Utc>) -> StoreResult<Option<Match>> {
        Ok(self
            .data
            .matches
            .iter()
            .find(|m| &m.team_a == team_a && &m.team_b == team_b && m.start_time == start)
            .cloned())
    }

    fn matches(&self) -> StoreResult<Vec<Match>> {
        Ok(self.data.matches.clone())
    }

    fn update_match(&mut self, record: &Match) -> StoreResult<()> {
        self.commit(|data| {
            let slot = data
                .matches
                .iter_mut()
                .find(|m| m.id == record.id)
                .ok_or_else(|| StoreError::Missing {
                    collection: "matches",
                    id: record.id.to_string(),
                })?;
            *slot = record.clone();
            Ok(())
        })
    }

    fn delete_matches(&mut self, ids: &[Id]) -> StoreResult<usize> {
        let doomed = self.data.matches.iter().filter(|m| ids.contains(&m.id)).count();
        if doomed == 0 {
            return Ok(0);
        }
        self.commit(|data| {
            data.matches.retain(|m| !ids.contains(&m.id));
            Ok(doomed)
        })
    }

    fn upsert_prediction(
        &mut self,
        user: &Id,
        match_id: &Id,
        score_a: u32,
        score_b: u32,
    ) -> StoreResult<(Prediction, bool)> {
        self.commit(|data| {
            let existing = data
                .predictions
                .iter_mut()
                .find(|p| &p.user == user && &p.match_id == match_id);
            if let Some(prediction) = existing {
                prediction.score_a = score_a;
                prediction.score_b = score_b;
                return Ok((prediction.clone(), false));
            }
            let prediction = Prediction {
                id: Id::generate(),
                user: user.clone(),
                match_id: match_id.clone(),
                score_a,
                score_b,
                points: 0,
            };
            data.predictions.push(prediction.clone());
            Ok((prediction, true))
        })
    }

    fn predictions_for_match(&self, match_id: &Id) -> StoreResult<Vec<Prediction>> {
        Ok(self
            .data
            .predictions
            .iter()
            .filter(|p| &p.match_id == match_id)
            .cloned()
            .collect())
    }

    fn predictions_for_user(&self, user: &Id) -> StoreResult<Vec<Prediction>> {
        Ok(self.data.predictions.iter().filter(|p| &p.user == user).cloned().collect())
    }

    fn set_prediction_points(&mut self, id: &Id, points: i64) -> StoreResult<()> {
        self.commit(|data| {
            let prediction = data
                .predictions
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| StoreError::Missing {
                    collection: "predictions",
                    id: id.to_string(),
                })?;
            prediction.points = points;
            Ok(())
        })
    }

    fn delete_predictions_for_matches(&mut self, match_ids: &[Id]) -> StoreResult<usize> {
        let doomed = self
            .data
            .predictions
            .iter()
            .filter(|p| match_ids.contains(&p.match_id))
            .count();
        if doomed == 0 {
            return Ok(0);
        }
        self.commit(|data| {
            data.predictions.retain(|p| !match_ids.contains(&p.match_id));
            Ok(doomed)
        })
    }

    fn bonus_prediction(&self, user: &Id, kind: BonusType) -> StoreResult<Option<BonusPrediction>> {
        Ok(self
            .data
            .bonus_predictions
            .iter()
            .find(|b| &b.user == user && b.kind() == kind)
            .cloned())
    }

    fn bonus_predictions_of(&self, kind: BonusType) -> StoreResult<Vec<BonusPrediction>> {
        Ok(self
            .data
            .bonus_predictions
            .iter()
            .filter(|b| b.kind() == kind)
            .cloned()
            .collect())
    }

    fn bonus_predictions_for_user(&self, user: &Id) -> StoreResult<Vec<BonusPrediction>> {
        Ok(self
            .data
            .bonus_predictions
            .iter()
            .filter(|b| &b.user == user)
            .cloned()
            .collect())
    }

    fn save_bonus_prediction(&mut self, record: BonusPrediction) -> StoreResult<BonusPrediction> {
        let kind = record.kind();
        self.commit(|data| {
            let existing = data
                .bonus_predictions
                .iter_mut()
                .find(|b| b.user == record.user && b.kind() == kind);
            if let Some(slot) = existing {
                slot.pick = record.pick;
                slot.lock_at = record.lock_at;
                return Ok(slot.clone());
            }
            data.bonus_predictions.push(record.clone());
            Ok(record)
        })
    }

    fn set_bonus_points(&mut self, id: &Id, points: i64) -> StoreResult<()> {
        self.commit(|data| {
            let bonus = data
                .bonus_predictions
                .iter_mut()
                .find(|b| &b.id == id)
                .ok_or_else(|| StoreError::Missing {
                    collection: "bonuspredictions",
                    id: id.to_string(),
                })?;
            bonus.points = points;
            Ok(())
        })
    }

    fn user(&self, id: &Id) -> StoreResult<Option<User>> {
        Ok(self.data.users.iter().find(|u| &u.id == id).cloned())
    }

    fn find_user_by_discord_id(&self, discord_id: &str) -> StoreResult<Option<User>> {
        Ok(self.data.users.iter().find(|u| u.discord_id == discord_id).cloned())
    }

    fn find_or_create_user(&mut self, discord_id: &str, username: &str) -> StoreResult<User> {
        if let Some(existing) = self.find_user_by_discord_id(discord_id)? {
            return Ok(existing);
        }
        let user = User {
            id: Id::generate(),
            discord_id: discord_id.to_string(),
            username: username.to_string(),
            total_points: 0,
            phase_points: PhasePoints::default(),
        };
        self.commit(|data| {
            data.users.push(user.clone());
            Ok(user)
        })
    }

    fn ensure_user(&mut self, id: &Id) -> StoreResult<User> {
        if let Some(existing) = self.user(id)? {
            return Ok(existing);
        }
        let user = User {
            id: id.clone(),
            discord_id: id.to_string(),
            username: "unknown".to_string(),
            total_points: 0,
            phase_points: PhasePoints::default(),
        };
        self.commit(|data| {
            data.users.push(user.clone());
            Ok(user)
        })
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.data.users.clone())
    }

    fn add_user_totals(&mut self, id: &Id, total: i64, phases: &PhasePoints) -> StoreResult<User> {
        self.commit(|data| {
            let user = data
                .users
                .iter_mut()
                .find(|u| &u.id == id)
                .ok_or_else(|| StoreError::Missing {
                    collection: "users",
                    id: id.to_string(),
                })?;
            user.total_points += total;
            user.phase_points.absorb(phases);
            Ok(user.clone())
        })
    }

    fn delete_user(&mut self, id: &Id) -> StoreResult<bool> {
        if !self.data.users.iter().any(|u| &u.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            data.users.retain(|u| &u.id != id);
            Ok(true)
        })
    }

    fn phase(&self) -> StoreResult<Option<PhaseRecord>> {
        Ok(self.data.phase)
    }

    fn set_phase(&mut self, current: TournamentPhase) -> StoreResult<PhaseRecord> {
        let record = PhaseRecord { current };
        self.commit(|data| {
            data.phase = Some(record);
            Ok(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{block_writes, temp_store_path, unblock_writes};
    use chrono::TimeZone;

    fn make_match(team_a: &Id, team_b: &Id, hour: u32) -> Match {
        let start = Utc.with_ymd_and_hms(2025, 10, 14, hour, 0, 0).unwrap();
        Match {
            id: Id::generate(),
            team_a: team_a.clone(),
            team_b: team_b.clone(),
            start_time: start,
            phase: MatchPhase::GroupStage,
            best_of: 1,
            lock_at: start - chrono::Duration::hours(LOCK_OFFSET_HOURS),
            score_a: None,
            score_b: None,
            status: MatchStatus::Scheduled,
        }
    }

    #[test]
    fn team_names_are_unique_ignoring_case() {
        let mut store = JsonStore::in_memory();
        store.insert_team("T1", "KR").unwrap();
        let err = store.insert_team(" t1 ", "KR").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { collection: "teams", .. }));
        assert_eq!(store.find_team_by_name("T1").unwrap().unwrap().region, "KR");
    }

    #[test]
    fn match_triple_is_unique() {
        let mut store = JsonStore::in_memory();
        let a = store.insert_team("T1", "KR").unwrap();
        let b = store.insert_team("G2", "EU").unwrap();
        store.insert_match(make_match(&a.id, &b.id, 12)).unwrap();
        assert!(store.insert_match(make_match(&a.id, &b.id, 12)).is_err());
        assert!(store.insert_match(make_match(&a.id, &b.id, 15)).is_ok());
    }

    #[test]
    fn second_prediction_updates_the_first() {
        let mut store = JsonStore::in_memory();
        let user = store.find_or_create_user("111", "alice").unwrap();
        let match_id = Id::generate();
        let (first, created) = store.upsert_prediction(&user.id, &match_id, 1, 0).unwrap();
        assert!(created);
        store.set_prediction_points(&first.id, 2).unwrap();
        let (second, created) = store.upsert_prediction(&user.id, &match_id, 0, 1).unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.points, 2);
        assert_eq!(store.predictions_for_match(&match_id).unwrap().len(), 1);
    }

    #[test]
    fn find_or_create_user_returns_existing() {
        let mut store = JsonStore::in_memory();
        let first = store.find_or_create_user("42", "bob").unwrap();
        let again = store.find_or_create_user("42", "bob#0001").unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(store.users().unwrap().len(), 1);
    }

    #[test]
    fn bonus_upsert_keeps_id_and_points() {
        let mut store = JsonStore::in_memory();
        let user = store.find_or_create_user("7", "carol").unwrap();
        let team = Id::generate();
        let original = store
            .save_bonus_prediction(BonusPrediction {
                id: Id::generate(),
                user: user.id.clone(),
                pick: BonusPick::WorldsWinner([team]),
                lock_at: None,
                points: 0,
            })
            .unwrap();
        store.set_bonus_points(&original.id, 4).unwrap();
        let other = Id::generate();
        let saved = store
            .save_bonus_prediction(BonusPrediction {
                id: Id::generate(),
                user: user.id.clone(),
                pick: BonusPick::WorldsWinner([other.clone()]),
                lock_at: None,
                points: 0,
            })
            .unwrap();
        assert_eq!(saved.id, original.id);
        assert_eq!(saved.points, 4);
        assert_eq!(saved.pick, BonusPick::WorldsWinner([other]));
        assert_eq!(store.bonus_predictions_of(BonusType::WorldsWinner).unwrap().len(), 1);
    }

    #[test]
    fn add_user_points_tracks_phase() {
        let mut store = JsonStore::in_memory();
        let user = store.find_or_create_user("9", "dave").unwrap();
        store.add_user_points(&user.id, 2, Some(MatchPhase::Top4)).unwrap();
        let after = store.add_user_points(&user.id, 3, None).unwrap();
        assert_eq!(after.total_points, 5);
        assert_eq!(after.phase_points.top_4, 2);
        assert_eq!(after.phase_points.group_stage, 0);
        assert!(store.add_user_points(&Id::generate(), 1, None).is_err());
    }

    #[test]
    fn snapshot_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("pickem-store-{}.json", Id::generate()));
        {
            let mut store = JsonStore::open(&path).unwrap();
            store.insert_team("T1", "KR").unwrap();
            store.set_phase(TournamentPhase::Top4).unwrap();
        }
        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.teams().unwrap().len(), 1);
        assert_eq!(reopened.phase().unwrap().map(|p| p.current), Some(TournamentPhase::Top4));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let path = temp_store_path();
        let mut store = JsonStore::open(&path).unwrap();
        let user = store.find_or_create_user("5", "erin").unwrap();
        let (prediction, _) = store.upsert_prediction(&user.id, &Id::generate(), 1, 0).unwrap();

        block_writes(&path);
        assert!(matches!(
            store.add_user_points(&user.id, 3, Some(MatchPhase::Finals)),
            Err(StoreError::Write { .. })
        ));
        assert!(store.set_prediction_points(&prediction.id, 2).is_err());
        assert!(store.delete_user(&user.id).is_err());
        assert!(store.insert_team("T1", "KR").is_err());

        let unchanged = store.user(&user.id).unwrap().unwrap();
        assert_eq!(unchanged.total_points, 0);
        assert_eq!(unchanged.phase_points.finals, 0);
        assert_eq!(store.predictions_for_user(&user.id).unwrap()[0].points, 0);
        assert!(store.teams().unwrap().is_empty());

        unblock_writes(&path);
        store.add_user_points(&user.id, 3, Some(MatchPhase::Finals)).unwrap();
        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.user(&user.id).unwrap().unwrap().total_points, 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn persisted_layout_uses_document_field_names() {
        let user = Id::from("0123456789abcdef01234567");
        let record = BonusPrediction {
            id: Id::from("aaaaaaaaaaaaaaaaaaaaaaaa"),
            user,
            pick: BonusPick::Mvp([MvpSelection {
                name: "Faker".to_string(),
                player_id: None,
            }]),
            lock_at: None,
            points: 5,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], "aaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(value["type"], "mvp");
        assert_eq!(value["selections"][0]["name"], "Faker");
        assert_eq!(value["points"], 5);
        let back: BonusPrediction = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
