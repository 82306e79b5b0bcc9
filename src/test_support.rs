//! Shared fixtures for unit tests.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{StoreError, StoreResult};
use crate::lock_clock::lock_instant_for;
use crate::store::{EntityStore, JsonStore};
use crate::types::*;

/// 2025-10-`day` at `hour`:00 UTC.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, day, hour, 0, 0).unwrap()
}

/// Store seeded with five teams and a few rostered players.
pub struct Fixture {
    pub store: JsonStore,
}

/// Fresh snapshot path under the system temp dir.
pub fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("pickem-test-{}.json", Id::generate()))
}

/// Make every snapshot write to `path` fail by parking a directory where the
/// temp file goes.
pub fn block_writes(path: &Path) {
    fs::create_dir_all(path.with_extension("json.tmp")).unwrap();
}

pub fn unblock_writes(path: &Path) {
    fs::remove_dir_all(path.with_extension("json.tmp")).unwrap();
}

impl Fixture {
    pub fn new() -> Self {
        Self::seeded(JsonStore::in_memory())
    }

    /// Same seed data, mirrored to a snapshot file at `path`.
    pub fn persisted(path: &Path) -> Self {
        Self::seeded(JsonStore::open(path).unwrap())
    }

    fn seeded(mut store: JsonStore) -> Self {
        for (name, region) in [("T1", "KR"), ("G2", "EU"), ("GEN", "KR"), ("TES", "CN"), ("DRX", "KR")] {
            store.insert_team(name, region).unwrap();
        }
        for (player, role, team) in [
            ("Faker", "mid", "T1"),
            ("Keria", "support", "T1"),
            ("Caps", "mid", "G2"),
            ("Chovy", "mid", "GEN"),
        ] {
            let team = store.find_team_by_name(team).unwrap().unwrap();
            store.insert_player(player, role, &team.id).unwrap();
        }
        Fixture { store }
    }

    pub fn team(&self, name: &str) -> Team {
        self.store.find_team_by_name(name).unwrap().unwrap()
    }

    pub fn add_match(&mut self, team_a: &str, team_b: &str, start: DateTime<Utc>, phase: MatchPhase) -> Match {
        let record = Match {
            id: Id::generate(),
            team_a: self.team(team_a).id,
            team_b: self.team(team_b).id,
            start_time: start,
            phase,
            best_of: 1,
            lock_at: lock_instant_for(start),
            score_a: None,
            score_b: None,
            status: MatchStatus::Scheduled,
        };
        self.store.insert_match(record).unwrap()
    }

    pub fn user(&mut self, name: &str) -> User {
        self.store.find_or_create_user(&format!("d-{name}"), name).unwrap()
    }

    pub fn user_by_id(&self, id: &Id) -> User {
        self.store.user(id).unwrap().unwrap()
    }

    /// Store a guess for `name` and return the owner's id.
    pub fn predict(&mut self, name: &str, record: &Match, score_a: u32, score_b: u32) -> Id {
        let user = self.user(name);
        self.store.upsert_prediction(&user.id, &record.id, score_a, score_b).unwrap();
        user.id
    }

    fn save_bonus(&mut self, name: &str, pick: BonusPick) -> Id {
        let user = self.user(name);
        self.store
            .save_bonus_prediction(BonusPrediction {
                id: Id::generate(),
                user: user.id.clone(),
                pick,
                lock_at: None,
                points: 0,
            })
            .unwrap();
        user.id
    }

    pub fn bonus_winner(&mut self, name: &str, team: &str) -> Id {
        let team = self.team(team).id;
        self.save_bonus(name, BonusPick::WorldsWinner([team]))
    }

    pub fn bonus_advancers(&mut self, name: &str, teams: &[&str]) -> Id {
        let ids = teams.iter().map(|t| self.team(t).id).collect();
        self.save_bonus(name, BonusPick::GroupsAdvancers(ids))
    }

    /// MVP pick resolved against the roster, so it carries a player reference.
    pub fn bonus_mvp(&mut self, name: &str, player: &str) -> Id {
        let player = self.store.find_player_by_name(player).unwrap().unwrap();
        self.save_bonus(
            name,
            BonusPick::Mvp([MvpSelection {
                name: player.name,
                player_id: Some(player.id),
            }]),
        )
    }

    /// MVP pick stored as typed, with no player reference.
    pub fn bonus_mvp_raw(&mut self, name: &str, raw: &str) -> Id {
        self.save_bonus(
            name,
            BonusPick::Mvp([MvpSelection {
                name: raw.to_string(),
                player_id: None,
            }]),
        )
    }
}

/// Delegates to a `JsonStore` but fails selected writes.
pub struct FlakyStore {
    pub inner: JsonStore,
    failing_totals: HashSet<Id>,
    failing_points: HashSet<Id>,
    failing_deletes: HashSet<Id>,
}

impl FlakyStore {
    pub fn new(inner: JsonStore) -> Self {
        FlakyStore {
            inner,
            failing_totals: HashSet::new(),
            failing_points: HashSet::new(),
            failing_deletes: HashSet::new(),
        }
    }

    /// Fail `add_user_totals` for this user.
    pub fn fail_user_totals(&mut self, user: &Id) {
        self.failing_totals.insert(user.clone());
    }

    /// Fail prediction/bonus point writes for this record id.
    pub fn fail_points(&mut self, record: &Id) {
        self.failing_points.insert(record.clone());
    }

    /// Fail `delete_user` for this user.
    pub fn fail_delete(&mut self, user: &Id) {
        self.failing_deletes.insert(user.clone());
    }

    pub fn heal(&mut self) {
        self.failing_totals.clear();
        self.failing_points.clear();
        self.failing_deletes.clear();
    }

    fn injected(collection: &'static str, id: &Id) -> StoreError {
        StoreError::Write {
            path: format!("{collection}/{id}"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
        }
    }
}

impl EntityStore for FlakyStore {
    fn insert_team(&mut self, name: &str, region: &str) -> StoreResult<Team> {
        self.inner.insert_team(name, region)
    }
    fn team(&self, id: &Id) -> StoreResult<Option<Team>> {
        self.inner.team(id)
    }
    fn find_team_by_name(&self, name: &str) -> StoreResult<Option<Team>> {
        self.inner.find_team_by_name(name)
    }
    fn teams(&self) -> StoreResult<Vec<Team>> {
        self.inner.teams()
    }
    fn delete_team(&mut self, id: &Id) -> StoreResult<bool> {
        self.inner.delete_team(id)
    }

    fn insert_player(&mut self, name: &str, role: &str, team: &Id) -> StoreResult<Player> {
        self.inner.insert_player(name, role, team)
    }
    fn player(&self, id: &Id) -> StoreResult<Option<Player>> {
        self.inner.player(id)
    }
    fn find_player_by_name(&self, name: &str) -> StoreResult<Option<Player>> {
        self.inner.find_player_by_name(name)
    }
    fn find_team_player(&self, name: &str, team: &Id) -> StoreResult<Option<Player>> {
        self.inner.find_team_player(name, team)
    }
    fn players_for_team(&self, team: &Id) -> StoreResult<Vec<Player>> {
        self.inner.players_for_team(team)
    }
    fn delete_player(&mut self, id: &Id) -> StoreResult<bool> {
        self.inner.delete_player(id)
    }
    fn delete_players_for_team(&mut self, team: &Id) -> StoreResult<usize> {
        self.inner.delete_players_for_team(team)
    }

    fn insert_match(&mut self, record: Match) -> StoreResult<Match> {
        self.inner.insert_match(record)
    }
    fn get_match(&self, id: &Id) -> StoreResult<Option<Match>> {
        self.inner.get_match(id)
    }
    fn find_match(&self, team_a: &Id, team_b: &Id, start: DateTime<Utc>) -> StoreResult<Option<Match>> {
        self.inner.find_match(team_a, team_b, start)
    }
    fn matches(&self) -> StoreResult<Vec<Match>> {
        self.inner.matches()
    }
    fn update_match(&mut self, record: &Match) -> StoreResult<()> {
        self.inner.update_match(record)
    }
    fn delete_matches(&mut self, ids: &[Id]) -> StoreResult<usize> {
        self.inner.delete_matches(ids)
    }

    fn upsert_prediction(
        &mut self,
        user: &Id,
        match_id: &Id,
        score_a: u32,
        score_b: u32,
    ) -> StoreResult<(Prediction, bool)> {
        self.inner.upsert_prediction(user, match_id, score_a, score_b)
    }
    fn predictions_for_match(&self, match_id: &Id) -> StoreResult<Vec<Prediction>> {
        self.inner.predictions_for_match(match_id)
    }
    fn predictions_for_user(&self, user: &Id) -> StoreResult<Vec<Prediction>> {
        self.inner.predictions_for_user(user)
    }
    fn set_prediction_points(&mut self, id: &Id, points: i64) -> StoreResult<()> {
        if self.failing_points.contains(id) {
            return Err(Self::injected("predictions", id));
        }
        self.inner.set_prediction_points(id, points)
    }
    fn delete_predictions_for_matches(&mut self, match_ids: &[Id]) -> StoreResult<usize> {
        self.inner.delete_predictions_for_matches(match_ids)
    }

    fn bonus_prediction(&self, user: &Id, kind: BonusType) -> StoreResult<Option<BonusPrediction>> {
        self.inner.bonus_prediction(user, kind)
    }
    fn bonus_predictions_of(&self, kind: BonusType) -> StoreResult<Vec<BonusPrediction>> {
        self.inner.bonus_predictions_of(kind)
    }
    fn bonus_predictions_for_user(&self, user: &Id) -> StoreResult<Vec<BonusPrediction>> {
        self.inner.bonus_predictions_for_user(user)
    }
    fn save_bonus_prediction(&mut self, record: BonusPrediction) -> StoreResult<BonusPrediction> {
        self.inner.save_bonus_prediction(record)
    }
    fn set_bonus_points(&mut self, id: &Id, points: i64) -> StoreResult<()> {
        if self.failing_points.contains(id) {
            return Err(Self::injected("bonuspredictions", id));
        }
        self.inner.set_bonus_points(id, points)
    }

    fn user(&self, id: &Id) -> StoreResult<Option<User>> {
        self.inner.user(id)
    }
    fn find_user_by_discord_id(&self, discord_id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_discord_id(discord_id)
    }
    fn find_or_create_user(&mut self, discord_id: &str, username: &str) -> StoreResult<User> {
        self.inner.find_or_create_user(discord_id, username)
    }
    fn ensure_user(&mut self, id: &Id) -> StoreResult<User> {
        self.inner.ensure_user(id)
    }
    fn users(&self) -> StoreResult<Vec<User>> {
        self.inner.users()
    }
    fn add_user_totals(&mut self, id: &Id, total: i64, phases: &PhasePoints) -> StoreResult<User> {
        if self.failing_totals.contains(id) {
            return Err(Self::injected("users", id));
        }
        self.inner.add_user_totals(id, total, phases)
    }
    fn delete_user(&mut self, id: &Id) -> StoreResult<bool> {
        if self.failing_deletes.contains(id) {
            return Err(Self::injected("users", id));
        }
        self.inner.delete_user(id)
    }

    fn phase(&self) -> StoreResult<Option<PhaseRecord>> {
        self.inner.phase()
    }
    fn set_phase(&mut self, current: TournamentPhase) -> StoreResult<PhaseRecord> {
        self.inner.set_phase(current)
    }
}
