use crate::error::{PickemError, PickemResult};
use crate::types::*;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::{env, fs, path::PathBuf};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  if let Some(raw) = env_default("PICKEM_CONFIG_PATH") {
    return resolve_repo_path(&raw);
  }
  repo_root().join("config.json")
}

pub fn logs_dir() -> PathBuf {
  repo_root().join("logs")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn flag_true(value: &str) -> bool {
  let value = value.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

pub fn apply_env_defaults(config: AppConfig) -> AppConfig {
  apply_env_with(config, env_default)
}

/// `PICKEM_DATA_PATH` replaces `dataPath` outright, since an empty `dataPath`
/// already means "memory only". `PICKEM_HTTP_ADDR` only fills an empty
/// `httpAddr`, and `PICKEM_HTTP_DISABLED` can only switch the server off.
fn apply_env_with(mut config: AppConfig, lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
  if let Some(value) = lookup("PICKEM_DATA_PATH") {
    config.data_path = value;
  }
  if config.http_addr.trim().is_empty() {
    if let Some(value) = lookup("PICKEM_HTTP_ADDR") {
      config.http_addr = value;
    }
  }
  if lookup("PICKEM_HTTP_DISABLED").is_some_and(|v| flag_true(&v)) {
    config.http_enabled = false;
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  let path = config_path();
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn save_config_inner(config: AppConfig) -> Result<AppConfig, String> {
  let path = config_path();
  let payload = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
  fs::write(&path, payload).map_err(|e| format!("write config {}: {e}", path.display()))?;
  Ok(config)
}

pub fn data_path(config: &AppConfig) -> Option<PathBuf> {
  let trimmed = config.data_path.trim();
  if trimmed.is_empty() {
    return None;
  }
  Some(resolve_repo_path(trimmed))
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn log_env_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();

  if data_path(config).is_none() {
    warnings.push("dataPath is empty; picks and results live in memory only and are lost on exit");
  }
  if config.advancers_max == 0 {
    warnings.push("advancersMax is 0; every advancers pick will be refused");
  }
  if config.lock_job_interval_secs == 0 {
    warnings.push("lockJobIntervalSecs is 0; the auto-lock job falls back to 60s");
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}

pub fn now_utc() -> DateTime<Utc> {
  Utc::now()
}

/// Canonical form used at every team/player lookup site.
pub fn normalize_name(raw: &str) -> String {
  raw.trim().to_lowercase()
}

/// Name comparison key for MVP matching: lowercase with whitespace runs collapsed.
pub fn normalize_player_key(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Split a comma-separated list of names, dropping blanks.
pub fn split_name_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .map(|part| part.to_string())
    .collect()
}

/// Parse an admin/user supplied instant. Offsets are honoured; naive values are read as UTC.
pub fn parse_instant(raw: &str) -> PickemResult<DateTime<Utc>> {
  let trimmed = raw.trim();
  if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
    return Ok(parsed.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
      return Ok(naive.and_utc());
    }
  }
  Err(PickemError::InvalidTimestamp(trimmed.to_string()))
}
