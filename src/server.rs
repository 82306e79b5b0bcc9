use std::{thread::sleep, time::Duration};

use axum::{
    extract::{Query, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::commands::lock_overdue;
use crate::phase_gate::current_phase;
use crate::standings::{list_matches, phase_standings, standings};
use crate::types::*;

// ── Status endpoints ───────────────────────────────────────────────────

pub fn status_router(state: StatusServerState) -> Router {
    Router::new()
        .route("/standings.json", get(get_standings_json))
        .route("/phase.json", get(get_phase_json))
        .route("/matches.json", get(get_matches_json))
        .with_state(state)
}

pub async fn start_status_server(state: StatusServerState, addr: String) {
    let app = status_router(state);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("status server failed to bind {addr}: {e}");
            return;
        }
    };
    info!("status server listening at http://{addr}/");
    if let Err(e) = axum::serve(listener, app).await {
        error!("status server error: {e}");
    }
}

fn json_response(status: StatusCode, payload: &Value) -> impl IntoResponse {
    let body = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    (
        status,
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
            ("Expires", "0"),
        ],
        body,
    )
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    json_response(status, &json!({ "error": message })).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct StandingsQuery {
    pub limit: Option<usize>,
    pub phase: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchesQuery {
    pub filter: Option<String>,
    pub phase: Option<String>,
}

fn parse_filter(raw: Option<&str>) -> Result<MatchFilter, String> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("upcoming") => Ok(MatchFilter::Upcoming),
        Some("completed") => Ok(MatchFilter::Completed),
        Some("all") => Ok(MatchFilter::All),
        Some(other) => Err(format!("unknown filter `{other}`")),
    }
}

async fn get_standings_json(
    AxumState(state): AxumState<StatusServerState>,
    Query(query): Query<StandingsQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(state.standings_limit);
    let phase = match query.phase.as_deref().map(str::parse::<MatchPhase>).transpose() {
        Ok(phase) => phase,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let rows = {
        let guard = state.store.lock().unwrap_or_else(|e| e.into_inner());
        match phase {
            Some(phase) => phase_standings(&*guard, phase, limit),
            None => standings(&*guard, limit),
        }
    };
    match rows {
        Ok(rows) => json_response(
            StatusCode::OK,
            &json!({ "phase": phase.map(|p| p.as_str()), "standings": rows }),
        )
        .into_response(),
        Err(e) => {
            error!("standings.json failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_phase_json(AxumState(state): AxumState<StatusServerState>) -> axum::response::Response {
    let current = {
        let guard = state.store.lock().unwrap_or_else(|e| e.into_inner());
        current_phase(&*guard)
    };
    match current {
        Ok(current) => json_response(StatusCode::OK, &json!({ "current": current })).into_response(),
        Err(e) => {
            error!("phase.json failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_matches_json(
    AxumState(state): AxumState<StatusServerState>,
    Query(query): Query<MatchesQuery>,
) -> axum::response::Response {
    let filter = match parse_filter(query.filter.as_deref()) {
        Ok(filter) => filter,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let phase = match query.phase.as_deref().map(str::parse::<MatchPhase>).transpose() {
        Ok(phase) => phase,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let listed = {
        let guard = state.store.lock().unwrap_or_else(|e| e.into_inner());
        list_matches(&*guard, filter, phase)
    };
    match listed {
        Ok(matches) => json_response(StatusCode::OK, &json!({ "matches": matches })).into_response(),
        Err(e) => {
            error!("matches.json failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ── Background lock job ────────────────────────────────────────────────

/// Every `lockJobIntervalSecs`, flip scheduled matches whose lock instant has passed to locked.
pub fn spawn_lock_job(state: CommandState) {
    let secs = match state.config.lock_job_interval_secs {
        0 => LOCK_JOB_INTERVAL_SECS,
        n => n,
    };
    let interval = Duration::from_secs(secs);
    std::thread::spawn(move || loop {
        match lock_overdue(&state) {
            Ok(0) => {}
            Ok(n) => info!("lock job: {n} match(es) locked"),
            Err(e) => warn!("lock job failed: {e}"),
        }
        sleep(interval);
    });
}
