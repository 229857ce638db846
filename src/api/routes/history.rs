use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{compute_daily_deltas, summarize_history};
use crate::models::{DailyDelta, HistoryStats, PlayerId, SnapshotRecord};
use crate::source::SourceError;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryPlayer {
    pub player_id: PlayerId,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub player: HistoryPlayer,
    /// Raw cumulative snapshots, newest first
    pub history: Vec<SnapshotRecord>,
    pub stats: HistoryStats,
    pub days: Option<u32>,
    /// Per-day deltas aligned with `history`
    pub daily: Vec<DailyDelta>,
}

/// Daily snapshots and deltas for one player.
pub async fn player_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(params) = params?;
    if params.days == Some(0) {
        return Err(ApiError::BadRequest("days must be greater than 0".to_string()));
    }

    let snapshot = state.current().await;
    let player_id = match snapshot.find(&id) {
        Some(player) => player.player_id.clone(),
        None => PlayerId::new(id.trim()),
    };

    let history = state
        .source
        .player_history(&player_id, params.days)
        .await
        .map_err(|e| match e {
            SourceError::NotFound(_) => ApiError::NotFound(format!("player {}", player_id)),
            other => {
                warn!("History for {} unavailable: {}", player_id, other);
                ApiError::Internal(other.to_string())
            }
        })?;

    let daily = compute_daily_deltas(&history);
    let stats = summarize_history(&daily);
    let display_name = snapshot
        .names()
        .resolve_name(player_id.as_str())
        .to_string();

    Ok(Json(HistoryResponse {
        player: HistoryPlayer {
            player_id,
            display_name,
        },
        history,
        stats,
        days: params.days,
        daily,
    }))
}
