use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{build_trend, TrendKind, TrendSeries};
use crate::models::{PlayerId, PlayerSummary};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players: usize,
    pub skipped: usize,
    pub source: &'static str,
    pub loaded_at: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.current().await;
    Json(HealthResponse {
        status: "ok",
        players: snapshot.len(),
        skipped: snapshot.skipped().len(),
        source: state.source.name(),
        loaded_at: snapshot.loaded_at(),
    })
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

/// Data files of the loaded players.
pub async fn list_files(State(state): State<AppState>) -> Json<FilesResponse> {
    let snapshot = state.current().await;
    Json(FilesResponse {
        files: snapshot.player_ids().map(PlayerId::file_name).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct NamesResponse {
    #[serde(rename = "nameMapping")]
    pub name_mapping: BTreeMap<PlayerId, String>,
}

pub async fn player_names(State(state): State<AppState>) -> Json<NamesResponse> {
    let snapshot = state.current().await;
    Json(NamesResponse {
        name_mapping: snapshot.names().mapping().clone(),
    })
}

/// Player by code, or by display name when no code matches.
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerSummary>, ApiError> {
    let snapshot = state.current().await;
    snapshot
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("player {}", id)))
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub kind: Option<String>,
}

pub async fn player_trend(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendSeries>, ApiError> {
    let kind = match params.kind.as_deref() {
        Some(kind) => kind.parse::<TrendKind>().map_err(ApiError::BadRequest)?,
        None => TrendKind::default(),
    };

    let snapshot = state.current().await;
    let player = snapshot
        .find(&id)
        .ok_or_else(|| ApiError::NotFound(format!("player {}", id)))?;

    Ok(Json(build_trend(&player.records, kind)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub player_id: PlayerId,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

/// Search-as-you-type over loaded players.
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SuggestResponse> {
    let snapshot = state.current().await;
    let suggestions = snapshot
        .suggest(params.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(|p| Suggestion {
            player_id: p.player_id.clone(),
            display_name: p.display_name.clone(),
        })
        .collect();

    Json(SuggestResponse { suggestions })
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub player_id: String,
    pub found: bool,
}

/// Map a code or display name to a player code.
pub async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("missing query parameter q".to_string()));
    }

    let snapshot = state.current().await;
    let response = match snapshot.find(query) {
        Some(player) => ResolveResponse {
            player_id: player.player_id.to_string(),
            found: true,
        },
        None => ResolveResponse {
            player_id: snapshot.names().resolve_id(query),
            found: false,
        },
    };

    Ok(Json(response))
}
