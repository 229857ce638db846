//! REST API endpoints.
//!
//! Axum-based HTTP API serving the loaded board snapshot: player
//! summaries, rankings, trends and daily history.

pub mod routes;
pub mod state;

use axum::{
    extract::rejection::QueryRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::warn;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return cors.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            warn!("Ignoring invalid CORS origin: {}", origin);
            cors
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    use routes::{history, players, ranking};

    let cors = cors_layer(&state.config.server.cors_origin);
    let data_dir = ServeDir::new(&state.config.data_dir);

    Router::new()
        .route("/api/health", get(players::health))
        .route("/api/files", get(players::list_files))
        .route("/api/player-names", get(players::player_names))
        .route("/api/players/:id", get(players::get_player))
        .route("/api/players/:id/trend", get(players::player_trend))
        .route("/api/player-history/:id", get(history::player_history))
        .route("/api/ranking", get(ranking::get_ranking))
        .route("/api/player-stats-snapshot", get(ranking::stats_snapshot))
        .route("/api/suggest", get(players::suggest))
        .route("/api/resolve", get(players::resolve))
        .nest_service("/data", data_dir)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    use super::state::AppState;
    use crate::config::AppConfig;
    use crate::source::{DataSource, DirSource};

    /// A1 and B2 are eligible for win-rate ranking, C3 is not.
    pub async fn fixture_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let files = [
            (
                "A1.csv",
                "time,wins,plays,win_rate,rate,wins_total,plays_total\n\
                 2025-03-01 21:00:00,60,70,0.857,5000,60,70\n\
                 2025-03-02 21:00:00,20,30,0.8,5100,80,100\n",
            ),
            (
                "B2.csv",
                "time,wins,plays,win_rate,rate,wins_total,plays_total\n\
                 2024-01-01 21:00:00,5,10,0.4167,1500,50,120\n",
            ),
            (
                "C3.csv",
                "time,wins,plays,win_rate,rate,wins_total,plays_total\n\
                 2024-01-01 21:00:00,10,50,0.2,6000,10,50\n",
            ),
        ];
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        std::fs::write(
            dir.path().join("player_names.json"),
            r#"{"nameMapping": {"A1": "Alpha", "B2": "Bravo"}}"#,
        )
        .unwrap();

        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let source: Arc<dyn DataSource> = Arc::new(DirSource::new(dir.path()));
        let state = AppState::load(source, config).await;
        (dir, state)
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
