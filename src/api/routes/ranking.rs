use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::config::AppConfig;
use crate::ranking::{
    build_view, Pagination, PaginationMeta, RankFilter, RankedPlayer, RankingMode, RankingQuery,
    RankingView, SortOrder,
};

#[derive(Debug, Default, Deserialize)]
pub struct RankingParams {
    pub mode: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub rank_filter: Option<String>,
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map_err(ApiError::BadRequest),
        None => Ok(T::default()),
    }
}

impl RankingParams {
    fn into_query(self, config: &AppConfig) -> Result<RankingQuery, ApiError> {
        let mode: RankingMode = parse_or_default(self.mode.as_deref())?;
        let order: SortOrder = parse_or_default(self.order.as_deref())?;
        let rank_filter: RankFilter = parse_or_default(self.rank_filter.as_deref())?;
        let pagination = Pagination::new(
            self.page,
            Some(self.per_page.unwrap_or(config.ranking.per_page)),
        );

        Ok(RankingQuery::new(mode)
            .order(order)
            .min_plays(config.ranking.min_plays_for_win_rate)
            .search(self.search.unwrap_or_default())
            .rank_filter(rank_filter)
            .pagination(pagination))
    }
}

/// Podium plus one page of the leaderboard.
pub async fn get_ranking(
    State(state): State<AppState>,
    params: Result<Query<RankingParams>, QueryRejection>,
) -> Result<Json<RankingView>, ApiError> {
    let Query(params) = params?;
    let query = params.into_query(&state.config)?;
    let snapshot = state.current().await;
    Ok(Json(build_view(snapshot.players(), &query)))
}

/// Query names used by the backend's snapshot endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub rank_filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub players: Vec<RankedPlayer>,
    pub pagination: PaginationMeta,
}

/// Paginated leaderboard without the podium.
pub async fn stats_snapshot(
    State(state): State<AppState>,
    params: Result<Query<SnapshotParams>, QueryRejection>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let Query(params) = params?;
    let query = RankingParams {
        mode: params.sort_by,
        order: params.sort_order,
        page: params.page,
        per_page: params.per_page,
        search: params.search,
        rank_filter: params.rank_filter,
    }
    .into_query(&state.config)?;

    let snapshot = state.current().await;
    let view = build_view(snapshot.players(), &query);

    Ok(Json(SnapshotResponse {
        players: view.players,
        pagination: view.pagination,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::test_support::{fixture_state, get_json};
    use axum::http::StatusCode;
    use serde_json::Value;

    fn ids(players: &Value) -> Vec<String> {
        players
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["player_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_params_defaults() {
        let query = RankingParams::default()
            .into_query(&AppConfig::default())
            .unwrap();

        assert_eq!(query.mode, RankingMode::WinRate);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.min_plays, 100);
        assert_eq!(query.search, None);
        assert_eq!(query.rank_filter, RankFilter::All);
        assert_eq!(query.pagination, Pagination::new(Some(1), Some(10)));
    }

    #[test]
    fn test_params_invalid() {
        let params = RankingParams {
            mode: Some("elo".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_query(&AppConfig::default()),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_win_rate_ranking() {
        let (_dir, state) = fixture_state().await;
        let (status, json) = get_json(build_router(state), "/api/ranking").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mode"], "win_rate");
        // C3 has fewer than 100 plays
        assert_eq!(ids(&json["players"]), vec!["A1", "B2"]);
        assert_eq!(ids(&json["podium"]), vec!["A1", "B2"]);
        assert_eq!(json["players"][0]["rank"], 1);
        assert_eq!(json["players"][0]["overall_win_rate"], 80.0);
        assert_eq!(json["pagination"]["total_count"], 2);
    }

    #[tokio::test]
    async fn test_rating_ranking_ascending() {
        let (_dir, state) = fixture_state().await;

        let (_, json) = get_json(build_router(state.clone()), "/api/ranking?mode=rating").await;
        assert_eq!(ids(&json["players"]), vec!["C3", "A1", "B2"]);

        let (_, json) = get_json(build_router(state), "/api/ranking?mode=rating&order=asc").await;
        assert_eq!(ids(&json["players"]), vec!["B2", "A1", "C3"]);
    }

    #[tokio::test]
    async fn test_ranking_paging_and_search() {
        let (_dir, state) = fixture_state().await;

        let (_, json) = get_json(
            build_router(state.clone()),
            "/api/ranking?mode=rating&page=2&per_page=2",
        )
        .await;
        assert_eq!(ids(&json["players"]), vec!["B2"]);
        assert_eq!(json["players"][0]["rank"], 3);
        assert_eq!(json["pagination"]["total_pages"], 2);
        assert_eq!(json["pagination"]["has_prev"], true);
        assert_eq!(json["pagination"]["has_next"], false);

        let (_, json) = get_json(
            build_router(state),
            "/api/ranking?mode=rating&search=alpha",
        )
        .await;
        assert_eq!(ids(&json["players"]), vec!["A1"]);
        assert_eq!(json["players"][0]["rank"], 2);
        assert_eq!(ids(&json["podium"]), vec!["C3", "A1", "B2"]);
    }

    #[tokio::test]
    async fn test_ranking_bad_params() {
        let (_dir, state) = fixture_state().await;

        let (status, json) = get_json(build_router(state.clone()), "/api/ranking?order=up").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) =
            get_json(build_router(state), "/api/ranking?rank_filter=best").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_numbers_use_error_body() {
        let (_dir, state) = fixture_state().await;

        let (status, json) = get_json(build_router(state.clone()), "/api/ranking?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].as_str().unwrap().contains("page"));

        let (status, json) = get_json(
            build_router(state),
            "/api/player-stats-snapshot?per_page=-1",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let (_dir, state) = fixture_state().await;
        let (status, json) = get_json(
            build_router(state),
            "/api/player-stats-snapshot?sort_by=versus_rating&sort_order=desc&rank_filter=top10&per_page=20",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.get("podium").is_none());
        assert_eq!(ids(&json["players"]), vec!["C3", "A1", "B2"]);
        assert_eq!(json["pagination"]["per_page"], 20);
        assert_eq!(json["pagination"]["current_page"], 1);
    }
}
