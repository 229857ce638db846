//! Remote backend data source.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{DataSource, SourceError};
use crate::fetch::BoardClient;
use crate::models::{PlayerId, SnapshotRecord};

/// Reads everything from the board backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: BoardClient,
}

impl HttpSource {
    pub fn new(client: BoardClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_files(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.client.list_files().await?)
    }

    async fn player_csv(&self, id: &PlayerId) -> Result<String, SourceError> {
        Ok(self.client.player_csv(id).await?)
    }

    async fn name_mapping(&self) -> Result<BTreeMap<PlayerId, String>, SourceError> {
        Ok(self.client.name_mapping().await?)
    }

    async fn player_history(
        &self,
        id: &PlayerId,
        days: Option<u32>,
    ) -> Result<Vec<SnapshotRecord>, SourceError> {
        Ok(self.client.player_history(id, days).await?.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ClientConfig;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;

    async fn source() -> HttpSource {
        let app = Router::new()
            .route(
                "/api/files",
                get(|| async { Json(json!({"files": ["A.csv"]})) }),
            )
            .route(
                "/data/A.csv",
                get(|| async { "time,wins_total,plays_total,rate\n2024-01-01,5,9,1000" }),
            )
            .route(
                "/api/player-history/A",
                get(|| async {
                    Json(json!({
                        "player": {},
                        "history": [{"created_at": "2025-03-02", "versus_won": 4, "versus_plays": 6, "versus_rating": 900}],
                        "stats": {}
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = BoardClient::new(ClientConfig {
            base_url: format!("http://{}", addr),
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap();
        HttpSource::new(client)
    }

    #[tokio::test]
    async fn test_http_source_delegates() {
        let source = source().await;

        assert_eq!(source.list_files().await.unwrap(), vec!["A.csv"]);
        assert!(source
            .player_csv(&PlayerId::from("A"))
            .await
            .unwrap()
            .contains("1000"));

        let history = source
            .player_history(&PlayerId::from("A"), None)
            .await
            .unwrap();
        assert_eq!(history[0].versus_plays, 6);
    }

    #[tokio::test]
    async fn test_http_source_status_error() {
        let source = source().await;

        // No name mapping route on this backend
        assert!(matches!(
            source.name_mapping().await,
            Err(SourceError::Fetch(_))
        ));
    }
}
