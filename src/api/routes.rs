use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Search
        .route("/api", get(handlers::search_torrents))
        .route("/api/header", get(handlers::search_header))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/torrents/:id", get(handlers::get_torrent))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::testutil::{sample_torrent, test_state};

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn titles(body: &Value) -> Vec<String> {
        body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_search_pages_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .db
            .insert_batch(vec![
                sample_torrent(1, "oldest", 4),
                sample_torrent(3, "newest", 4),
                sample_torrent(2, "middle", 29),
            ])
            .unwrap();

        let (status, body) = get_json(create_router(Arc::clone(&state)), "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(titles(&body), vec!["newest", "middle"]);
        assert_eq!(body["data"]["pagination"]["page"], 1);
        assert_eq!(body["data"]["pagination"]["page_size"], 2);
        assert_eq!(body["data"]["pagination"]["count"], 2);

        let (_, body) = get_json(create_router(Arc::clone(&state)), "/api?page=2").await;
        assert_eq!(titles(&body), vec!["oldest"]);

        let (_, body) = get_json(create_router(Arc::clone(&state)), "/api?page=-3").await;
        assert_eq!(titles(&body), vec!["newest", "middle"]);
        assert_eq!(body["data"]["pagination"]["page"], 1);
    }

    #[tokio::test]
    async fn test_search_item_fields() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .db
            .insert_batch(vec![sample_torrent(0, "Film", 4)])
            .unwrap();

        let (_, body) = get_json(create_router(state), "/api?keywords=FILM&category=4").await;
        let item = &body["data"]["items"][0];
        assert_eq!(item["published_at"], "2010-01-01T00:00:00");
        assert_eq!(item["hash"], "HASH0000");
        assert_eq!(item["category_name"], "Film");
        assert_eq!(item["size"], 1536);
        assert_eq!(item["size_human"], "1.5KiB");
        assert_eq!(item["magnet"], "magnet:?xt=urn:btih:HASH0000");
    }

    #[tokio::test]
    async fn test_search_rejects_bad_category() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, body) = get_json(create_router(state), "/api?category=film").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_get_torrent() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .db
            .insert_batch(vec![sample_torrent(0, "Unknown category", 99)])
            .unwrap();

        let (status, body) = get_json(create_router(Arc::clone(&state)), "/api/torrents/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Unknown category");
        assert_eq!(body["data"]["category_name"], "");

        let (status, body) = get_json(create_router(state), "/api/torrents/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_header_and_categories() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (_, body) = get_json(create_router(Arc::clone(&state)), "/api/header").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 9);
        assert_eq!(body["data"][0], "published_at");

        let (_, body) = get_json(create_router(state), "/api/categories").await;
        let categories = body["data"].as_array().unwrap();
        assert_eq!(categories.len(), 29);
        assert_eq!(categories[0]["code"], 1);
        assert_eq!(categories[0]["name"], "Film TV e programmi");
    }

    #[tokio::test]
    async fn test_health_reports_count() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .db
            .insert_batch(vec![sample_torrent(0, "a", 1), sample_torrent(1, "b", 1)])
            .unwrap();

        let (status, body) = get_json(create_router(state), "/_internal/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["torrents"], 2);
    }
}
