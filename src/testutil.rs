//! Shared test helpers for torrent-catalog unit tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use crate::categories::Categories;
use crate::config::{Config, ServerConfig};
use crate::storage::{Database, NewTorrent};
use crate::AppState;

/// Create a test AppState with a temporary database.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        },
        page_size: 2,
        ..Default::default()
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");

    Arc::new(AppState {
        categories: Categories::builtin(),
        config,
        db,
    })
}

/// A torrent published `minutes` after 2010-01-01T00:00:00.
pub fn sample_torrent(minutes: i64, title: &str, category: i64) -> NewTorrent {
    let epoch = NaiveDateTime::parse_from_str("2010-01-01T00:00:00", "%Y-%m-%dT%H:%M:%S")
        .expect("valid timestamp");
    NewTorrent {
        published_at: epoch + Duration::minutes(minutes),
        hash: format!("HASH{minutes:04}"),
        topic: minutes.to_string(),
        post: minutes.to_string(),
        uploader: "tester".to_string(),
        title: title.to_string(),
        description: String::new(),
        size: 1536,
        category,
    }
}
