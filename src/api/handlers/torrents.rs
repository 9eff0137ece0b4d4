use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery, JSend, JSendPaginated};
use crate::categories::{Categories, Category};
use crate::ingest::TIMESTAMP_FORMAT;
use crate::search;
use crate::storage::{format_size, Torrent};
use crate::AppState;

/// Column order of the dump, as exposed by `/api/header`.
pub const HEADER: [&str; 9] = [
    "published_at",
    "hash",
    "topic",
    "post",
    "uploader",
    "title",
    "description",
    "size",
    "category",
];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TorrentResponse {
    pub id: u64,
    pub published_at: String,
    pub hash: String,
    pub topic: String,
    pub post: String,
    pub uploader: String,
    pub title: String,
    pub description: String,
    pub size: u64,
    pub category: i64,
    // Derived fields
    pub category_name: String,
    pub magnet: String,
    pub size_human: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keywords: String,
    /// `0` searches every category
    #[serde(default)]
    pub category: i64,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn search_torrents(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<JSendPaginated<TorrentResponse>>, ApiError> {
    let page_size = state.config.page_size;
    let torrents = search::search(
        &state.db,
        &params.keywords,
        params.category,
        params.page,
        page_size,
    )?;

    let items = torrents
        .iter()
        .map(|t| torrent_to_response(t, &state.categories))
        .collect();

    Ok(JSendPaginated::success(
        items,
        params.page.max(1) as u64,
        page_size,
    ))
}

pub async fn get_torrent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<JSend<TorrentResponse>>, ApiError> {
    let torrent = state
        .db
        .get_torrent(id)?
        .ok_or_else(|| ApiError::not_found("Torrent not found"))?;

    Ok(JSend::success(torrent_to_response(
        &torrent,
        &state.categories,
    )))
}

pub async fn search_header() -> Json<JSend<[&'static str; 9]>> {
    JSend::success(HEADER)
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<JSend<Vec<Category>>> {
    JSend::success(state.categories.iter().collect())
}

// ============================================================================
// Helpers
// ============================================================================

fn torrent_to_response(torrent: &Torrent, categories: &Categories) -> TorrentResponse {
    TorrentResponse {
        id: torrent.id,
        published_at: torrent.published_at.format(TIMESTAMP_FORMAT).to_string(),
        hash: torrent.hash.clone(),
        topic: torrent.topic.clone(),
        post: torrent.post.clone(),
        uploader: torrent.uploader.clone(),
        title: torrent.title.clone(),
        description: torrent.description.clone(),
        size: torrent.size,
        category: torrent.category,
        category_name: categories.name(torrent.category).to_string(),
        magnet: format!("magnet:?xt=urn:btih:{}", torrent.hash),
        size_human: format_size(torrent.size),
    }
}
