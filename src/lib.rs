//! torrent-catalog - A searchable catalog of torrent metadata
//!
//! This crate provides:
//! - One-time bulk loading of a CSV dump with per-row validation
//! - redb embedded database for records (ACID, MVCC, crash-safe)
//! - Keyword and category search with stable newest-first pagination
//! - REST API returning JSend envelopes

pub mod api;
pub mod bootstrap;
pub mod categories;
pub mod config;
pub mod ingest;
pub mod search;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use categories::Categories;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub categories: Categories,
    pub config: Config,
    pub db: Database,
}
