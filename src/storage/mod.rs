pub mod db;
pub mod models;
mod tables;
mod torrents;

pub use db::{Database, DatabaseError};
pub use models::{format_size, NewTorrent, Torrent};
pub use tables::*;

use crate::search::SearchQuery;

/// Operations the catalog needs from its backing store.
///
/// Each `insert_batch` call is atomic on its own; separate calls are not.
pub trait TorrentStore: Send + Sync {
    fn count_torrents(&self) -> Result<u64, DatabaseError>;

    /// Persist a chunk of torrents in one transaction, returning how many were written.
    fn insert_batch(&self, batch: Vec<NewTorrent>) -> Result<usize, DatabaseError>;

    /// Run a filtered, paginated lookup ordered by publication time, newest first.
    fn search_torrents(&self, query: &SearchQuery) -> Result<Vec<Torrent>, DatabaseError>;
}
