mod admin;
mod torrents;

pub use admin::health;
pub use torrents::{get_torrent, list_categories, search_header, search_torrents, TorrentResponse};
