use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Binary prefixes tried in order before falling through to `Yi`.
const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// A torrent record stored in redb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    pub id: u64,
    pub published_at: NaiveDateTime,
    pub hash: String,
    pub topic: String,
    pub post: String,
    pub uploader: String,
    pub title: String,
    pub description: String,
    pub size: u64,
    pub category: i64,
}

/// A parsed catalog row that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTorrent {
    pub published_at: NaiveDateTime,
    pub hash: String,
    pub topic: String,
    pub post: String,
    pub uploader: String,
    pub title: String,
    pub description: String,
    pub size: u64,
    pub category: i64,
}

impl NewTorrent {
    pub fn with_id(self, id: u64) -> Torrent {
        Torrent {
            id,
            published_at: self.published_at,
            hash: self.hash,
            topic: self.topic,
            post: self.post,
            uploader: self.uploader,
            title: self.title,
            description: self.description,
            size: self.size,
            category: self.category,
        }
    }
}

impl Torrent {
    /// Unix seconds of the publication time, used as the sort key.
    pub fn timestamp(&self) -> i64 {
        self.published_at.and_utc().timestamp()
    }
}

/// Format a byte count with binary prefixes, e.g. `1536` -> `"1.5KiB"`.
///
/// Zero is rendered as `"0B"`. Counts beyond the `Zi` range stay in `Yi`
/// without further scaling.
pub fn format_size(bytes: impl Into<u128>) -> String {
    let bytes = bytes.into();
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{num:.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}
