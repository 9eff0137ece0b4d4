//! Query engine: filter composition and pagination over the torrent store.

use thiserror::Error;

use crate::storage::{DatabaseError, Torrent, TorrentStore};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("page size must be greater than 0")]
    InvalidPageSize,
    #[error("Query failed: {0}")]
    Query(#[from] DatabaseError),
}

/// A validated search request.
///
/// Empty keywords and category `0` disable their filter. Both filters are
/// combined with AND when active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keywords: Option<String>,
    category: Option<i64>,
    page: u64,
    page_size: usize,
}

impl SearchQuery {
    /// Build a query, clamping pages below 1 to the first page.
    pub fn new(
        keywords: &str,
        category: i64,
        page: i64,
        page_size: usize,
    ) -> Result<Self, SearchError> {
        if page_size == 0 {
            return Err(SearchError::InvalidPageSize);
        }

        Ok(Self {
            keywords: (!keywords.is_empty()).then(|| keywords.to_lowercase()),
            category: (category != 0).then_some(category),
            page: page.max(1) as u64,
            page_size,
        })
    }

    /// Lowercased keyword filter, if any
    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    pub fn category(&self) -> Option<i64> {
        self.category
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of matches to skip: `(page - 1) * page_size`, saturating.
    pub fn offset(&self) -> usize {
        let pages_before = usize::try_from(self.page - 1).unwrap_or(usize::MAX);
        pages_before.saturating_mul(self.page_size)
    }

    /// Whether a torrent passes both filters.
    ///
    /// Keywords match case-insensitively as a substring of the title, the
    /// description or the uploader name.
    pub fn matches(&self, torrent: &Torrent) -> bool {
        if let Some(category) = self.category {
            if torrent.category != category {
                return false;
            }
        }

        match &self.keywords {
            Some(needle) => [&torrent.title, &torrent.description, &torrent.uploader]
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            None => true,
        }
    }
}

/// Run a search against the store.
///
/// Returns an empty page when nothing matches or the page is past the end.
/// Store failures are returned unchanged as [`SearchError::Query`].
pub fn search<S>(
    store: &S,
    keywords: &str,
    category: i64,
    page: i64,
    page_size: usize,
) -> Result<Vec<Torrent>, SearchError>
where
    S: TorrentStore + ?Sized,
{
    let query = SearchQuery::new(keywords, category, page, page_size)?;
    let torrents = store.search_torrents(&query)?;

    tracing::debug!(
        keywords = query.keywords().unwrap_or_default(),
        category = query.category().unwrap_or_default(),
        page = query.page(),
        results = torrents.len(),
        "Search executed"
    );

    Ok(torrents)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn torrent(title: &str, description: &str, uploader: &str, category: i64) -> Torrent {
        Torrent {
            id: 1,
            published_at: NaiveDateTime::parse_from_str("2010-05-01T12:00:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            hash: "ABCDEF".to_string(),
            topic: "topic-keyword".to_string(),
            post: "1".to_string(),
            uploader: uploader.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            size: 10,
            category,
        }
    }

    #[test]
    fn test_page_is_clamped() {
        let query = SearchQuery::new("", 0, 0, 50).unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = SearchQuery::new("", 0, -7, 50).unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let query = SearchQuery::new("", 0, 2, 10).unwrap();
        assert_eq!(query.offset(), 10);

        let query = SearchQuery::new("", 0, 5, 50).unwrap();
        assert_eq!(query.offset(), 200);
    }

    #[test]
    fn test_offset_saturates() {
        let query = SearchQuery::new("", 0, i64::MAX, usize::MAX).unwrap();
        assert_eq!(query.offset(), usize::MAX);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            SearchQuery::new("", 0, 1, 0),
            Err(SearchError::InvalidPageSize)
        ));
    }

    #[test]
    fn test_sentinels_disable_filters() {
        let query = SearchQuery::new("", 0, 1, 50).unwrap();
        assert_eq!(query.keywords(), None);
        assert_eq!(query.category(), None);
        assert!(query.matches(&torrent("a", "b", "c", 99)));
    }

    #[test]
    fn test_keyword_matches_title_description_uploader() {
        let query = SearchQuery::new("MaTrIx", 0, 1, 50).unwrap();
        assert!(query.matches(&torrent("The Matrix", "", "", 4)));
        assert!(query.matches(&torrent("", "a matrix remaster", "", 4)));
        assert!(query.matches(&torrent("", "", "matrixfan", 4)));
        assert!(!query.matches(&torrent("Inception", "", "", 4)));
    }

    #[test]
    fn test_keyword_ignores_hash_and_topic() {
        let query = SearchQuery::new("keyword", 0, 1, 50).unwrap();
        assert!(!query.matches(&torrent("t", "d", "u", 4)));

        let query = SearchQuery::new("abcdef", 0, 1, 50).unwrap();
        assert!(!query.matches(&torrent("t", "d", "u", 4)));
    }

    #[test]
    fn test_filters_are_conjoined() {
        let query = SearchQuery::new("linux", 6, 1, 50).unwrap();
        assert!(query.matches(&torrent("Debian Linux", "", "", 6)));
        assert!(!query.matches(&torrent("Debian Linux", "", "", 10)));
        assert!(!query.matches(&torrent("Windows", "", "", 6)));
    }
}
