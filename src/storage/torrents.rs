use redb::{ReadOnlyTable, ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::{NewTorrent, Torrent};
use super::tables::*;
use super::TorrentStore;
use crate::search::SearchQuery;

impl Database {
    // ========================================================================
    // Torrent operations
    // ========================================================================

    /// Number of torrents currently stored
    pub fn count_torrents(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TORRENTS)?;
        Ok(table.len()?)
    }

    /// Store a chunk of torrents and their date and category index entries
    /// in a single write transaction. Ids continue from the highest stored id.
    pub fn insert_batch(&self, batch: Vec<NewTorrent>) -> Result<usize, DatabaseError> {
        let inserted = batch.len();

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(TORRENTS)?;
            let mut by_date = write_txn.open_table(TORRENTS_BY_DATE)?;
            let mut by_category = write_txn.open_table(TORRENTS_BY_CATEGORY)?;

            let mut next_id = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);

            for new_torrent in batch {
                let torrent = new_torrent.with_id(next_id);
                let timestamp = torrent.timestamp();
                let data = rmp_serde::to_vec_named(&torrent)?;

                table.insert(torrent.id, data.as_slice())?;
                by_date.insert((timestamp, torrent.id), ())?;
                by_category.insert((torrent.category, timestamp, torrent.id), ())?;

                next_id += 1;
            }
        }
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Get a torrent by its id
    pub fn get_torrent(&self, id: u64) -> Result<Option<Torrent>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TORRENTS)?;

        match table.get(id)? {
            Some(data) => {
                let torrent: Torrent = rmp_serde::from_slice(data.value())?;
                Ok(Some(torrent))
            }
            None => Ok(None),
        }
    }

    /// Find torrents matching the query, newest first.
    ///
    /// A category filter walks the category index, anything else walks the
    /// date index. Both are scanned in reverse so ties on the timestamp come
    /// back in descending id order.
    pub fn search_torrents(&self, query: &SearchQuery) -> Result<Vec<Torrent>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let torrents = read_txn.open_table(TORRENTS)?;

        match query.category() {
            Some(category) => {
                let index = read_txn.open_table(TORRENTS_BY_CATEGORY)?;
                let ids = index
                    .range((category, i64::MIN, 0u64)..=(category, i64::MAX, u64::MAX))?
                    .rev()
                    .map(|entry| entry.map(|(key, _)| key.value().2));
                collect_page(ids, &torrents, query)
            }
            None => {
                let index = read_txn.open_table(TORRENTS_BY_DATE)?;
                let ids = index
                    .iter()?
                    .rev()
                    .map(|entry| entry.map(|(key, _)| key.value().1));
                collect_page(ids, &torrents, query)
            }
        }
    }
}

/// Walk ids in sort order, apply the keyword predicate and cut out one page.
fn collect_page<I>(
    ids: I,
    torrents: &ReadOnlyTable<u64, &'static [u8]>,
    query: &SearchQuery,
) -> Result<Vec<Torrent>, DatabaseError>
where
    I: Iterator<Item = Result<u64, redb::StorageError>>,
{
    let filter_rows = query.keywords().is_some();
    let mut to_skip = query.offset();
    let mut page = Vec::new();

    for id in ids {
        if page.len() >= query.page_size() {
            break;
        }
        let id = id?;

        // Without a keyword every indexed id matches, so the offset can be
        // skipped without decoding records.
        if !filter_rows && to_skip > 0 {
            to_skip -= 1;
            continue;
        }

        let torrent: Torrent = match torrents.get(id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => continue,
        };

        if filter_rows && !query.matches(&torrent) {
            continue;
        }
        if to_skip > 0 {
            to_skip -= 1;
            continue;
        }
        page.push(torrent);
    }

    Ok(page)
}

impl TorrentStore for Database {
    fn count_torrents(&self) -> Result<u64, DatabaseError> {
        Database::count_torrents(self)
    }

    fn insert_batch(&self, batch: Vec<NewTorrent>) -> Result<usize, DatabaseError> {
        Database::insert_batch(self, batch)
    }

    fn search_torrents(&self, query: &SearchQuery) -> Result<Vec<Torrent>, DatabaseError> {
        Database::search_torrents(self, query)
    }
}
