use redb::TableDefinition;

/// Torrent records: surrogate id -> Torrent (msgpack)
pub const TORRENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("torrents");

/// Date index: (published_at unix seconds, id) -> ()
pub const TORRENTS_BY_DATE: TableDefinition<(i64, u64), ()> =
    TableDefinition::new("torrents_by_date");

/// Category index: (category, published_at unix seconds, id) -> ()
pub const TORRENTS_BY_CATEGORY: TableDefinition<(i64, i64, u64), ()> =
    TableDefinition::new("torrents_by_category");
