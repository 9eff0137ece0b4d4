//! Bulk loading of the CSV dump into the torrent store.
//!
//! The first row is a header and is always discarded. Every following row
//! must have nine fields:
//! `timestamp, hash, topic, post, uploader, title, description, size, category`.
//! Rows that fail to parse are skipped and logged; they never abort a load.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{DatabaseError, NewTorrent, TorrentStore};

/// Number of fields in a data row
pub const FIELD_COUNT: usize = 9;

/// Exact timestamp layout of the dump: no zone, no fractional seconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to open source {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read source: {0}")]
    SourceUnreadable(#[from] csv::Error),
    #[error("Source has no header row")]
    MissingHeader,
    #[error("chunk size must be greater than 0")]
    InvalidChunkSize,
    #[error("Failed to insert batch after {inserted} torrents: {source}")]
    BatchWrite {
        /// Torrents committed by earlier chunks; they stay in the store.
        inserted: u64,
        #[source]
        source: DatabaseError,
    },
}

/// Why a single row was left out of the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
    #[error("invalid size {value:?}: {reason}")]
    Size { value: String, reason: String },
    #[error("invalid category {value:?}: {reason}")]
    Category { value: String, reason: String },
    #[error("undecodable row: {0}")]
    Undecodable(String),
}

/// Summary of a completed load
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    /// Torrents committed to the store
    pub inserted: u64,
    /// Data rows left out because they failed to parse
    pub skipped: u64,
    /// Write transactions committed
    pub chunks: u64,
}

/// Validate one data row and turn it into a torrent.
pub fn parse_row(record: &StringRecord) -> Result<NewTorrent, RowError> {
    if record.len() != FIELD_COUNT {
        return Err(RowError::FieldCount(record.len()));
    }

    let field = |i: usize| record.get(i).unwrap_or_default();

    let published_at = NaiveDateTime::parse_from_str(field(0), TIMESTAMP_FORMAT).map_err(|e| {
        RowError::Timestamp {
            value: field(0).to_string(),
            reason: e.to_string(),
        }
    })?;

    let size = field(7).parse::<u64>().map_err(|e| RowError::Size {
        value: field(7).to_string(),
        reason: e.to_string(),
    })?;

    let category = field(8).parse::<i64>().map_err(|e| RowError::Category {
        value: field(8).to_string(),
        reason: e.to_string(),
    })?;

    Ok(NewTorrent {
        published_at,
        hash: field(1).to_string(),
        topic: field(2).to_string(),
        post: field(3).to_string(),
        uploader: field(4).to_string(),
        title: field(5).to_string(),
        description: field(6).to_string(),
        size,
        category,
    })
}

/// Load a CSV file into the store. See [`ingest`].
pub fn ingest_path<S, P>(store: &S, path: P, chunk_size: usize) -> Result<IngestStats, IngestError>
where
    S: TorrentStore + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::SourceUnavailable {
        path: path.display().to_string(),
        source,
    })?;
    ingest(store, file, chunk_size)
}

/// Parse the CSV source and insert the valid rows in chunks of `chunk_size`.
///
/// Chunks are written one after the other, each in its own transaction. A
/// failing chunk stops the load; chunks committed before it are kept.
pub fn ingest<S, R>(store: &S, source: R, chunk_size: usize) -> Result<IngestStats, IngestError>
where
    S: TorrentStore + ?Sized,
    R: Read,
{
    if chunk_size == 0 {
        return Err(IngestError::InvalidChunkSize);
    }

    let mut records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(TrimLeadingSpace::new(source))
        .into_records();

    match records.next() {
        None => return Err(IngestError::MissingHeader),
        Some(Err(e)) if e.is_io_error() => return Err(IngestError::SourceUnreadable(e)),
        Some(_) => {}
    }

    let mut stats = IngestStats::default();
    let mut batch: Vec<NewTorrent> = Vec::with_capacity(chunk_size);

    for result in records {
        let parsed = match result {
            Ok(record) => parse_row(&record).map_err(|e| (line_of(&record), e)),
            Err(e) if e.is_io_error() => return Err(IngestError::SourceUnreadable(e)),
            Err(e) => {
                let line = e.position().map(|p| p.line());
                Err((line, RowError::Undecodable(e.to_string())))
            }
        };

        match parsed {
            Ok(torrent) => batch.push(torrent),
            Err((line, RowError::FieldCount(found))) => {
                debug!(line, found, "Skipping row with wrong field count");
                stats.skipped += 1;
            }
            Err((line, e)) => {
                warn!(line, error = %e, "Skipping malformed row");
                stats.skipped += 1;
            }
        }

        if batch.len() >= chunk_size {
            flush(store, &mut batch, &mut stats)?;
        }
    }

    if !batch.is_empty() {
        flush(store, &mut batch, &mut stats)?;
    }

    info!(
        inserted = stats.inserted,
        skipped = stats.skipped,
        chunks = stats.chunks,
        "Successfully loaded torrents from CSV"
    );
    Ok(stats)
}

fn flush<S>(
    store: &S,
    batch: &mut Vec<NewTorrent>,
    stats: &mut IngestStats,
) -> Result<(), IngestError>
where
    S: TorrentStore + ?Sized,
{
    let chunk = std::mem::take(batch);
    let first = stats.inserted + 1;

    let written = store
        .insert_batch(chunk)
        .map_err(|source| IngestError::BatchWrite {
            inserted: stats.inserted,
            source,
        })?;

    stats.inserted += written as u64;
    stats.chunks += 1;
    info!(
        chunk = stats.chunks,
        first,
        last = stats.inserted,
        "Inserted batch"
    );
    Ok(())
}

fn line_of(record: &StringRecord) -> Option<u64> {
    record.position().map(|p| p.line())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    /// A `"` was seen inside a quoted field: either the closing quote or
    /// the first half of an escaped `""`.
    QuoteInQuoted,
}

/// Drops spaces and tabs at the start of every field before the CSV
/// parser sees them, so `a, "b, c"` yields the quoted field `b, c`.
/// Bytes inside quotes are passed through untouched.
struct TrimLeadingSpace<R> {
    inner: R,
    state: FieldState,
}

impl<R: Read> TrimLeadingSpace<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            state: FieldState::Start,
        }
    }

    /// Advance the state machine by one byte; returns whether to keep it.
    fn keep(&mut self, byte: u8) -> bool {
        let boundary = matches!(byte, b',' | b'\n' | b'\r');
        self.state = match (self.state, byte) {
            (FieldState::Start, b' ' | b'\t') => return false,
            (FieldState::Start, b'"') => FieldState::Quoted,
            (FieldState::Quoted, b'"') => FieldState::QuoteInQuoted,
            (FieldState::Quoted, _) => FieldState::Quoted,
            (FieldState::QuoteInQuoted, b'"') => FieldState::Quoted,
            (_, _) if boundary => FieldState::Start,
            (_, _) => FieldState::Unquoted,
        };
        true
    }
}

impl<R: Read> Read for TrimLeadingSpace<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for i in 0..n {
                let byte = buf[i];
                if self.keep(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }

            // A read made only of leading blanks must not look like EOF
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}
