//! Startup seeding: load the dump only when the catalog is empty.

use tracing::{info, warn};

use crate::ingest::{IngestError, IngestStats};
use crate::storage::{DatabaseError, TorrentStore};

/// What happened at startup.
#[derive(Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The store already held this many torrents; nothing was loaded.
    AlreadySeeded(u64),
    /// The store was empty and the seed completed.
    Seeded(IngestStats),
    /// The store was empty and the seed failed. The catalog may be partial.
    SeedFailed,
}

/// Run `seed` if and only if the store holds no torrents.
///
/// A failing seed is logged and reported as [`BootstrapOutcome::SeedFailed`]
/// so the service can still start. Only a failure to count is returned as an error.
pub fn ensure_seeded<S, F>(store: &S, seed: F) -> Result<BootstrapOutcome, DatabaseError>
where
    S: TorrentStore + ?Sized,
    F: FnOnce(&S) -> Result<IngestStats, IngestError>,
{
    let count = store.count_torrents()?;
    if count > 0 {
        info!(torrents = count, "Catalog already populated, skipping CSV load");
        return Ok(BootstrapOutcome::AlreadySeeded(count));
    }

    info!("Catalog is empty, loading CSV data");
    match seed(store) {
        Ok(stats) => Ok(BootstrapOutcome::Seeded(stats)),
        Err(e) => {
            warn!(error = %e, "Failed to load CSV data");
            Ok(BootstrapOutcome::SeedFailed)
        }
    }
}
