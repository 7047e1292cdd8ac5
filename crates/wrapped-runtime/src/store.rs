//! Generation-guarded holder of the current [`Session`].
//!
//! Every load starts by taking a [`BatchTicket`]. When a newer batch is
//! started before an older one finishes, the older result is discarded on
//! commit, so the visible session always belongs to the latest batch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};
use wrapped_core::error::{Result, WrappedError};
use wrapped_core::time_utils::TimezoneHandler;
use wrapped_data::detector::detect;

use crate::loader::load_batch;
use crate::session::Session;

/// Proof that a batch was started; carries its generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTicket {
    generation: u64,
}

impl BatchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ── SessionStore ──────────────────────────────────────────────────────────────

/// Shared, thread-safe slot for the committed session.
///
/// # Example
/// ```
/// use wrapped_runtime::store::SessionStore;
///
/// let store = SessionStore::new();
/// let first = store.begin_batch();
/// let second = store.begin_batch();
/// assert!(!store.is_current(first));
/// assert!(store.is_current(second));
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    generation: AtomicU64,
    current: Mutex<Option<Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch, superseding every earlier one.
    pub fn begin_batch(&self) -> BatchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "batch started");
        BatchTicket { generation }
    }

    /// `true` while no newer batch has been started after `ticket`.
    pub fn is_current(&self, ticket: BatchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Install `session` if `ticket` is still the latest batch.
    ///
    /// Returns the installed session, or `None` (dropping `session`) for a
    /// superseded batch.
    pub fn commit(&self, ticket: BatchTicket, session: Session) -> Option<Arc<Session>> {
        let mut slot = self.lock();
        if !self.is_current(ticket) {
            info!(
                stale = ticket.generation,
                latest = self.generation.load(Ordering::SeqCst),
                "discarding result of superseded batch"
            );
            return None;
        }
        let session = Arc::new(session);
        *slot = Some(Arc::clone(&session));
        debug!(generation = ticket.generation, "session committed");
        Some(session)
    }

    /// The committed session, if any.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Session>>> {
        // The slot is only ever assigned whole, so a poisoned lock is still consistent.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ── ingest ────────────────────────────────────────────────────────────────────

/// Load, classify and commit one batch of files.
///
/// Returns the session this batch committed, `Ok(None)` when a newer batch
/// superseded it, or the batch's error. On error the store is left untouched.
pub async fn ingest(
    store: &SessionStore,
    paths: Vec<PathBuf>,
    tz: TimezoneHandler,
    year: i32,
) -> Result<Option<Arc<Session>>> {
    let ticket = store.begin_batch();

    let payloads = load_batch(paths).await?;
    let session = tokio::task::spawn_blocking(move || {
        detect(payloads).map(|dataset| Session::from_dataset(dataset, tz, year))
    })
    .await
    .map_err(|e| WrappedError::Io(e.into()))??;

    Ok(store.commit(ticket, session))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
