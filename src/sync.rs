//! Pending-move tracker & debouncer — optimistic moves to the remote API.
//!
//! DESIGN
//! ======
//! Local moves apply instantly; this module owns the other half of the
//! bargain: getting them to the server without firing one call per pixel of
//! drag, and without a stale response clobbering a later move of the same
//! entity.
//!
//! Task moves are delayed by a short fixed window. Recording a new move for
//! a task evicts any older pending entry for it (newest wins), and the
//! delayed worker re-checks its own `(task_id, timestamp)` is still present
//! before firing — a superseded entry is suppressed silently.
//!
//! Column moves coalesce under a single debounce timer: each call replaces
//! the pending entry for that column and re-arms the timer; on fire the
//! whole batch is drained and PATCHed strictly sequentially so the backend
//! never observes interleaved position writes for siblings.
//!
//! ERROR HANDLING
//! ==============
//! Pending entries are removed on success and failure alike so the buffer
//! cannot grow. There is no per-move retry; a `Constraint` rejection means
//! canonical state has drifted, so a full refetch is triggered, gated by a
//! cooldown to avoid refetch storms during transient blips. There is no
//! hard request cancellation: a stale in-flight response is tolerated and
//! filtered out by identity bookkeeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::BoardApi;
use crate::error::{ApiError, ErrorCode};
use crate::store::SharedBoardStore;

// =============================================================================
// TUNING
// =============================================================================

/// Delay before a task move PATCH fires. Trades call volume for staleness.
pub const TASK_SYNC_DELAY: Duration = Duration::from_millis(300);

/// Quiet period before the accumulated column moves flush as one batch.
pub const COLUMN_SYNC_DEBOUNCE: Duration = Duration::from_millis(800);

/// Minimum spacing between drift-recovery refetches.
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(5);

// =============================================================================
// PENDING ENTRIES
// =============================================================================

/// One in-flight optimistic task move awaiting server confirmation.
/// Uniquely identified by `(task_id, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub task_id: Uuid,
    pub source_column_id: Uuid,
    pub target_column_id: Uuid,
    pub target_position: usize,
    pub timestamp: u64,
}

/// One pending column reposition. At most one live entry per column id;
/// a newer move for the same column replaces the older entry outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingColumnMove {
    pub column_id: Uuid,
    pub new_position: usize,
    pub timestamp: u64,
}

// =============================================================================
// TRACKER
// =============================================================================

/// Bridges optimistic local moves to the remote system of record.
///
/// Cheap to clone — all fields are Arc-wrapped, and clones share the same
/// pending buffers and debounce timer (one tracker per board session).
#[derive(Clone)]
pub struct SyncTracker {
    api: Arc<dyn BoardApi>,
    store: SharedBoardStore,
    project_id: Uuid,
    pending_moves: Arc<Mutex<Vec<PendingMove>>>,
    pending_column_moves: Arc<Mutex<Vec<PendingColumnMove>>>,
    /// The single armed debounce timer, if any.
    column_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Process-monotonic stamp source; two rapid moves can never collide.
    clock: Arc<AtomicU64>,
    last_refresh: Arc<Mutex<Option<Instant>>>,
}

impl SyncTracker {
    #[must_use]
    pub fn new(api: Arc<dyn BoardApi>, store: SharedBoardStore, project_id: Uuid) -> Self {
        Self {
            api,
            store,
            project_id,
            pending_moves: Arc::new(Mutex::new(Vec::new())),
            pending_column_moves: Arc::new(Mutex::new(Vec::new())),
            column_timer: Arc::new(Mutex::new(None)),
            clock: Arc::new(AtomicU64::new(0)),
            last_refresh: Arc::new(Mutex::new(None)),
        }
    }

    /// Record a task move and schedule its PATCH after [`TASK_SYNC_DELAY`].
    ///
    /// A newer move for the same task evicts the older pending entry, so at
    /// fire time only the most recent entry can still be present.
    pub async fn sync_task_move(
        &self,
        task_id: Uuid,
        source_column_id: Uuid,
        target_column_id: Uuid,
        target_position: usize,
    ) {
        let timestamp = self.clock.fetch_add(1, Ordering::Relaxed);
        {
            let mut pending = self.pending_moves.lock().await;
            pending.retain(|m| m.task_id != task_id);
            pending.push(PendingMove { task_id, source_column_id, target_column_id, target_position, timestamp });
        }

        let tracker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TASK_SYNC_DELAY).await;

            // Superseded in the interim: not an error, just a stale schedule.
            let still_current = {
                let pending = tracker.pending_moves.lock().await;
                pending.iter().any(|m| m.task_id == task_id && m.timestamp == timestamp)
            };
            if !still_current {
                debug!(%task_id, timestamp, "task move superseded before firing; skipped");
                return;
            }

            let result = tracker.api.update_task_position(task_id, target_column_id, target_position).await;

            // Remove the entry on success and failure alike.
            {
                let mut pending = tracker.pending_moves.lock().await;
                pending.retain(|m| !(m.task_id == task_id && m.timestamp == timestamp));
            }

            match result {
                Ok(()) => {
                    debug!(%task_id, %target_column_id, target_position, "task move confirmed");
                }
                Err(e) => {
                    error!(error = %e, code = e.error_code(), %task_id, "task move sync failed");
                    if matches!(e, ApiError::Constraint { .. }) {
                        tracker.refresh_after_drift().await;
                    }
                }
            }
        });
    }

    /// Record a column move and re-arm the shared debounce timer.
    ///
    /// Any pending entry for the same column is replaced (only the latest
    /// target position survives), and any armed timer is cancelled so the
    /// batch flushes [`COLUMN_SYNC_DEBOUNCE`] after the *last* call.
    pub async fn sync_column_move(&self, column_id: Uuid, new_position: usize) {
        let timestamp = self.clock.fetch_add(1, Ordering::Relaxed);
        {
            let mut pending = self.pending_column_moves.lock().await;
            pending.retain(|m| m.column_id != column_id);
            pending.push(PendingColumnMove { column_id, new_position, timestamp });
        }

        let mut timer = self.column_timer.lock().await;
        if let Some(armed) = timer.take() {
            armed.abort();
        }

        let tracker = self.clone();
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(COLUMN_SYNC_DEBOUNCE).await;
            // Disarm before flushing so a superseding call cannot abort an
            // in-progress batch; it arms a fresh timer instead.
            {
                let mut timer = tracker.column_timer.lock().await;
                *timer = None;
            }
            tracker.flush_column_moves().await;
        }));
    }

    /// Drain the pending column moves and PATCH them one at a time.
    ///
    /// Strictly sequential: one call completes or fails before the next
    /// starts. A failed column is logged and skipped; the rest of the batch
    /// still flushes.
    async fn flush_column_moves(&self) {
        let moves = {
            let mut pending = self.pending_column_moves.lock().await;
            std::mem::take(&mut *pending)
        };
        if moves.is_empty() {
            return;
        }

        debug!(count = moves.len(), "flushing column move batch");
        for mv in moves {
            match self.api.update_column_position(mv.column_id, mv.new_position).await {
                Ok(()) => {
                    debug!(column_id = %mv.column_id, position = mv.new_position, "column move confirmed");
                }
                Err(e) => {
                    error!(error = %e, code = e.error_code(), column_id = %mv.column_id, "column move sync failed");
                    if matches!(e, ApiError::Constraint { .. }) {
                        self.refresh_after_drift().await;
                    }
                }
            }
        }
    }

    /// Refetch canonical state after detected drift, at most once per
    /// [`REFRESH_COOLDOWN`]. The snapshot lands through the store's
    /// structural-equality guard, so an identical echo changes nothing.
    async fn refresh_after_drift(&self) {
        {
            let mut last = self.last_refresh.lock().await;
            if last.is_some_and(|at| at.elapsed() < REFRESH_COOLDOWN) {
                debug!("drift refetch suppressed by cooldown");
                return;
            }
            *last = Some(Instant::now());
        }

        match self.api.fetch_board(self.project_id).await {
            Ok(snapshot) => {
                let mut store = self.store.write().await;
                store.set_columns(snapshot.columns);
                info!(project_id = %self.project_id, "board refetched after sync drift");
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "drift refetch failed; keeping optimistic state");
            }
        }
    }

    /// Snapshot of the pending task moves (newest last).
    pub async fn pending_task_moves(&self) -> Vec<PendingMove> {
        self.pending_moves.lock().await.clone()
    }

    /// Snapshot of the pending column moves (newest last).
    pub async fn pending_column_moves(&self) -> Vec<PendingColumnMove> {
        self.pending_column_moves.lock().await.clone()
    }
}

impl std::fmt::Debug for SyncTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTracker").field("project_id", &self.project_id).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
