//! The sync engine.
//!
//! Reconciles the pending-report queue against the remote service once
//! connectivity is available, without losing or duplicating reports. The
//! engine holds no persistent state of its own: everything it touches is
//! retrieved from, or handed to, the durable store.
//!
//! Connectivity itself is observed by the embedding layer; it invokes
//! [`SyncEngine::drain`] on a connectivity-restored signal (or on an
//! explicit manual request) and passes the current online flag into
//! [`SyncEngine::submit_or_enqueue`].

use crate::error::{SyncError, SyncResult};
use fieldsync_api::{ApiError, ReportApi, SubmitResponse, TaskQuery};
use fieldsync_storage::{ReportStore, StorageSummary};
use fieldsync_types::{DeliveryStatus, Report, ReportId, Task};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters emitted at the end of a drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// True when no report failed during the cycle.
    pub success: bool,
    /// Reports confirmed delivered and removed from the queue.
    pub synced: usize,
    /// Reports still queued after the cycle.
    pub failed: usize,
}

/// Result of a drain trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// A cycle was already in flight; this trigger was coalesced.
    Skipped,
    /// The cycle ran to completion.
    Completed(DrainReport),
}

/// Outcome of a report handed to the front door.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDisposition {
    /// Delivered directly to the remote service.
    Delivered(SubmitResponse),
    /// Persisted into the pending queue, to be sent when connectivity
    /// returns. This is a success, not a failure.
    SavedForLater { id: ReportId },
}

/// Task list handed to the display layer, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum TasksView {
    /// Fresh from the remote allocator.
    Live { tasks: Vec<Task>, last_updated: u64 },
    /// Served from the offline snapshot because the fetch failed.
    Cached { tasks: Vec<Task>, cached_at: u64 },
}

impl TasksView {
    /// The tasks, regardless of provenance.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        match self {
            TasksView::Live { tasks, .. } | TasksView::Cached { tasks, .. } => tasks,
        }
    }
}

/// The sync engine. Drains the pending queue through the remote client and
/// keeps the offline task snapshot fresh.
pub struct SyncEngine {
    store: Arc<ReportStore>,
    api: Arc<dyn ReportApi>,
    /// Concurrency guard: at most one drain cycle in flight.
    draining: AtomicBool,
}

impl SyncEngine {
    /// Creates an engine over the given store and remote client.
    pub fn new(store: Arc<ReportStore>, api: Arc<dyn ReportApi>) -> Self {
        Self {
            store,
            api,
            draining: AtomicBool::new(false),
        }
    }

    // ── Front door ───────────────────────────────────────────────

    /// Validates a report, then either submits it directly (when online)
    /// or persists it into the pending queue.
    ///
    /// A transient submission failure while online is not surfaced: the
    /// report falls through to the queue and the caller gets a
    /// [`SubmitDisposition::SavedForLater`] confirmation. A rejection by
    /// the service ([`ApiError::Client`]) propagates immediately with the
    /// remote message — queueing a payload the service refuses would just
    /// fail again on the next drain.
    pub async fn submit_or_enqueue(
        &self,
        report: Report,
        online: bool,
    ) -> SyncResult<SubmitDisposition> {
        report.validate()?;

        if online {
            match self.api.submit_report(&report).await {
                Ok(response) => {
                    info!(report_id = %report.id, "report delivered directly");
                    return Ok(SubmitDisposition::Delivered(response));
                }
                Err(e) if e.is_retryable() => {
                    warn!(report_id = %report.id, error = %e, "direct submission failed; saving for later");
                }
                Err(e) => return Err(SyncError::Api(e)),
            }
        }

        let stored = self.store.enqueue_report(report).await?;
        info!(report_id = %stored.id, "report saved for later sync");
        Ok(SubmitDisposition::SavedForLater { id: stored.id })
    }

    // ── Drain cycle ──────────────────────────────────────────────

    /// Runs one drain cycle, or coalesces the trigger if one is already in
    /// flight.
    ///
    /// The queued list is snapshotted at cycle start and walked in FIFO
    /// order; reports enqueued mid-cycle wait for the next trigger. One
    /// failing report never blocks the rest.
    pub async fn drain(&self) -> DrainOutcome {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("drain already in flight; trigger coalesced");
            return DrainOutcome::Skipped;
        }

        let report = self.drain_cycle().await;
        self.draining.store(false, Ordering::SeqCst);
        DrainOutcome::Completed(report)
    }

    async fn drain_cycle(&self) -> DrainReport {
        let queue = match self.store.list_queued().await {
            Ok(queue) => queue,
            Err(e) => {
                warn!(error = %e, "failed to read pending queue; skipping cycle");
                Vec::new()
            }
        };

        if queue.is_empty() {
            return DrainReport {
                success: true,
                synced: 0,
                failed: 0,
            };
        }

        info!(count = queue.len(), "draining queued reports");

        let mut synced = 0;
        let mut failed = 0;

        for mut report in queue {
            // A report the service rejected in an earlier cycle stays
            // queued for manual intervention and is not resubmitted.
            if report.status == DeliveryStatus::Failed {
                failed += 1;
                continue;
            }

            report.status = DeliveryStatus::Submitting;
            self.persist_mutation(&report).await;

            match self.api.submit_report(&report).await {
                Ok(_) => match self.store.remove_queued(report.id).await {
                    Ok(()) => {
                        debug!(report_id = %report.id, "queued report delivered");
                        synced += 1;
                    }
                    Err(e) => {
                        // Delivered but still queued; it will be submitted
                        // again next cycle (at-least-once delivery).
                        warn!(report_id = %report.id, error = %e, "failed to remove delivered report");
                        failed += 1;
                    }
                },
                Err(ApiError::Client { status, message }) => {
                    warn!(report_id = %report.id, status, %message, "report rejected by service");
                    report.status = DeliveryStatus::Failed;
                    self.persist_mutation(&report).await;
                    failed += 1;
                }
                Err(e) => {
                    debug!(report_id = %report.id, error = %e, "queued report submission failed");
                    report.status = DeliveryStatus::Queued;
                    report.retry_count += 1;
                    self.persist_mutation(&report).await;
                    failed += 1;
                }
            }
        }

        info!(synced, failed, "drain cycle complete");

        DrainReport {
            success: failed == 0,
            synced,
            failed,
        }
    }

    /// Persists a status/retry-count mutation, best-effort. The queue entry
    /// itself is authoritative; a lost mutation only costs an extra
    /// submission attempt later.
    async fn persist_mutation(&self, report: &Report) {
        if let Err(e) = self.store.update_queued(report.clone()).await {
            warn!(report_id = %report.id, error = %e, "failed to persist report status");
        }
    }

    // ── Task snapshot ────────────────────────────────────────────

    /// Fetches the remote task list, refreshing the offline snapshot on
    /// success and falling back to it on failure.
    ///
    /// The fetch error only surfaces when there is no snapshot to fall
    /// back to.
    pub async fn refresh_tasks(&self, query: &TaskQuery) -> SyncResult<TasksView> {
        match self.api.fetch_tasks(query).await {
            Ok(response) => {
                if let Err(e) = self.store.write_snapshot(response.tasks.clone()).await {
                    warn!(error = %e, "failed to cache task snapshot");
                }
                Ok(TasksView::Live {
                    tasks: response.tasks,
                    last_updated: response.last_updated,
                })
            }
            Err(fetch_err) => {
                warn!(error = %fetch_err, "task fetch failed; trying cached snapshot");
                match self.store.read_snapshot().await {
                    Ok(Some(snapshot)) => Ok(TasksView::Cached {
                        tasks: snapshot.tasks,
                        cached_at: snapshot.cached_at,
                    }),
                    Ok(None) => Err(SyncError::Api(fetch_err)),
                    Err(e) => {
                        warn!(error = %e, "cached snapshot unreadable");
                        Err(SyncError::Api(fetch_err))
                    }
                }
            }
        }
    }

    // ── Display-layer reads ──────────────────────────────────────

    /// The queued reports, in FIFO order. Degrades to empty on a read
    /// failure — the display layer can always render an empty queue.
    pub async fn queued_reports(&self) -> Vec<Report> {
        match self.store.list_queued().await {
            Ok(reports) => reports,
            Err(e) => {
                warn!(error = %e, "failed to list queued reports");
                Vec::new()
            }
        }
    }

    /// Read-only storage aggregate for UI display. Degrades to zeros on a
    /// read failure.
    pub async fn storage_summary(&self) -> StorageSummary {
        match self.store.storage_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "failed to read storage summary");
                StorageSummary {
                    queued_count: 0,
                    cached_count: 0,
                    has_data: false,
                }
            }
        }
    }

    /// Empties the pending queue unconditionally (manual clearing).
    pub async fn clear_queue(&self) -> SyncResult<()> {
        self.store.clear_queue().await?;
        Ok(())
    }
}
