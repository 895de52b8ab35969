//! The durable report store.
//!
//! Owns all persisted state for the sync core. The connection sits behind a
//! mutex, so a full read-modify-write of a partition is atomic with respect
//! to concurrent callers in the same process.

use crate::error::{StorageError, StorageResult};
use crate::{PARTITION_APP_STATE, PARTITION_REPORT_QUEUE, PARTITION_TASK_CACHE};
use fieldsync_types::{unix_millis, DeliveryStatus, Report, ReportId, Task, TaskSnapshot};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Read-only aggregate of stored state, for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSummary {
    /// Number of reports waiting in the pending queue.
    pub queued_count: usize,
    /// Number of tasks in the cached snapshot.
    pub cached_count: usize,
    /// Whether any partition holds data.
    pub has_data: bool,
}

/// Persistent store for queued reports, the task cache and app state,
/// backed by SQLite.
pub struct ReportStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReportStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS partitions (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Runs a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e.to_string())))?
    }

    // ── Pending-report queue ─────────────────────────────────────

    /// Appends a report to the pending queue and persists the full list.
    ///
    /// Forces status `Queued`, resets the retry count and stamps
    /// `queued_at`. The report's identifier is kept as-is; producers that
    /// did not assign one get a fresh one from [`Report::new`].
    ///
    /// Failures here must never be swallowed — a silently dropped report is
    /// a lost incident.
    pub async fn enqueue_report(&self, mut report: Report) -> StorageResult<Report> {
        report.status = DeliveryStatus::Queued;
        report.retry_count = 0;
        report.queued_at = Some(unix_millis());

        let stored = report.clone();
        self.with_conn(move |conn| {
            let mut queue = load_queue(conn)?;
            queue.push(report);
            save_queue(conn, &queue)?;
            debug!(count = queue.len(), "report enqueued for offline sync");
            Ok(())
        })
        .await?;
        Ok(stored)
    }

    /// Returns all queued reports in FIFO insertion order.
    pub async fn list_queued(&self) -> StorageResult<Vec<Report>> {
        self.with_conn(load_queue).await
    }

    /// Removes the report with the given identifier from the queue.
    /// A no-op (not an error) when the id is absent.
    pub async fn remove_queued(&self, id: ReportId) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let mut queue = load_queue(conn)?;
            let before = queue.len();
            queue.retain(|r| r.id != id);
            if queue.len() != before {
                save_queue(conn, &queue)?;
                debug!(%id, "report removed from queue");
            }
            Ok(())
        })
        .await
    }

    /// Replaces the queued report carrying the same identifier.
    /// A no-op when the id is absent (the report may have been removed by
    /// a concurrent drain).
    pub async fn update_queued(&self, report: Report) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let mut queue = load_queue(conn)?;
            let mut changed = false;
            for slot in queue.iter_mut() {
                if slot.id == report.id {
                    *slot = report.clone();
                    changed = true;
                    break;
                }
            }
            if changed {
                save_queue(conn, &queue)?;
            }
            Ok(())
        })
        .await
    }

    /// Empties the pending queue unconditionally.
    pub async fn clear_queue(&self) -> StorageResult<()> {
        self.with_conn(|conn| {
            save_queue(conn, &[])?;
            debug!("report queue cleared");
            Ok(())
        })
        .await
    }

    // ── Task cache ───────────────────────────────────────────────

    /// Overwrites the cached task snapshot with the given tasks.
    pub async fn write_snapshot(&self, tasks: Vec<Task>) -> StorageResult<TaskSnapshot> {
        let snapshot = TaskSnapshot::capture(tasks);
        let stored = snapshot.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&snapshot)?;
            write_partition(conn, PARTITION_TASK_CACHE, &json)?;
            debug!(count = snapshot.tasks.len(), "task snapshot cached");
            Ok(())
        })
        .await?;
        Ok(stored)
    }

    /// Returns the last written snapshot, or `None` if nothing was cached.
    pub async fn read_snapshot(&self) -> StorageResult<Option<TaskSnapshot>> {
        self.with_conn(|conn| {
            let Some(json) = read_partition(conn, PARTITION_TASK_CACHE)? else {
                return Ok(None);
            };
            let snapshot =
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                    partition: PARTITION_TASK_CACHE.to_string(),
                    detail: e.to_string(),
                })?;
            Ok(Some(snapshot))
        })
        .await
    }

    // ── App state ────────────────────────────────────────────────

    /// Overwrites the arbitrary app-state partition.
    pub async fn write_state(&self, value: serde_json::Value) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&value)?;
            write_partition(conn, PARTITION_APP_STATE, &json)?;
            Ok(())
        })
        .await
    }

    /// Returns the app-state value, or `None` if nothing was written.
    pub async fn read_state(&self) -> StorageResult<Option<serde_json::Value>> {
        self.with_conn(|conn| {
            let Some(json) = read_partition(conn, PARTITION_APP_STATE)? else {
                return Ok(None);
            };
            let value = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                partition: PARTITION_APP_STATE.to_string(),
                detail: e.to_string(),
            })?;
            Ok(Some(value))
        })
        .await
    }

    // ── Aggregates ───────────────────────────────────────────────

    /// Returns a read-only summary of stored state.
    pub async fn storage_summary(&self) -> StorageResult<StorageSummary> {
        self.with_conn(|conn| {
            let queued_count = load_queue(conn)?.len();
            let cached_count = match read_partition(conn, PARTITION_TASK_CACHE)? {
                Some(json) => serde_json::from_str::<TaskSnapshot>(&json)
                    .map(|s| s.tasks.len())
                    .unwrap_or(0),
                None => 0,
            };
            Ok(StorageSummary {
                queued_count,
                cached_count,
                has_data: queued_count > 0 || cached_count > 0,
            })
        })
        .await
    }
}

fn load_queue(conn: &Connection) -> StorageResult<Vec<Report>> {
    let Some(json) = read_partition(conn, PARTITION_REPORT_QUEUE)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
        partition: PARTITION_REPORT_QUEUE.to_string(),
        detail: e.to_string(),
    })
}

fn save_queue(conn: &Connection, queue: &[Report]) -> StorageResult<()> {
    let json = serde_json::to_string(queue)?;
    write_partition(conn, PARTITION_REPORT_QUEUE, &json)
}

fn read_partition(conn: &Connection, name: &str) -> StorageResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM partitions WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn write_partition(conn: &Connection, name: &str, value: &str) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO partitions (name, value) VALUES (?1, ?2)",
        params![name, value],
    )?;
    Ok(())
}
