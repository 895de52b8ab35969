//! Remote task records and the cached task snapshot.
//!
//! Tasks are allocated by the remote service; the core treats them as
//! opaque display data beyond the fields below. The snapshot is the last
//! successfully fetched task list, kept only for offline display.

use crate::report::GeoPoint;
use serde::{Deserialize, Serialize};

/// Priority assigned to a task by the remote allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    Medium,
    Low,
}

/// Remote-side task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// The window in which a task should be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (milliseconds since Unix epoch).
    pub start: u64,
    /// Window end (milliseconds since Unix epoch).
    pub end: u64,
}

/// A remotely-allocated task, as delivered by the task endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: Option<GeoPoint>,
    pub priority: TaskPriority,
    #[serde(default)]
    pub skill_requirements: Vec<String>,
    pub assigned_volunteers: u32,
    pub required_volunteers: u32,
    pub status: TaskStatus,
    /// Creation time (milliseconds since Unix epoch).
    pub created_at: u64,
    pub time_window: Option<TimeWindow>,
}

/// The last successfully fetched task list, cached for offline display.
///
/// At most one snapshot is retained; a new successful fetch overwrites the
/// prior snapshot entirely. Never merged, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
    /// When the snapshot was captured (milliseconds since Unix epoch).
    pub cached_at: u64,
}

impl TaskSnapshot {
    /// Captures a snapshot of the given tasks at the current time.
    #[must_use]
    pub fn capture(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            cached_at: crate::unix_millis(),
        }
    }
}
