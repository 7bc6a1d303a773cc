//! Board data model — columns, tasks, tags, members, and drag state.
//!
//! DESIGN
//! ======
//! Mirrors the project-management REST API's JSON shapes (camelCase on the
//! wire). Ordering is carried by the `position` field, never by array order:
//! task positions within a column are a dense 0-based sequence, and column
//! positions among siblings are a dense permutation of `[0..n)`.
//!
//! All structural rewrites of `position` go through the `position` module so
//! the dense invariant is re-established after every move/add/remove.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Feature,
    Bug,
    #[default]
    Task,
    Improvement,
}

/// Role of a project member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
    Viewer,
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A user account, as embedded in `Task::assigned_to` and `Member::user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A label attached to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

/// A project member with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub role: MemberRole,
    pub project_id: Uuid,
    pub user: User,
}

/// A task card. Belongs to exactly one column at any instant; `position`
/// is its dense 0-based rank within that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub position: usize,
    pub column_id: Uuid,
    pub project_id: Uuid,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<User>,
}

/// An ordered lane of tasks. `position` is the column's rank among its
/// siblings; array order in `BoardState::columns` is not authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub position: usize,
    pub project_id: Uuid,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Full column/tag/member graph for one project, as returned by the bulk
/// read endpoint. Used to hydrate the store and to recover after persistent
/// sync failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub members: Vec<Member>,
}

// =============================================================================
// DRAG STATE
// =============================================================================

/// Whether a column or a task is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Column,
    Task,
}

/// Transient drag state. Exists only between drag-start and drag-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub kind: DragKind,
    pub id: Uuid,
    pub source_index: usize,
    /// Set for task drags; `None` for column drags.
    pub source_column_id: Option<Uuid>,
}

// =============================================================================
// DRAFTS AND PATCHES
// =============================================================================

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub priority: TaskPriority,
    pub column_id: Uuid,
    pub project_id: Uuid,
    pub position: usize,
    pub tag_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

/// Payload for creating a column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub position: usize,
    pub project_id: Uuid,
}

/// Partial update for a task's editable fields. `None` leaves a field
/// untouched; `position` and `column_id` are never patched here — structural
/// moves go through `MoveTask` and the sync tracker instead.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaskKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
