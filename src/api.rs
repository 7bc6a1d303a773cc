//! External interface — the remote board API as a trait seam.
//!
//! DESIGN
//! ======
//! The core never prescribes transport, auth, or serialization; it only
//! needs these logical operations to exist. [`crate::rest::RestBoardApi`]
//! is the production implementation; tests substitute recording doubles.
//!
//! Contract: every operation is idempotent with respect to repeated
//! identical calls, and a failed update applies nothing — a task position
//! update changes both `columnId` and `position` or neither.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{BoardSnapshot, Column, Member, MemberRole, NewColumn, NewTask, Tag, Task, TaskPatch};

/// Remote system of record for one project's board.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// PATCH a task's `columnId` and `position` in one atomic write.
    async fn update_task_position(&self, task_id: Uuid, column_id: Uuid, position: usize) -> Result<(), ApiError>;

    /// PATCH a column's `position`.
    async fn update_column_position(&self, column_id: Uuid, position: usize) -> Result<(), ApiError>;

    /// Fetch the full column/task/member/tag graph for a project.
    async fn fetch_board(&self, project_id: Uuid) -> Result<BoardSnapshot, ApiError>;

    async fn create_task(&self, task: NewTask) -> Result<Task, ApiError>;

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> Result<Task, ApiError>;

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ApiError>;

    async fn create_column(&self, column: NewColumn) -> Result<Column, ApiError>;

    /// PATCH a column's name and color.
    async fn update_column(&self, column_id: Uuid, name: String, color: Option<String>) -> Result<Column, ApiError>;

    async fn delete_column(&self, column_id: Uuid) -> Result<(), ApiError>;

    async fn create_tag(&self, name: String, color: String) -> Result<Tag, ApiError>;

    async fn add_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<Member, ApiError>;

    async fn update_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<(), ApiError>;

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), ApiError>;
}
