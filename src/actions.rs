//! Board actions — the facade UI code talks to.
//!
//! DESIGN
//! ======
//! Wires the three halves together: optimistic transitions on the store,
//! scheduled remote syncs through the tracker, and plain CRUD against the
//! API. Drag gestures never wait on the network — a move dispatches locally
//! first and the tracker settles with the server afterwards.
//!
//! CRUD ordering mirrors what each operation needs: creates and edits go to
//! the server first so the authoritative entity (with its server-assigned
//! fields) lands in the store; removals and member role changes apply
//! optimistically and sync behind.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::api::BoardApi;
use crate::drag::{DropTarget, MoveCommand, resolve_drop};
use crate::error::ApiError;
use crate::model::{
    Column, DragKind, DragState, Member, MemberRole, NewColumn, NewTask, Tag, Task, TaskPatch,
};
use crate::store::{BoardAction, BoardStore, SharedBoardStore};
use crate::sync::SyncTracker;

/// One board session's entry point: store handle + sync tracker + API.
#[derive(Clone)]
pub struct BoardActions {
    store: SharedBoardStore,
    tracker: SyncTracker,
    api: Arc<dyn BoardApi>,
    project_id: Uuid,
}

impl BoardActions {
    #[must_use]
    pub fn new(api: Arc<dyn BoardApi>, project_id: Uuid) -> Self {
        let store = BoardStore::shared(project_id);
        let tracker = SyncTracker::new(Arc::clone(&api), Arc::clone(&store), project_id);
        Self { store, tracker, api, project_id }
    }

    /// The shared store handle, for readers and subscribers.
    #[must_use]
    pub fn store(&self) -> &SharedBoardStore {
        &self.store
    }

    #[must_use]
    pub fn tracker(&self) -> &SyncTracker {
        &self.tracker
    }

    /// Load the full board graph from the server into the store. The column
    /// replacement goes through the structural-equality guard.
    ///
    /// # Errors
    ///
    /// Returns the API error if the bulk read fails; the store keeps its
    /// current state in that case.
    pub async fn hydrate(&self) -> Result<(), ApiError> {
        let snapshot = self.api.fetch_board(self.project_id).await?;
        let mut store = self.store.write().await;
        store.set_columns(snapshot.columns);
        store.dispatch(BoardAction::SetTags(snapshot.tags));
        store.dispatch(BoardAction::SetMembers(snapshot.members));
        Ok(())
    }

    // =========================================================================
    // MOVES
    // =========================================================================

    /// Optimistically move a task and schedule the remote sync.
    pub async fn move_task(&self, task_id: Uuid, from_column_id: Uuid, to_column_id: Uuid, to_index: usize) {
        {
            let mut store = self.store.write().await;
            store.dispatch(BoardAction::MoveTask { task_id, from_column_id, to_column_id, to_index });
        }
        self.tracker.sync_task_move(task_id, from_column_id, to_column_id, to_index).await;
    }

    /// Optimistically move a column and schedule the debounced sync.
    ///
    /// An out-of-range target is rejected before any state mutation or
    /// scheduling, with a warning.
    pub async fn move_column(&self, from_index: usize, to_index: usize) {
        let column_id = {
            let store = self.store.read().await;
            let columns = &store.state().columns;
            if from_index >= columns.len() || to_index >= columns.len() {
                warn!(from_index, to_index, len = columns.len(), "invalid column move target; ignored");
                return;
            }
            columns[from_index].id
        };

        {
            let mut store = self.store.write().await;
            store.dispatch(BoardAction::MoveColumn { from_index, to_index });
        }
        self.tracker.sync_column_move(column_id, to_index).await;
    }

    // =========================================================================
    // DRAG SESSION
    // =========================================================================

    pub async fn start_task_drag(&self, task_id: Uuid, source_index: usize, source_column_id: Uuid) {
        let drag = DragState {
            kind: DragKind::Task,
            id: task_id,
            source_index,
            source_column_id: Some(source_column_id),
        };
        self.store.write().await.dispatch(BoardAction::StartDrag(drag));
    }

    pub async fn start_column_drag(&self, column_id: Uuid, source_index: usize) {
        let drag = DragState { kind: DragKind::Column, id: column_id, source_index, source_column_id: None };
        self.store.write().await.dispatch(BoardAction::StartDrag(drag));
    }

    /// Handle a drag-end event. Drag state is cleared unconditionally —
    /// whether or not a move resolved — and a resolved command is applied
    /// and synced.
    pub async fn end_drag(&self, over: Option<DropTarget>) {
        let command = {
            let mut store = self.store.write().await;
            let command = store
                .state()
                .dragged_item
                .clone()
                .and_then(|drag| resolve_drop(&store.state().columns, &drag, over.as_ref()));
            store.dispatch(BoardAction::EndDrag);
            command
        };

        match command {
            Some(MoveCommand::Task { task_id, from_column_id, to_column_id, to_index }) => {
                self.move_task(task_id, from_column_id, to_column_id, to_index).await;
            }
            Some(MoveCommand::Column { from_index, to_index }) => {
                self.move_column(from_index, to_index).await;
            }
            None => {}
        }
    }

    // =========================================================================
    // TASK CRUD
    // =========================================================================

    /// Create a task at the end of a column. Server first, then the store
    /// appends the authoritative entity with a dense position.
    ///
    /// # Errors
    ///
    /// Returns the API error if creation fails; the store is untouched.
    pub async fn add_task(&self, column_id: Uuid, mut draft: NewTask) -> Result<Task, ApiError> {
        draft.column_id = column_id;
        draft.project_id = self.project_id;
        draft.position = {
            let store = self.store.read().await;
            store
                .state()
                .columns
                .iter()
                .find(|col| col.id == column_id)
                .and_then(|col| col.tasks.iter().map(|t| t.position).max())
                .map_or(0, |max| max + 1)
        };

        let task = self.api.create_task(draft).await?;
        self.store.write().await.dispatch(BoardAction::AddTask { column_id, task: task.clone() });
        Ok(task)
    }

    /// Patch a task's editable fields. Server first, then the store.
    ///
    /// # Errors
    ///
    /// Returns the API error if the update fails; the store is untouched.
    pub async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> Result<Task, ApiError> {
        let task = self.api.update_task(task_id, patch.clone()).await?;
        self.store.write().await.dispatch(BoardAction::UpdateTask { task_id, patch });
        Ok(task)
    }

    /// Remove a task optimistically, then delete it remotely.
    ///
    /// # Errors
    ///
    /// Returns the API error if the remote delete fails. The optimistic
    /// removal stands either way; a later refetch reconciles divergence.
    pub async fn remove_task(&self, column_id: Uuid, task_id: Uuid) -> Result<(), ApiError> {
        self.store.write().await.dispatch(BoardAction::RemoveTask { column_id, task_id });
        self.api.delete_task(task_id).await
    }

    // =========================================================================
    // COLUMN CRUD
    // =========================================================================

    /// Create a column, appended after the current last position by default.
    ///
    /// # Errors
    ///
    /// Returns the API error if creation fails; the store is untouched.
    pub async fn create_column(&self, name: String, color: Option<String>, position: Option<usize>) -> Result<Column, ApiError> {
        let position = match position {
            Some(p) => p,
            None => self.store.read().await.state().columns.len(),
        };
        let column = self
            .api
            .create_column(NewColumn { name, color, position, project_id: self.project_id })
            .await?;
        self.store.write().await.dispatch(BoardAction::AddColumn(column.clone()));
        Ok(column)
    }

    /// Rename/recolor a column. Server first; the column's current task list
    /// is preserved across the replacement.
    ///
    /// # Errors
    ///
    /// Returns the API error if the update fails; the store is untouched.
    pub async fn update_column(&self, column_id: Uuid, name: String, color: Option<String>) -> Result<Column, ApiError> {
        let mut column = self.api.update_column(column_id, name, color).await?;
        let mut store = self.store.write().await;
        if let Some(current) = store.state().columns.iter().find(|col| col.id == column_id) {
            column.tasks = current.tasks.clone();
        }
        store.dispatch(BoardAction::UpdateColumn { column_id, column: column.clone() });
        Ok(column)
    }

    /// Delete a column remotely, then drop it from the store.
    ///
    /// # Errors
    ///
    /// Returns the API error if the remote delete fails; the store is
    /// untouched in that case.
    pub async fn delete_column(&self, column_id: Uuid) -> Result<(), ApiError> {
        self.api.delete_column(column_id).await?;
        self.store.write().await.dispatch(BoardAction::RemoveColumn(column_id));
        Ok(())
    }

    // =========================================================================
    // TAGS AND MEMBERS
    // =========================================================================

    /// Create a tag and register it on the board.
    ///
    /// # Errors
    ///
    /// Returns the API error if creation fails; the store is untouched.
    pub async fn add_tag(&self, name: String, color: String) -> Result<Tag, ApiError> {
        let tag = self.api.create_tag(name, color).await?;
        self.store.write().await.dispatch(BoardAction::AddTag(tag.clone()));
        Ok(tag)
    }

    /// Add a project member.
    ///
    /// # Errors
    ///
    /// Returns the API error if the server rejects the membership.
    pub async fn add_member(&self, user_id: Uuid, role: MemberRole) -> Result<Member, ApiError> {
        let member = self.api.add_member(self.project_id, user_id, role).await?;
        self.store.write().await.dispatch(BoardAction::AddMember(member.clone()));
        Ok(member)
    }

    /// Change a member's role optimistically, then sync.
    ///
    /// # Errors
    ///
    /// Returns the API error if the remote update fails. The optimistic
    /// change stands either way.
    pub async fn update_member(&self, member: &Member, role: MemberRole) -> Result<(), ApiError> {
        self.store.write().await.dispatch(BoardAction::UpdateMember { member_id: member.id, role });
        self.api.update_member(self.project_id, member.user.id, role).await
    }

    /// Remove a member remotely, then drop them from the store.
    ///
    /// # Errors
    ///
    /// Returns the API error if the remote removal fails; the store is
    /// untouched in that case.
    pub async fn remove_member(&self, member: &Member) -> Result<(), ApiError> {
        self.api.remove_member(self.project_id, member.user.id).await?;
        self.store.write().await.dispatch(BoardAction::RemoveMember(member.id));
        Ok(())
    }
}

impl std::fmt::Debug for BoardActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardActions").field("project_id", &self.project_id).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;
