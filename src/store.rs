//! Board state store — single source of truth for board structure.
//!
//! DESIGN
//! ======
//! State transitions are reducer-style: `reduce` takes the current state and
//! a `BoardAction` and returns the next state, with no hidden mutation. The
//! `BoardStore` wrapper owns the state, runs the reducer on `dispatch`, and
//! notifies subscribers so derived views (the filter projection) can
//! recompute reactively.
//!
//! ERROR HANDLING
//! ==============
//! Every transition is a total function: an action referencing an id that no
//! longer exists is a no-op, never a panic and never an error log. A stale
//! UI event arriving after an unrelated deletion is normal, not a bug.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{Column, DragState, Member, MemberRole, Tag, Task, TaskPatch};
use crate::position::{move_to_another_column, recalculate_positions, reorder_in_same_column};

// =============================================================================
// STATE
// =============================================================================

/// Canonical client-side view of one project's board.
///
/// Created on project load, replaced wholesale when a server snapshot
/// materially differs (see [`BoardStore::set_columns`]), dropped on
/// navigation away.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub columns: Vec<Column>,
    pub tags: Vec<Tag>,
    pub members: Vec<Member>,
    pub dragged_item: Option<DragState>,
    pub project_id: Uuid,
}

impl BoardState {
    #[must_use]
    pub fn new(project_id: Uuid) -> Self {
        Self { project_id, ..Self::default() }
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Every transition the board state can undergo.
#[derive(Debug, Clone)]
pub enum BoardAction {
    SetColumns(Vec<Column>),
    MoveColumn { from_index: usize, to_index: usize },
    AddColumn(Column),
    UpdateColumn { column_id: Uuid, column: Column },
    RemoveColumn(Uuid),
    MoveTask { task_id: Uuid, from_column_id: Uuid, to_column_id: Uuid, to_index: usize },
    StartDrag(DragState),
    EndDrag,
    AddTask { column_id: Uuid, task: Task },
    UpdateTask { task_id: Uuid, patch: TaskPatch },
    RemoveTask { column_id: Uuid, task_id: Uuid },
    AddTag(Tag),
    SetTags(Vec<Tag>),
    SetMembers(Vec<Member>),
    AddMember(Member),
    UpdateMember { member_id: Uuid, role: MemberRole },
    RemoveMember(Uuid),
}

// =============================================================================
// REDUCER
// =============================================================================

/// Apply one action to the state and return the next state.
#[must_use]
pub fn reduce(state: BoardState, action: BoardAction) -> BoardState {
    match action {
        BoardAction::SetColumns(columns) => BoardState { columns, ..state },

        BoardAction::MoveColumn { from_index, to_index } => {
            let mut columns = state.columns;
            if from_index >= columns.len() || to_index >= columns.len() {
                return BoardState { columns, ..state };
            }
            let moved = columns.remove(from_index);
            columns.insert(to_index, moved);
            BoardState { columns, ..state }
        }

        BoardAction::AddColumn(column) => {
            let mut columns = state.columns;
            columns.push(column);
            BoardState { columns, ..state }
        }

        BoardAction::UpdateColumn { column_id, column } => {
            let columns = state
                .columns
                .into_iter()
                .map(|col| if col.id == column_id { column.clone() } else { col })
                .collect();
            BoardState { columns, ..state }
        }

        BoardAction::RemoveColumn(column_id) => {
            // Column positions keep their gaps until the next explicit
            // reorder; they are set per mutation, not by array index.
            let columns = state.columns.into_iter().filter(|col| col.id != column_id).collect();
            BoardState { columns, ..state }
        }

        BoardAction::MoveTask { task_id, from_column_id, to_column_id, to_index } => {
            move_task(state, task_id, from_column_id, to_column_id, to_index)
        }

        BoardAction::StartDrag(drag) => BoardState { dragged_item: Some(drag), ..state },

        BoardAction::EndDrag => BoardState { dragged_item: None, ..state },

        BoardAction::AddTask { column_id, task } => {
            let columns = state
                .columns
                .into_iter()
                .map(|mut col| {
                    if col.id == column_id {
                        col.tasks.push(task.clone());
                        recalculate_positions(&mut col.tasks);
                    }
                    col
                })
                .collect();
            BoardState { columns, ..state }
        }

        BoardAction::UpdateTask { task_id, patch } => {
            let columns = state
                .columns
                .into_iter()
                .map(|mut col| {
                    for task in &mut col.tasks {
                        if task.id == task_id {
                            apply_task_patch(task, &patch);
                        }
                    }
                    col
                })
                .collect();
            BoardState { columns, ..state }
        }

        BoardAction::RemoveTask { column_id, task_id } => {
            let columns = state
                .columns
                .into_iter()
                .map(|mut col| {
                    if col.id == column_id {
                        col.tasks.retain(|t| t.id != task_id);
                        recalculate_positions(&mut col.tasks);
                    }
                    col
                })
                .collect();
            BoardState { columns, ..state }
        }

        BoardAction::AddTag(tag) => {
            let mut tags = state.tags;
            tags.push(tag);
            BoardState { tags, ..state }
        }

        BoardAction::SetTags(tags) => BoardState { tags, ..state },

        BoardAction::SetMembers(members) => BoardState { members, ..state },

        BoardAction::AddMember(member) => {
            let mut members = state.members;
            members.push(member);
            BoardState { members, ..state }
        }

        BoardAction::UpdateMember { member_id, role } => {
            let members = state
                .members
                .into_iter()
                .map(|mut m| {
                    if m.id == member_id {
                        m.role = role;
                    }
                    m
                })
                .collect();
            BoardState { members, ..state }
        }

        BoardAction::RemoveMember(member_id) => {
            let members = state.members.into_iter().filter(|m| m.id != member_id).collect();
            BoardState { members, ..state }
        }
    }
}

fn move_task(
    state: BoardState,
    task_id: Uuid,
    from_column_id: Uuid,
    to_column_id: Uuid,
    to_index: usize,
) -> BoardState {
    // EDGE: stale gesture after the task was deleted elsewhere — no-op.
    let Some(task) = state.columns.iter().flat_map(|col| col.tasks.iter()).find(|t| t.id == task_id).cloned()
    else {
        return state;
    };

    let columns = state
        .columns
        .into_iter()
        .map(|mut col| {
            if col.id == from_column_id && col.id == to_column_id {
                col.tasks = reorder_in_same_column(std::mem::take(&mut col.tasks), task_id, to_index);
            } else if col.id == from_column_id {
                let (source, _) =
                    move_to_another_column(std::mem::take(&mut col.tasks), Vec::new(), task.clone(), 0, to_column_id);
                col.tasks = source;
            } else if col.id == to_column_id {
                let (_, target) =
                    move_to_another_column(Vec::new(), std::mem::take(&mut col.tasks), task.clone(), to_index, to_column_id);
                col.tasks = target;
            }
            col
        })
        .collect();

    BoardState { columns, ..state }
}

fn apply_task_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        task.title = title.clone();
    }
    if let Some(description) = &patch.description {
        task.description = Some(description.clone());
    }
    if let Some(kind) = patch.kind {
        task.kind = kind;
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(start) = patch.start_date {
        task.start_date = Some(start);
    }
    if let Some(end) = patch.end_date {
        task.end_date = Some(end);
    }
    if let Some(due) = patch.due_date {
        task.due_date = Some(due);
    }
}

// =============================================================================
// HYDRATION EQUALITY
// =============================================================================

/// Structural equality used to gate wholesale column replacement.
///
/// Compares column id/name/color/position and the set of (task id, column id)
/// pairs per column, task order ignored. A server echo that matches on all of
/// these carries no structural news and must not clobber an in-progress
/// optimistic drag.
#[must_use]
pub fn are_columns_equal(a: &[Column], b: &[Column]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).all(|(col_a, col_b)| {
        if col_a.id != col_b.id
            || col_a.name != col_b.name
            || col_a.color != col_b.color
            || col_a.position != col_b.position
            || col_a.tasks.len() != col_b.tasks.len()
        {
            return false;
        }

        let mut ids_a: Vec<(Uuid, Uuid)> = col_a.tasks.iter().map(|t| (t.id, t.column_id)).collect();
        let mut ids_b: Vec<(Uuid, Uuid)> = col_b.tasks.iter().map(|t| (t.id, t.column_id)).collect();
        ids_a.sort_unstable();
        ids_b.sort_unstable();
        ids_a == ids_b
    })
}

// =============================================================================
// STORE
// =============================================================================

/// Subscriber callback invoked after every applied transition.
pub type Subscriber = Box<dyn Fn(&BoardState) + Send + Sync>;

/// Shared handle to a [`BoardStore`]. All consumers (actions facade, sync
/// tracker, views) hold this handle; the store is only ever mutated through
/// `dispatch`, so transitions stay atomic from a caller's perspective.
pub type SharedBoardStore = Arc<RwLock<BoardStore>>;

/// Owns the canonical [`BoardState`] and the subscriber list.
pub struct BoardStore {
    state: BoardState,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber_id: u64,
}

impl BoardStore {
    #[must_use]
    pub fn new(project_id: Uuid) -> Self {
        Self::with_state(BoardState::new(project_id))
    }

    #[must_use]
    pub fn with_state(state: BoardState) -> Self {
        Self { state, subscribers: Vec::new(), next_subscriber_id: 0 }
    }

    /// Wrap a new store in the shared handle used by the rest of the crate.
    #[must_use]
    pub fn shared(project_id: Uuid) -> SharedBoardStore {
        Arc::new(RwLock::new(Self::new(project_id)))
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Apply an action through the reducer and notify subscribers.
    pub fn dispatch(&mut self, action: BoardAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.state);
        }
    }

    /// Replace the column set from a server snapshot, but only when it
    /// structurally differs from what we already have. An identical or stale
    /// echo is dropped so it cannot flicker an in-progress drag back to a
    /// pre-move server state.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        if !are_columns_equal(&self.state.columns, &columns) {
            self.dispatch(BoardAction::SetColumns(columns));
        }
    }

    /// Register a callback to run after every transition. Returns a token
    /// for [`BoardStore::unsubscribe`].
    pub fn subscribe(&mut self, subscriber: Subscriber) -> u64 {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, token: u64) {
        self.subscribers.retain(|(id, _)| *id != token);
    }
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
