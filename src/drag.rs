//! Drag session controller — gesture events to semantic move commands.
//!
//! DESIGN
//! ======
//! The drag library is an external collaborator: it reports what started
//! dragging and what it was dropped on, plus an optional sortable-index
//! hint. This module translates that into the board's vocabulary — a
//! `MoveCommand` the store and sync tracker understand — or `None` when the
//! drop changes nothing.
//!
//! The session itself is `Idle -> Dragging -> Idle`; the transition back to
//! `Idle` is unconditional on drag-end (the caller dispatches `EndDrag`
//! whether or not a move resolved), so a release outside any droppable area
//! can never leave a stuck drag overlay.

use uuid::Uuid;

use crate::model::{Column, DragKind, DragState, Task};

// =============================================================================
// TYPES
// =============================================================================

/// What the dragged item was released on, as reported by the gesture layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Dropped on another task. `sortable_index` is the drag library's
    /// visual index hint when it has one.
    Task { task_id: Uuid, sortable_index: Option<usize> },
    /// Dropped on a column's empty-drop-zone marker.
    ColumnDropZone { column_id: Uuid },
    /// Dropped on a column header or body.
    Column { column_id: Uuid },
    /// Anything else the gesture layer attaches hints to.
    Hint { column_id: Option<Uuid>, index: Option<usize> },
}

/// A resolved, semantic move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveCommand {
    Column { from_index: usize, to_index: usize },
    Task { task_id: Uuid, from_column_id: Uuid, to_column_id: Uuid, to_index: usize },
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve a drag-end event against the current column list.
///
/// Returns `None` when the drop is a no-op: released outside any droppable,
/// dropped on itself, or resolved back to the task's current column and
/// visual index. A `None` must produce zero store mutations and zero
/// scheduled network calls.
#[must_use]
pub fn resolve_drop(columns: &[Column], drag: &DragState, over: Option<&DropTarget>) -> Option<MoveCommand> {
    let over = over?;

    match drag.kind {
        DragKind::Column => resolve_column_drop(columns, drag, over),
        DragKind::Task => resolve_task_drop(columns, drag, over),
    }
}

fn resolve_column_drop(columns: &[Column], drag: &DragState, over: &DropTarget) -> Option<MoveCommand> {
    let target_column_id = match over {
        DropTarget::Column { column_id } | DropTarget::ColumnDropZone { column_id } => *column_id,
        DropTarget::Hint { column_id, .. } => (*column_id)?,
        // A column released over a task resolves to that task's column.
        DropTarget::Task { task_id, .. } => find_task(columns, *task_id)?.column_id,
    };

    if target_column_id == drag.id {
        return None;
    }

    let from_index = columns.iter().position(|col| col.id == drag.id)?;
    let to_index = columns.iter().position(|col| col.id == target_column_id)?;
    if from_index == to_index {
        return None;
    }

    Some(MoveCommand::Column { from_index, to_index })
}

fn resolve_task_drop(columns: &[Column], drag: &DragState, over: &DropTarget) -> Option<MoveCommand> {
    let source_column_id = drag.source_column_id?;

    // Dropped on itself: nothing to do.
    if let DropTarget::Task { task_id, .. } = over {
        if *task_id == drag.id {
            return None;
        }
    }

    let (to_column_id, to_index) = match over {
        DropTarget::Task { task_id, sortable_index } => match find_task(columns, *task_id) {
            Some(over_task) => {
                let column_id = over_task.column_id;
                let index = sortable_index
                    .or_else(|| sorted_index_of(columns, column_id, *task_id))
                    .unwrap_or(0);
                (column_id, index)
            }
            // Target task vanished mid-gesture: stay in the source column.
            None => (source_column_id, 0),
        },
        DropTarget::ColumnDropZone { column_id } | DropTarget::Column { column_id } => {
            let len = columns.iter().find(|col| col.id == *column_id).map_or(0, |col| col.tasks.len());
            (*column_id, len)
        }
        DropTarget::Hint { column_id, index } => {
            (column_id.unwrap_or(source_column_id), index.unwrap_or(0))
        }
    };

    // No-op guard: dropping back at the current visual position must not
    // dispatch a move or schedule a sync.
    if to_column_id == source_column_id {
        if let Some(current) = sorted_index_of(columns, source_column_id, drag.id) {
            if current == to_index {
                return None;
            }
        }
    }

    Some(MoveCommand::Task {
        task_id: drag.id,
        from_column_id: source_column_id,
        to_column_id,
        to_index,
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn find_task(columns: &[Column], task_id: Uuid) -> Option<&Task> {
    columns.iter().flat_map(|col| col.tasks.iter()).find(|t| t.id == task_id)
}

/// Index of a task among its column's position-sorted tasks.
fn sorted_index_of(columns: &[Column], column_id: Uuid, task_id: Uuid) -> Option<usize> {
    let column = columns.iter().find(|col| col.id == column_id)?;
    let mut sorted: Vec<&Task> = column.tasks.iter().collect();
    sorted.sort_by_key(|t| t.position);
    sorted.iter().position(|t| t.id == task_id)
}

#[cfg(test)]
#[path = "drag_test.rs"]
mod tests;
