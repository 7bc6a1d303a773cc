//! Position reconciliation — dense ordinal recompute after structural moves.
//!
//! DESIGN
//! ======
//! Positions are always rewritten as array indices after any structural
//! change, rather than using fractional/gap-based keys. A move rewrites the
//! whole column's positions, which is acceptable because column sizes are
//! UI-bounded, and it removes the need for rebalancing logic entirely.
//!
//! Both helpers are total: a reference to a task id that is not present
//! degrades to returning the input unchanged, so a stale gesture can never
//! corrupt a column.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::Task;

/// Rewrite every task's `position` to its array index.
pub fn recalculate_positions(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.position = index;
    }
}

/// Reorder a task within its own column.
///
/// Tasks are stable-sorted by `position` (ties keep their array order), the
/// target is removed and reinserted at `to_index` (clamped into range), and
/// positions are recomputed densely. Unknown `task_id` returns the input
/// unchanged.
#[must_use]
pub fn reorder_in_same_column(tasks: Vec<Task>, task_id: Uuid, to_index: usize) -> Vec<Task> {
    if !tasks.iter().any(|t| t.id == task_id) {
        return tasks;
    }

    let mut sorted = tasks;
    sorted.sort_by_key(|t| t.position);
    let Some(found) = sorted.iter().position(|t| t.id == task_id) else {
        return sorted;
    };
    let task = sorted.remove(found);

    let index = to_index.min(sorted.len());
    sorted.insert(index, task);
    recalculate_positions(&mut sorted);
    sorted
}

/// Move a task from one column's task list into another's.
///
/// Returns `(source, target)` where the source list has the task removed and
/// positions recomputed, and the target list has the task — rewritten to
/// `to_column_id` — inserted at `to_index` (clamped) among its
/// position-sorted tasks, de-duplicated by id, and recomputed densely.
///
/// Rewriting `column_id` happens here and only here: a task's column is
/// never changed as a separate transition.
#[must_use]
pub fn move_to_another_column(
    source_tasks: Vec<Task>,
    target_tasks: Vec<Task>,
    mut task: Task,
    to_index: usize,
    to_column_id: Uuid,
) -> (Vec<Task>, Vec<Task>) {
    let task_id = task.id;
    task.column_id = to_column_id;

    let mut source: Vec<Task> = source_tasks.into_iter().filter(|t| t.id != task_id).collect();
    recalculate_positions(&mut source);

    // EDGE: a stale echo can hand us a target list that already contains the
    // task; keep the first occurrence by id so the insert stays unique.
    let mut target: Vec<Task> = target_tasks.into_iter().filter(|t| t.id != task_id).collect();
    target.sort_by_key(|t| t.position);
    let index = to_index.min(target.len());
    target.insert(index, task);

    let mut seen = HashSet::new();
    target.retain(|t| seen.insert(t.id));
    recalculate_positions(&mut target);

    (source, target)
}

#[cfg(test)]
#[path = "position_test.rs"]
mod tests;
