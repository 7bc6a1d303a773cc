//! Filter projection — derived, filtered view of the board.
//!
//! DESIGN
//! ======
//! Filtering never mutates canonical state: `filtered_columns` clones the
//! column list with each task list narrowed to the matching tasks. Consumers
//! that want the projection kept current subscribe to the store and
//! recompute on every transition.
//!
//! `now` is an explicit argument on the matching functions so overdue logic
//! is deterministic under test; `filtered_columns_now` is the convenience
//! wrapper for call sites on the live clock.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{Column, Task, TaskKind, TaskPriority, TaskStatus};

/// Inclusive due-date window. A missing bound leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

/// Active filter dimensions. A task must pass every active dimension;
/// an empty filter set passes everything.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub priorities: Vec<TaskPriority>,
    pub kinds: Vec<TaskKind>,
    pub tags: Vec<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub due_date_range: Option<DateRange>,
    pub show_overdue: bool,
    pub show_in_progress: bool,
}

impl Filters {
    /// True when no dimension is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty()
            && self.kinds.is_empty()
            && self.tags.is_empty()
            && self.assigned_to_id.is_none()
            && self.due_date_range.is_none()
            && !self.show_overdue
            && !self.show_in_progress
    }

    /// Whether a task passes every active filter dimension.
    #[must_use]
    pub fn matches(&self, task: &Task, now: OffsetDateTime) -> bool {
        if self.is_empty() {
            return true;
        }

        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }

        if !self.kinds.is_empty() && !self.kinds.contains(&task.kind) {
            return false;
        }

        if !self.tags.is_empty() && !task.tags.iter().any(|tag| self.tags.contains(&tag.id)) {
            return false;
        }

        if let Some(assignee) = self.assigned_to_id {
            if task.assigned_to.as_ref().map(|u| u.id) != Some(assignee) {
                return false;
            }
        }

        if let Some(range) = self.due_date_range {
            // A task with no due date fails an active range.
            let Some(due) = task.due_date else {
                return false;
            };
            if range.start.is_some_and(|start| due < start) || range.end.is_some_and(|end| due > end) {
                return false;
            }
        }

        if self.show_overdue {
            let overdue = task.due_date.is_some_and(|due| due < now) && task.status != TaskStatus::Done;
            if !overdue {
                return false;
            }
        }

        if self.show_in_progress && task.status != TaskStatus::InProgress {
            return false;
        }

        true
    }
}

/// Derive the filtered column view from canonical state.
#[must_use]
pub fn filtered_columns(columns: &[Column], filters: &Filters, now: OffsetDateTime) -> Vec<Column> {
    columns
        .iter()
        .map(|column| {
            let tasks = column.tasks.iter().filter(|t| filters.matches(t, now)).cloned().collect();
            Column { tasks, ..column.clone() }
        })
        .collect()
}

/// [`filtered_columns`] against the live clock.
#[must_use]
pub fn filtered_columns_now(columns: &[Column], filters: &Filters) -> Vec<Column> {
    filtered_columns(columns, filters, OffsetDateTime::now_utc())
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
