use super::*;
use crate::model::test_helpers::seeded_column;

fn task_drag(columns: &[Column], column_index: usize, task_index: usize) -> DragState {
    let column = &columns[column_index];
    DragState {
        kind: DragKind::Task,
        id: column.tasks[task_index].id,
        source_index: column_index,
        source_column_id: Some(column.id),
    }
}

fn column_drag(columns: &[Column], index: usize) -> DragState {
    DragState { kind: DragKind::Column, id: columns[index].id, source_index: index, source_column_id: None }
}

fn board() -> Vec<Column> {
    let project_id = uuid::Uuid::new_v4();
    vec![
        seeded_column(project_id, "A", 0, 3),
        seeded_column(project_id, "B", 1, 2),
        seeded_column(project_id, "C", 2, 0),
    ]
}

#[test]
fn release_outside_droppable_resolves_to_none() {
    let columns = board();
    let drag = task_drag(&columns, 0, 0);
    assert_eq!(resolve_drop(&columns, &drag, None), None);
}

#[test]
fn drop_on_other_task_inherits_its_column_and_sortable_index() {
    let columns = board();
    let drag = task_drag(&columns, 0, 0);
    let over = DropTarget::Task { task_id: columns[1].tasks[1].id, sortable_index: Some(1) };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[1].id,
            to_index: 1,
        })
    );
}

#[test]
fn drop_on_other_task_without_hint_uses_position_sorted_index() {
    let mut columns = board();
    // Target column's array order disagrees with positions.
    columns[1].tasks.reverse();
    let drag = task_drag(&columns, 0, 0);
    // "B-t1" sits at sorted index 1 regardless of array order.
    let target = columns[1].tasks.iter().find(|t| t.title == "B-t1").unwrap().id;
    let over = DropTarget::Task { task_id: target, sortable_index: None };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[1].id,
            to_index: 1,
        })
    );
}

#[test]
fn drop_on_empty_drop_zone_appends() {
    let columns = board();
    let drag = task_drag(&columns, 0, 1);
    let over = DropTarget::ColumnDropZone { column_id: columns[2].id };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[2].id,
            to_index: 0,
        })
    );
}

#[test]
fn drop_on_column_body_appends_at_end() {
    let columns = board();
    let drag = task_drag(&columns, 0, 0);
    let over = DropTarget::Column { column_id: columns[1].id };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[1].id,
            to_index: 2,
        })
    );
}

#[test]
fn hint_fallback_defaults_to_source_column_index_zero() {
    let columns = board();
    let drag = task_drag(&columns, 0, 2);
    let over = DropTarget::Hint { column_id: None, index: None };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[0].id,
            to_index: 0,
        })
    );
}

#[test]
fn drop_back_at_current_position_is_noop() {
    let columns = board();
    // Dragging A-t1 (visual index 1) onto a target that resolves to (A, 1).
    let drag = task_drag(&columns, 0, 1);
    let over = DropTarget::Hint { column_id: Some(columns[0].id), index: Some(1) };

    assert_eq!(resolve_drop(&columns, &drag, Some(&over)), None);
}

#[test]
fn drop_on_itself_is_noop() {
    let columns = board();
    let drag = task_drag(&columns, 0, 0);
    let over = DropTarget::Task { task_id: drag.id, sortable_index: Some(2) };

    assert_eq!(resolve_drop(&columns, &drag, Some(&over)), None);
}

#[test]
fn column_drop_resolves_array_indices() {
    let columns = board();
    let drag = column_drag(&columns, 0);
    let over = DropTarget::Column { column_id: columns[2].id };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(command, Some(MoveCommand::Column { from_index: 0, to_index: 2 }));
}

#[test]
fn column_dropped_on_itself_is_noop() {
    let columns = board();
    let drag = column_drag(&columns, 1);
    let over = DropTarget::Column { column_id: columns[1].id };

    assert_eq!(resolve_drop(&columns, &drag, Some(&over)), None);
}

#[test]
fn column_dropped_on_task_targets_that_tasks_column() {
    let columns = board();
    let drag = column_drag(&columns, 2);
    let over = DropTarget::Task { task_id: columns[0].tasks[0].id, sortable_index: None };

    let command = resolve_drop(&columns, &drag, Some(&over));

    assert_eq!(command, Some(MoveCommand::Column { from_index: 2, to_index: 0 }));
}

#[test]
fn task_drop_on_vanished_target_stays_in_source() {
    let columns = board();
    let drag = task_drag(&columns, 0, 2);
    let over = DropTarget::Task { task_id: uuid::Uuid::new_v4(), sortable_index: Some(4) };

    let command = resolve_drop(&columns, &drag, Some(&over));

    // Falls back to (source column, 0); A-t2 is not at visual index 0, so a
    // move is produced.
    assert_eq!(
        command,
        Some(MoveCommand::Task {
            task_id: drag.id,
            from_column_id: columns[0].id,
            to_column_id: columns[0].id,
            to_index: 0,
        })
    );
}
