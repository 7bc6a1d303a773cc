use std::sync::Mutex as StdMutex;

use super::*;
use crate::drag::DropTarget;
use crate::model::test_helpers::{column_with, seeded_column, task_in};
use crate::model::{BoardSnapshot, TaskKind, TaskPriority, TaskStatus, User};
use crate::sync::{COLUMN_SYNC_DEBOUNCE, TASK_SYNC_DELAY};
use std::time::Duration;

/// Recording double for the remote API. CRUD calls echo the request back as
/// a server-shaped entity; a `fail_next` flag makes the next call reject.
#[derive(Default)]
struct FakeApi {
    task_position_calls: StdMutex<Vec<(Uuid, Uuid, usize)>>,
    column_position_calls: StdMutex<Vec<(Uuid, usize)>>,
    created_tasks: StdMutex<Vec<NewTask>>,
    deleted_tasks: StdMutex<Vec<Uuid>>,
    member_updates: StdMutex<Vec<(Uuid, MemberRole)>>,
    snapshot: StdMutex<BoardSnapshot>,
    fail_next: StdMutex<bool>,
}

impl FakeApi {
    fn check_failure(&self) -> Result<(), ApiError> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(ApiError::Status { status: 500 });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BoardApi for FakeApi {
    async fn update_task_position(&self, task_id: Uuid, column_id: Uuid, position: usize) -> Result<(), ApiError> {
        self.task_position_calls.lock().unwrap().push((task_id, column_id, position));
        Ok(())
    }

    async fn update_column_position(&self, column_id: Uuid, position: usize) -> Result<(), ApiError> {
        self.column_position_calls.lock().unwrap().push((column_id, position));
        Ok(())
    }

    async fn fetch_board(&self, _project_id: Uuid) -> Result<crate::model::BoardSnapshot, ApiError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, ApiError> {
        self.check_failure()?;
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title.clone(),
            description: task.description.clone(),
            kind: task.kind,
            status: TaskStatus::Todo,
            priority: task.priority,
            start_date: task.start_date,
            end_date: task.end_date,
            due_date: task.due_date,
            position: task.position,
            column_id: task.column_id,
            project_id: task.project_id,
            tags: Vec::new(),
            assigned_to: None,
        };
        self.created_tasks.lock().unwrap().push(task);
        Ok(created)
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> Result<Task, ApiError> {
        self.check_failure()?;
        let mut task = task_in(Uuid::new_v4(), Uuid::new_v4(), "updated", 0);
        task.id = task_id;
        if let Some(title) = patch.title {
            task.title = title;
        }
        Ok(task)
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), ApiError> {
        self.check_failure()?;
        self.deleted_tasks.lock().unwrap().push(task_id);
        Ok(())
    }

    async fn create_column(&self, column: NewColumn) -> Result<Column, ApiError> {
        self.check_failure()?;
        Ok(Column {
            id: Uuid::new_v4(),
            name: column.name,
            color: column.color,
            position: column.position,
            project_id: column.project_id,
            tasks: Vec::new(),
        })
    }

    async fn update_column(&self, column_id: Uuid, name: String, color: Option<String>) -> Result<Column, ApiError> {
        self.check_failure()?;
        Ok(Column {
            id: column_id,
            name,
            color,
            position: 0,
            project_id: Uuid::new_v4(),
            tasks: Vec::new(),
        })
    }

    async fn delete_column(&self, _column_id: Uuid) -> Result<(), ApiError> {
        self.check_failure()
    }

    async fn create_tag(&self, name: String, color: String) -> Result<Tag, ApiError> {
        self.check_failure()?;
        Ok(Tag { id: Uuid::new_v4(), name, color })
    }

    async fn add_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<Member, ApiError> {
        self.check_failure()?;
        Ok(Member {
            id: Uuid::new_v4(),
            role,
            project_id,
            user: User { id: user_id, name: "new member".into(), email: None },
        })
    }

    async fn update_member(&self, _project_id: Uuid, user_id: Uuid, role: MemberRole) -> Result<(), ApiError> {
        self.check_failure()?;
        self.member_updates.lock().unwrap().push((user_id, role));
        Ok(())
    }

    async fn remove_member(&self, _project_id: Uuid, _user_id: Uuid) -> Result<(), ApiError> {
        self.check_failure()
    }
}

fn actions_with(api: Arc<FakeApi>) -> BoardActions {
    BoardActions::new(api, Uuid::new_v4())
}

async fn seed_board(actions: &BoardActions, columns: Vec<Column>) {
    actions.store().write().await.dispatch(BoardAction::SetColumns(columns));
}

fn draft_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_owned(),
        description: None,
        kind: TaskKind::Task,
        priority: TaskPriority::Medium,
        column_id: Uuid::nil(),
        project_id: Uuid::nil(),
        position: 0,
        tag_ids: Vec::new(),
        user_id: None,
        start_date: None,
        end_date: None,
        due_date: None,
    }
}

#[tokio::test]
async fn hydrate_populates_the_store() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let columns = vec![seeded_column(project_id, "Todo", 0, 2), seeded_column(project_id, "Done", 1, 1)];
    let tags = vec![Tag { id: Uuid::new_v4(), name: "infra".into(), color: "#00ff00".into() }];
    *api.snapshot.lock().unwrap() = BoardSnapshot { columns: columns.clone(), tags: tags.clone(), members: Vec::new() };

    actions.hydrate().await.unwrap();

    let store = actions.store().read().await;
    assert_eq!(store.state().columns, columns);
    assert_eq!(store.state().tags, tags);
}

#[tokio::test(start_paused = true)]
async fn move_task_is_optimistic_and_syncs_after_delay() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let source = seeded_column(project_id, "A", 0, 2);
    let target = seeded_column(project_id, "B", 1, 1);
    let task_id = source.tasks[0].id;
    let (source_id, target_id) = (source.id, target.id);
    seed_board(&actions, vec![source, target]).await;

    actions.move_task(task_id, source_id, target_id, 1).await;

    // Local state moved immediately, before any network activity.
    {
        let store = actions.store().read().await;
        let target_col = store.state().columns.iter().find(|c| c.id == target_id).unwrap();
        assert_eq!(target_col.tasks.len(), 2);
        assert_eq!(target_col.tasks[1].id, task_id);
        assert!(api.task_position_calls.lock().unwrap().is_empty());
    }

    tokio::time::sleep(TASK_SYNC_DELAY + Duration::from_millis(50)).await;
    assert_eq!(*api.task_position_calls.lock().unwrap(), vec![(task_id, target_id, 1)]);
}

#[tokio::test(start_paused = true)]
async fn move_column_reorders_and_debounces() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let columns = vec![
        seeded_column(project_id, "A", 0, 0),
        seeded_column(project_id, "B", 1, 0),
        seeded_column(project_id, "C", 2, 0),
    ];
    let moved_id = columns[0].id;
    seed_board(&actions, columns).await;

    actions.move_column(0, 2).await;

    {
        let store = actions.store().read().await;
        let names: Vec<&str> = store.state().columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    tokio::time::sleep(COLUMN_SYNC_DEBOUNCE + Duration::from_millis(50)).await;
    assert_eq!(*api.column_position_calls.lock().unwrap(), vec![(moved_id, 2)]);
}

#[tokio::test(start_paused = true)]
async fn move_column_out_of_range_is_ignored() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let columns = vec![seeded_column(project_id, "A", 0, 0), seeded_column(project_id, "B", 1, 0)];
    seed_board(&actions, columns.clone()).await;

    actions.move_column(0, 5).await;

    let store = actions.store().read().await;
    assert_eq!(store.state().columns, columns);
    assert!(actions.tracker().pending_column_moves().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn end_drag_applies_resolved_move_and_clears_drag() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let source = seeded_column(project_id, "A", 0, 2);
    let target = seeded_column(project_id, "B", 1, 1);
    let task_id = source.tasks[0].id;
    let (source_id, target_id) = (source.id, target.id);
    seed_board(&actions, vec![source, target]).await;

    actions.start_task_drag(task_id, 0, source_id).await;
    actions.end_drag(Some(DropTarget::ColumnDropZone { column_id: target_id })).await;

    {
        let store = actions.store().read().await;
        assert!(store.state().dragged_item.is_none());
        let target_col = store.state().columns.iter().find(|c| c.id == target_id).unwrap();
        assert_eq!(target_col.tasks.last().unwrap().id, task_id);
    }

    tokio::time::sleep(TASK_SYNC_DELAY + Duration::from_millis(50)).await;
    assert_eq!(api.task_position_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn end_drag_without_target_only_clears_drag() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = seeded_column(project_id, "A", 0, 2);
    let task_id = column.tasks[1].id;
    let column_id = column.id;
    seed_board(&actions, vec![column.clone()]).await;

    actions.start_task_drag(task_id, 1, column_id).await;
    actions.end_drag(None).await;

    let store = actions.store().read().await;
    assert!(store.state().dragged_item.is_none());
    assert_eq!(store.state().columns, vec![column]);
    assert!(actions.tracker().pending_task_moves().await.is_empty());
}

#[tokio::test]
async fn add_task_appends_with_next_position() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = seeded_column(project_id, "A", 0, 3);
    let column_id = column.id;
    seed_board(&actions, vec![column]).await;

    let created = actions.add_task(column_id, draft_task("ship it")).await.unwrap();

    assert_eq!(created.position, 3);
    let store = actions.store().read().await;
    let col = store.state().columns.iter().find(|c| c.id == column_id).unwrap();
    assert_eq!(col.tasks.len(), 4);
    assert_eq!(col.tasks[3].id, created.id);
    assert_eq!(api.created_tasks.lock().unwrap()[0].position, 3);
}

#[tokio::test]
async fn add_task_into_empty_column_starts_at_zero() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = column_with(project_id, "Empty", 0, Vec::new());
    let column_id = column.id;
    seed_board(&actions, vec![column]).await;

    let created = actions.add_task(column_id, draft_task("first")).await.unwrap();
    assert_eq!(created.position, 0);
}

#[tokio::test]
async fn add_task_failure_leaves_store_untouched() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = seeded_column(project_id, "A", 0, 1);
    let column_id = column.id;
    seed_board(&actions, vec![column.clone()]).await;
    *api.fail_next.lock().unwrap() = true;

    let result = actions.add_task(column_id, draft_task("doomed")).await;

    assert!(result.is_err());
    let store = actions.store().read().await;
    assert_eq!(store.state().columns, vec![column]);
}

#[tokio::test]
async fn remove_task_is_optimistic_even_when_delete_fails() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = seeded_column(project_id, "A", 0, 2);
    let (column_id, task_id) = (column.id, column.tasks[0].id);
    seed_board(&actions, vec![column]).await;
    *api.fail_next.lock().unwrap() = true;

    let result = actions.remove_task(column_id, task_id).await;

    assert!(result.is_err());
    assert!(api.deleted_tasks.lock().unwrap().is_empty());
    let store = actions.store().read().await;
    let col = store.state().columns.iter().find(|c| c.id == column_id).unwrap();
    assert!(!col.tasks.iter().any(|t| t.id == task_id), "local removal stands");
}

#[tokio::test]
async fn update_column_preserves_task_list() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let column = seeded_column(project_id, "Old name", 0, 2);
    let column_id = column.id;
    let tasks = column.tasks.clone();
    seed_board(&actions, vec![column]).await;

    let updated = actions.update_column(column_id, "New name".into(), Some("#112233".into())).await.unwrap();

    assert_eq!(updated.tasks, tasks);
    let store = actions.store().read().await;
    let col = store.state().columns.iter().find(|c| c.id == column_id).unwrap();
    assert_eq!(col.name, "New name");
    assert_eq!(col.tasks, tasks);
}

#[tokio::test]
async fn delete_column_failure_leaves_store_untouched() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let project_id = Uuid::new_v4();
    let columns = vec![seeded_column(project_id, "A", 0, 1)];
    let column_id = columns[0].id;
    seed_board(&actions, columns.clone()).await;
    *api.fail_next.lock().unwrap() = true;

    let result = actions.delete_column(column_id).await;

    assert!(result.is_err());
    let store = actions.store().read().await;
    assert_eq!(store.state().columns, columns);
}

#[tokio::test]
async fn update_member_is_optimistic() {
    let api = Arc::new(FakeApi::default());
    let actions = actions_with(Arc::clone(&api));
    let member = Member {
        id: Uuid::new_v4(),
        role: MemberRole::Member,
        project_id: Uuid::new_v4(),
        user: User { id: Uuid::new_v4(), name: "sam".into(), email: None },
    };
    actions.store().write().await.dispatch(BoardAction::SetMembers(vec![member.clone()]));

    actions.update_member(&member, MemberRole::Admin).await.unwrap();

    let store = actions.store().read().await;
    assert_eq!(store.state().members[0].role, MemberRole::Admin);
    assert_eq!(*api.member_updates.lock().unwrap(), vec![(member.user.id, MemberRole::Admin)]);
}
