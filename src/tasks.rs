//! Task creation, status transitions and task queries.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, warn};

use crate::db::{format_timestamp, now, Database, Logged};
use crate::error::{KanbanError, Result};
use crate::fields::{Status, TransitionPolicy};
use crate::task::{Task, TASK_COLUMNS};

/// Task operations over an open [`Database`].
pub struct TaskManager<'a> {
    db: &'a Database,
    policy: TransitionPolicy,
}

impl<'a> TaskManager<'a> {
    /// Operations with the default (strict) transition policy.
    pub fn new(db: &'a Database) -> Self {
        Self::with_policy(db, TransitionPolicy::default())
    }

    pub fn with_policy(db: &'a Database, policy: TransitionPolicy) -> Self {
        TaskManager { db, policy }
    }

    /// Create an unassigned task and return its id.
    ///
    /// Title and project are trimmed and must be non-empty. An empty
    /// description is stored as given.
    pub fn create_task(&self, title: &str, description: Option<&str>, project: &str) -> Result<i64> {
        self.create_task_at(title, description, project, now())
    }

    pub fn create_task_at(
        &self,
        title: &str,
        description: Option<&str>,
        project: &str,
        at: NaiveDateTime,
    ) -> Result<i64> {
        let conn = self.db.conn()?;
        if let Err(e) = Database::validate_task_data(title, project) {
            warn!(error = %e, "task rejected");
            return Err(e);
        }

        conn.execute(
            "INSERT INTO tasks (title, description, status, project, created_datetime)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title.trim(),
                description,
                Status::Unassigned.as_str(),
                project.trim(),
                format_timestamp(at)
            ],
        )
        .logged("create task")?;
        let id = conn.last_insert_rowid();
        info!(task_id = id, "task created");
        Ok(id)
    }

    /// Fetch a single task.
    pub fn get_task(&self, task_id: i64) -> Result<Task> {
        self.db
            .conn()?
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![task_id],
                Task::from_row,
            )
            .optional()
            .logged("get task")?
            .ok_or_else(|| KanbanError::task_not_found(task_id))
    }

    /// Schedule a task into a period: status `todo`, todo timestamp, period reference.
    pub fn move_to_todo(&self, task_id: i64, period_id: i64) -> Result<()> {
        self.move_to_todo_at(task_id, period_id, now())
    }

    pub fn move_to_todo_at(&self, task_id: i64, period_id: i64, at: NaiveDateTime) -> Result<()> {
        let conn = self.db.conn()?;
        self.check_transition(task_id, Status::Todo)?;

        let period_exists = conn
            .query_row(
                "SELECT id FROM performance_periods WHERE id = ?1",
                params![period_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .logged("look up period")?
            .is_some();
        if !period_exists {
            return Err(KanbanError::period_not_found(period_id));
        }

        conn.execute(
            "UPDATE tasks SET status = ?1, period_id = ?2, todo_datetime = ?3 WHERE id = ?4",
            params![Status::Todo.as_str(), period_id, format_timestamp(at), task_id],
        )
        .logged("move task to todo")?;
        info!(task_id, period_id, "task moved to todo");
        Ok(())
    }

    /// Set the free-text resource on a task. Allowed in any status.
    pub fn assign_resource(&self, task_id: i64, resource: &str) -> Result<()> {
        let changed = self
            .db
            .conn()?
            .execute("UPDATE tasks SET resource = ?1 WHERE id = ?2", params![resource, task_id])
            .logged("assign resource")?;
        if changed == 0 {
            return Err(KanbanError::task_not_found(task_id));
        }
        info!(task_id, resource, "resource assigned");
        Ok(())
    }

    /// Move a task to `inwork` and stamp the inwork timestamp.
    pub fn start_task(&self, task_id: i64) -> Result<()> {
        self.start_task_at(task_id, now())
    }

    pub fn start_task_at(&self, task_id: i64, at: NaiveDateTime) -> Result<()> {
        self.check_transition(task_id, Status::InWork)?;
        self.db
            .conn()?
            .execute(
                "UPDATE tasks SET status = ?1, inwork_datetime = ?2 WHERE id = ?3",
                params![Status::InWork.as_str(), format_timestamp(at), task_id],
            )
            .logged("start task")?;
        info!(task_id, "task started");
        Ok(())
    }

    /// Move a task to `completed` and stamp the completed timestamp.
    pub fn complete_task(&self, task_id: i64) -> Result<()> {
        self.complete_task_at(task_id, now())
    }

    pub fn complete_task_at(&self, task_id: i64, at: NaiveDateTime) -> Result<()> {
        self.check_transition(task_id, Status::Completed)?;
        self.db
            .conn()?
            .execute(
                "UPDATE tasks SET status = ?1, completed_datetime = ?2 WHERE id = ?3",
                params![Status::Completed.as_str(), format_timestamp(at), task_id],
            )
            .logged("complete task")?;
        info!(task_id, "task completed");
        Ok(())
    }

    /// Every scheduled (non-unassigned) task in a period.
    pub fn get_tasks_by_period(&self, period_id: i64) -> Result<Vec<Task>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE period_id = ?1 AND status != ?2 ORDER BY id"
            ))
            .logged("get tasks by period")?;
        let tasks = stmt
            .query_map(params![period_id, Status::Unassigned.as_str()], Task::from_row)
            .logged("get tasks by period")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .logged("get tasks by period")?;
        debug!(period_id, count = tasks.len(), "loaded period tasks");
        Ok(tasks)
    }

    /// Every task still waiting to be scheduled.
    pub fn get_unassigned_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE status = ?1 ORDER BY id"))
            .logged("get unassigned tasks")?;
        let tasks = stmt
            .query_map(params![Status::Unassigned.as_str()], Task::from_row)
            .logged("get unassigned tasks")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .logged("get unassigned tasks")?;
        debug!(count = tasks.len(), "loaded unassigned tasks");
        Ok(tasks)
    }

    /// Load the task and check the configured policy allows moving it to `to`.
    fn check_transition(&self, task_id: i64, to: Status) -> Result<()> {
        let task = self.get_task(task_id)?;
        if !self.policy.allows(task.status, to) {
            warn!(task_id, from = %task.status, to = %to, "transition refused");
            return Err(KanbanError::InvalidTransition { from: task.status, to });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::PeriodManager;
    use chrono::NaiveDate;

    fn open_db() -> Database {
        let mut db = Database::new();
        db.connect_in_memory().unwrap();
        db.create_schema().unwrap();
        db
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn period(db: &Database) -> i64 {
        PeriodManager::new(db).create_period("Sprint 1", "1/1/24", "1/14/24").unwrap()
    }

    #[test]
    fn test_create_task_with_valid_data() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("Test Task", Some("Test Description"), "Test Project").unwrap();
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.description.as_deref(), Some("Test Description"));
        assert_eq!(task.project, "Test Project");
        assert_eq!(task.status, Status::Unassigned);
        assert!(task.todo_at.is_none());
        assert!(task.inwork_at.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.period_id.is_none());
        assert!(task.resource.is_none());
    }

    #[test]
    fn test_create_task_stamps_creation_time() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task_at("t", None, "p", at(3, 9)).unwrap();
        assert_eq!(tasks.get_task(id).unwrap().created_at, at(3, 9));
    }

    #[test]
    fn test_create_task_with_empty_title() {
        let db = open_db();
        let err = TaskManager::new(&db).create_task("", Some("description"), "project").unwrap_err();
        assert!(matches!(err, KanbanError::EmptyTitle));
        assert!(err.to_string().contains("Task title cannot be empty"));
    }

    #[test]
    fn test_create_task_with_whitespace_title() {
        let db = open_db();
        let err = TaskManager::new(&db).create_task("   ", Some("description"), "project").unwrap_err();
        assert!(matches!(err, KanbanError::EmptyTitle));
    }

    #[test]
    fn test_create_task_with_empty_project() {
        let db = open_db();
        let err = TaskManager::new(&db).create_task("title", Some("description"), "").unwrap_err();
        assert!(err.to_string().contains("Project name cannot be empty"));
    }

    #[test]
    fn test_create_task_with_whitespace_project() {
        let db = open_db();
        let err = TaskManager::new(&db).create_task("title", Some("description"), "  ").unwrap_err();
        assert!(matches!(err, KanbanError::EmptyProject));
    }

    #[test]
    fn test_create_task_without_connection() {
        let db = Database::new();
        let err = TaskManager::new(&db).create_task("title", Some("description"), "project").unwrap_err();
        assert!(matches!(err, KanbanError::NoConnection));
    }

    #[test]
    fn test_create_task_strips_whitespace() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("  Test Task  ", Some("Description"), "  Test Project  ").unwrap();
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.project, "Test Project");
    }

    #[test]
    fn test_create_task_empty_description_allowed() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let a = tasks.create_task("Test Task", Some(""), "Test Project").unwrap();
        let b = tasks.create_task("Test Task", None, "Test Project").unwrap();
        assert_ne!(a, b);
        assert_eq!(tasks.get_task(a).unwrap().description.as_deref(), Some(""));
        assert_eq!(tasks.get_task(b).unwrap().description, None);
    }

    #[test]
    fn test_full_lifecycle_stamps_each_stage_once() {
        let db = open_db();
        let period_id = period(&db);
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task_at("Write docs", None, "docs", at(1, 8)).unwrap();

        tasks.move_to_todo_at(id, period_id, at(1, 9)).unwrap();
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.period_id, Some(period_id));
        assert_eq!(task.todo_at, Some(at(1, 9)));

        tasks.start_task_at(id, at(2, 9)).unwrap();
        tasks.complete_task_at(id, at(3, 9)).unwrap();
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.todo_at, Some(at(1, 9)));
        assert_eq!(task.inwork_at, Some(at(2, 9)));
        assert_eq!(task.completed_at, Some(at(3, 9)));
        assert_eq!(task.created_at, at(1, 8));
    }

    #[test]
    fn test_strict_policy_refuses_skipping_stages() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("t", None, "p").unwrap();
        let err = tasks.start_task(id).unwrap_err();
        assert!(matches!(
            err,
            KanbanError::InvalidTransition { from: Status::Unassigned, to: Status::InWork }
        ));
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.status, Status::Unassigned);
        assert!(task.inwork_at.is_none());
        assert!(matches!(tasks.complete_task(id), Err(KanbanError::InvalidTransition { .. })));
    }

    #[test]
    fn test_strict_policy_refuses_repeating_a_stage() {
        let db = open_db();
        let period_id = period(&db);
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("t", None, "p").unwrap();
        tasks.move_to_todo_at(id, period_id, at(1, 9)).unwrap();
        assert!(tasks.move_to_todo_at(id, period_id, at(2, 9)).is_err());
        assert_eq!(tasks.get_task(id).unwrap().todo_at, Some(at(1, 9)));
    }

    #[test]
    fn test_permissive_policy_allows_starting_unassigned_task() {
        let db = open_db();
        let tasks = TaskManager::with_policy(&db, TransitionPolicy::Permissive);
        let id = tasks.create_task("t", None, "p").unwrap();
        tasks.start_task_at(id, at(5, 10)).unwrap();
        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.status, Status::InWork);
        assert_eq!(task.inwork_at, Some(at(5, 10)));
        assert!(task.todo_at.is_none());
    }

    #[test]
    fn test_permissive_policy_never_moves_a_task_back() {
        let db = open_db();
        let period_id = period(&db);
        let tasks = TaskManager::with_policy(&db, TransitionPolicy::Permissive);
        let id = tasks.create_task("t", None, "p").unwrap();
        tasks.move_to_todo_at(id, period_id, at(1, 9)).unwrap();
        tasks.start_task_at(id, at(2, 9)).unwrap();
        tasks.complete_task_at(id, at(3, 9)).unwrap();

        let err = tasks.move_to_todo_at(id, period_id, at(4, 9)).unwrap_err();
        assert!(matches!(err, KanbanError::InvalidTransition { .. }));
        assert!(tasks.start_task_at(id, at(4, 9)).is_err());
        assert!(tasks.complete_task_at(id, at(4, 9)).is_err());

        let task = tasks.get_task(id).unwrap();
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.todo_at, Some(at(1, 9)));
        assert_eq!(task.inwork_at, Some(at(2, 9)));
        assert_eq!(task.completed_at, Some(at(3, 9)));
    }

    #[test]
    fn test_move_to_todo_requires_existing_period() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("t", None, "p").unwrap();
        let err = tasks.move_to_todo(id, 99).unwrap_err();
        assert!(matches!(err, KanbanError::NotFound { entity: "period", .. }));
        assert_eq!(tasks.get_task(id).unwrap().status, Status::Unassigned);
    }

    #[test]
    fn test_mutations_on_missing_task() {
        let db = open_db();
        let period_id = period(&db);
        let tasks = TaskManager::new(&db);
        assert!(matches!(tasks.move_to_todo(42, period_id), Err(KanbanError::NotFound { entity: "task", .. })));
        assert!(matches!(tasks.assign_resource(42, "alice"), Err(KanbanError::NotFound { .. })));
        assert!(matches!(tasks.start_task(42), Err(KanbanError::NotFound { .. })));
        assert!(matches!(tasks.complete_task(42), Err(KanbanError::NotFound { .. })));
    }

    #[test]
    fn test_assign_resource_any_status() {
        let db = open_db();
        let tasks = TaskManager::new(&db);
        let id = tasks.create_task("t", None, "p").unwrap();
        tasks.assign_resource(id, "alice").unwrap();
        assert_eq!(tasks.get_task(id).unwrap().resource.as_deref(), Some("alice"));
        tasks.assign_resource(id, "").unwrap();
        assert_eq!(tasks.get_task(id).unwrap().resource.as_deref(), Some(""));
    }

    #[test]
    fn test_queries_split_by_status_and_period() {
        let db = open_db();
        let sprint = period(&db);
        let other = PeriodManager::new(&db).create_period("Sprint 2", "1/15/24", "1/28/24").unwrap();
        let tasks = TaskManager::new(&db);

        let waiting = tasks.create_task("waiting", None, "p").unwrap();
        let scheduled = tasks.create_task("scheduled", None, "p").unwrap();
        let elsewhere = tasks.create_task("elsewhere", None, "p").unwrap();
        tasks.move_to_todo(scheduled, sprint).unwrap();
        tasks.move_to_todo(elsewhere, other).unwrap();
        tasks.start_task(scheduled).unwrap();

        let unassigned: Vec<i64> = tasks.get_unassigned_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(unassigned, vec![waiting]);

        let in_sprint = tasks.get_tasks_by_period(sprint).unwrap();
        assert_eq!(in_sprint.len(), 1);
        assert_eq!(in_sprint[0].id, scheduled);
        assert_eq!(in_sprint[0].status, Status::InWork);

        assert_eq!(tasks.get_tasks_by_period(other).unwrap()[0].id, elsewhere);
    }

    #[test]
    fn test_queries_without_connection() {
        let db = Database::new();
        let tasks = TaskManager::new(&db);
        assert!(matches!(tasks.get_unassigned_tasks(), Err(KanbanError::NoConnection)));
        assert!(matches!(tasks.get_tasks_by_period(1), Err(KanbanError::NoConnection)));
    }
}
