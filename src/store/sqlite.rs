//! SQLite-backed task gateway.
//!
//! A single `rusqlite::Connection` sits behind a mutex; each operation runs on
//! tokio's blocking pool so request handlers only suspend at this boundary.
//! Timestamps are stored as unix milliseconds.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{StoreError, TaskGateway};
use crate::task::{NewTask, Priority, Task, TaskFilter, TaskId, TaskPatch};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    description TEXT    NOT NULL,
    priority    TEXT    NOT NULL CHECK (priority IN ('low', 'medium', 'high')),
    due_date    INTEGER NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks (created_at);
";

const COLUMNS: &str =
    "id, title, description, priority, due_date, completed, created_at, updated_at";

/// Task gateway over a SQLite database file (or a private in-memory database).
#[derive(Clone)]
pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// The special path `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path == Path::new(":memory:") {
            return Self::open_in_memory();
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Worker(format!("create {}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(path)?;
        tracing::info!("Opened task database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` against the connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Worker("connection mutex poisoned".to_string()))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

/// Raw column values, converted to a [`Task`] outside the rusqlite row callback.
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    priority: String,
    due_date: i64,
    completed: bool,
    created_at: i64,
    updated_at: i64,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            priority: row.get(3)?,
            due_date: row.get(4)?,
            completed: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority = Priority::parse(&row.priority).ok_or_else(|| {
            StoreError::Corrupt(format!("task {} has priority {:?}", row.id, row.priority))
        })?;
        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            priority,
            due_date: from_millis(row.id, row.due_date)?,
            completed: row.completed,
            created_at: from_millis(row.id, row.created_at)?,
            updated_at: from_millis(row.id, row.updated_at)?,
        })
    }
}

fn from_millis(id: TaskId, millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("task {} has timestamp {}", id, millis)))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl TaskGateway for SqliteTaskStore {
    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        self.run(move |conn| {
            let now = now_millis();
            let row = conn.query_row(
                &format!(
                    "INSERT INTO tasks (title, description, priority, due_date, completed, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
                     RETURNING {COLUMNS}"
                ),
                params![
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.due_date.timestamp_millis(),
                    now,
                ],
                TaskRow::from_row,
            )?;
            Task::try_from(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                TaskRow::from_row,
            )
            .optional()?
            .map(Task::try_from)
            .transpose()
        })
        .await
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.run(move |conn| {
            let mut conditions: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(priority) = filter.priority {
                conditions.push("priority = ?");
                values.push(Box::new(priority.as_str()));
            }
            if let Some(completed) = filter.completed {
                conditions.push("completed = ?");
                values.push(Box::new(completed));
            }

            let where_clause = if conditions.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", conditions.join(" AND "))
            };
            let sql = format!(
                "SELECT {COLUMNS} FROM tasks{where_clause} ORDER BY created_at DESC, id DESC"
            );
            tracing::debug!(%sql, "listing tasks");

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> = values.iter().map(|v| &**v).collect();
            let rows = stmt
                .query_map(params.as_slice(), TaskRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(Task::try_from).collect()
        })
        .await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        self.run(move |conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(title) = patch.title {
                sets.push("title = ?");
                values.push(Box::new(title));
            }
            if let Some(description) = patch.description {
                sets.push("description = ?");
                values.push(Box::new(description));
            }
            if let Some(priority) = patch.priority {
                sets.push("priority = ?");
                values.push(Box::new(priority.as_str()));
            }
            if let Some(due_date) = patch.due_date {
                sets.push("due_date = ?");
                values.push(Box::new(due_date.timestamp_millis()));
            }
            if let Some(completed) = patch.completed {
                sets.push("completed = ?");
                values.push(Box::new(completed));
            }
            sets.push("updated_at = ?");
            values.push(Box::new(now_millis()));
            values.push(Box::new(id));

            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ? RETURNING {COLUMNS}",
                sets.join(", ")
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| &**v).collect();
            let row = conn
                .query_row(&sql, params.as_slice(), TaskRow::from_row)
                .optional()?
                .ok_or(StoreError::NotFound(id))?;
            Task::try_from(row)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.run(move |conn| {
            match conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])? {
                0 => Err(StoreError::NotFound(id)),
                _ => Ok(()),
            }
        })
        .await
    }
}
