//! View state holders for the task list and the create form.
//!
//! They own no rendering; a UI layer reads `tasks()`, `error()` and the draft
//! and calls the async actions in response to user input.

use tokio::sync::broadcast;

use super::{ClientError, TaskApi, TaskDraft};
use crate::api::error::VALIDATION_FAILED;
use crate::task::{validate_create, Priority, Task, TaskFilter, ValidationErrors};

pub const LOAD_FAILED: &str = "Ошибка загрузки задач";
pub const CREATE_FAILED: &str = "Ошибка при создании задачи";

/// Raised by the form after the server accepted a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCreated(pub Task);

/// Completion filter control of the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List view
// ─────────────────────────────────────────────────────────────────────────────

pub struct TaskListView<A> {
    api: A,
    tasks: Vec<Task>,
    priority: Option<Priority>,
    status: StatusFilter,
    error: Option<String>,
    loading: bool,
}

impl<A: TaskApi> TaskListView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            priority: None,
            status: StatusFilter::All,
            error: None,
            loading: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            priority: self.priority,
            completed: self.status.completed(),
        }
    }

    /// Initial load.
    pub async fn mount(&mut self) {
        self.reload().await;
    }

    pub async fn set_priority_filter(&mut self, priority: Option<Priority>) {
        self.priority = priority;
        self.reload().await;
    }

    pub async fn set_status_filter(&mut self, status: StatusFilter) {
        self.status = status;
        self.reload().await;
    }

    pub async fn on_task_created(&mut self, event: &TaskCreated) {
        tracing::debug!(task_id = event.0.id, "reloading list after create");
        self.reload().await;
    }

    async fn reload(&mut self) {
        self.loading = true;
        match self.api.list_tasks(&self.filter()).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Failed to load tasks: {}", e);
                self.tasks.clear();
                self.error = Some(e.user_message(LOAD_FAILED));
            }
        }
        self.loading = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Form view
// ─────────────────────────────────────────────────────────────────────────────

pub struct TaskFormView<A> {
    api: A,
    pub draft: TaskDraft,
    error: Option<String>,
    field_errors: ValidationErrors,
    notifier: Option<broadcast::Sender<TaskCreated>>,
}

impl<A: TaskApi> TaskFormView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            draft: TaskDraft::default(),
            error: None,
            field_errors: ValidationErrors::new(),
            notifier: None,
        }
    }

    /// Publish `TaskCreated` on `sender` after each successful submit.
    pub fn with_notifier(mut self, sender: broadcast::Sender<TaskCreated>) -> Self {
        self.notifier = Some(sender);
        self
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field)
    }

    /// Check the draft locally, then post it. Returns the created task on success.
    pub async fn submit(&mut self) -> Option<Task> {
        if let Err(errors) = validate_create(&self.draft.to_fields()) {
            self.field_errors = errors;
            self.error = Some(VALIDATION_FAILED.to_string());
            return None;
        }
        self.field_errors = ValidationErrors::new();

        match self.api.create_task(&self.draft).await {
            Ok(task) => {
                self.draft = TaskDraft::default();
                self.error = None;
                if let Some(sender) = &self.notifier {
                    // No subscribers is fine.
                    let _ = sender.send(TaskCreated(task.clone()));
                }
                Some(task)
            }
            Err(e) => {
                self.error = Some(self.describe(&e));
                None
            }
        }
    }

    fn describe(&self, error: &ClientError) -> String {
        tracing::warn!("Failed to create task: {}", error);
        error.user_message(CREATE_FAILED)
    }
}
