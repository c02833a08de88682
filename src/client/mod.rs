//! Client side of the task API.
//!
//! [`TaskApi`] is what the list and form views talk to. [`HttpTaskClient`]
//! implements it over HTTP with `reqwest`, unwrapping the `{ success, ... }`
//! envelope and turning `success: false` into [`ClientError::Api`].

pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::task::{RawFields, RawValue, Task, TaskFilter};

pub use views::{StatusFilter, TaskCreated, TaskFormView, TaskListView};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with `success: false` (or a non-2xx status).
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Message to show the user: the server's `error` text when there is one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The values of the create form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due_date: String,
}

impl TaskDraft {
    pub fn form_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("priority", self.priority.as_str()),
            ("dueDate", self.due_date.as_str()),
        ]
    }

    pub fn to_fields(&self) -> RawFields {
        self.form_pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), RawValue::from(value)))
            .collect()
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ClientError>;

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for Arc<T> {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ClientError> {
        (**self).list_tasks(filter).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        (**self).create_task(draft).await
    }
}

/// Response envelope as seen by a client.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    task: Option<Task>,
    #[serde(default)]
    tasks: Option<Vec<Task>>,
}

/// `TaskApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTaskClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn read_envelope(response: reqwest::Response) -> Result<Envelope, ClientError> {
        let status = response.status();
        let envelope: Envelope = response.json().await?;
        if !status.is_success() || !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.error.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl TaskApi for HttpTaskClient {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ClientError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(priority) = filter.priority {
            query.push(("priority", priority.as_str()));
        }
        if let Some(completed) = filter.completed {
            query.push(("completed", if completed { "true" } else { "false" }));
        }

        let response = self
            .http
            .get(self.endpoint("/api/tasks")?)
            .query(&query)
            .send()
            .await?;
        Self::read_envelope(response)
            .await?
            .tasks
            .ok_or_else(|| ClientError::Unexpected("envelope has no tasks".to_string()))
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/api/tasks/create")?)
            .form(&draft.form_pairs())
            .send()
            .await?;
        Self::read_envelope(response)
            .await?
            .task
            .ok_or_else(|| ClientError::Unexpected("envelope has no task".to_string()))
    }
}
