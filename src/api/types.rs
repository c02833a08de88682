//! API request/response types.
//!
//! Every JSON response is an envelope `{ "success": bool, ... }`.

use serde::Serialize;

use crate::task::{Priority, Task, TaskFilter, ValidationErrors};

/// `{ success: true, task }`
#[derive(Debug, Serialize)]
pub struct TaskEnvelope {
    pub success: bool,
    pub task: Task,
}

impl TaskEnvelope {
    pub fn new(task: Task) -> Self {
        Self {
            success: true,
            task,
        }
    }
}

/// `{ success: true, tasks }`
#[derive(Debug, Serialize)]
pub struct TaskListEnvelope {
    pub success: bool,
    pub tasks: Vec<Task>,
}

impl TaskListEnvelope {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            tasks,
        }
    }
}

/// `{ success: true, message }`
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{ success: false, error, details? }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: ValidationErrors) -> Self {
        Self {
            details: Some(details),
            ..Self::new(error)
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query string of `GET /api/tasks`.
#[derive(Debug, Default)]
pub struct ListTasksQuery {
    pub priority: Option<String>,
    pub completed: Option<String>,
}

impl ListTasksQuery {
    /// Lenient decoding: a repeated key keeps its first value, unknown keys
    /// and undecodable bytes never reject the request.
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match &*key {
                "priority" => &mut query.priority,
                "completed" => &mut query.completed,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    /// Unknown priorities are dropped, not rejected. Any `completed` value
    /// other than `"true"` filters for open tasks.
    pub fn into_filter(self) -> TaskFilter {
        let priority = self.priority.as_deref().and_then(|raw| {
            let parsed = Priority::parse(raw);
            if parsed.is_none() && !raw.is_empty() {
                tracing::debug!(priority = raw, "ignoring unknown priority filter");
            }
            parsed
        });
        TaskFilter {
            priority,
            completed: self.completed.map(|raw| raw == "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(priority: Option<&str>, completed: Option<&str>) -> ListTasksQuery {
        ListTasksQuery {
            priority: priority.map(str::to_string),
            completed: completed.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_from_query() {
        assert_eq!(query(None, None).into_filter(), TaskFilter::default());
        assert_eq!(
            query(Some("high"), Some("true")).into_filter(),
            TaskFilter {
                priority: Some(Priority::High),
                completed: Some(true)
            }
        );
    }

    #[test]
    fn test_query_string_keeps_first_value() {
        let parsed = ListTasksQuery::from_query_string(Some(
            "priority=high&priority=low&completed=true&completed=false&page=2",
        ));
        assert_eq!(parsed.priority.as_deref(), Some("high"));
        assert_eq!(parsed.completed.as_deref(), Some("true"));

        let empty = ListTasksQuery::from_query_string(None);
        assert_eq!(empty.into_filter(), TaskFilter::default());
    }

    #[test]
    fn test_query_string_tolerates_bad_encoding() {
        let parsed = ListTasksQuery::from_query_string(Some("priority=%FF&completed"));
        assert_eq!(parsed.into_filter().priority, None);
        let parsed = ListTasksQuery::from_query_string(Some("completed"));
        assert_eq!(parsed.into_filter().completed, Some(false));
    }

    #[test]
    fn test_unknown_priority_is_ignored() {
        assert_eq!(query(Some("urgent"), None).into_filter().priority, None);
        assert_eq!(query(Some(""), None).into_filter().priority, None);
    }

    #[test]
    fn test_completed_is_true_only_for_literal_true() {
        assert_eq!(query(None, Some("false")).into_filter().completed, Some(false));
        assert_eq!(query(None, Some("yes")).into_filter().completed, Some(false));
        assert_eq!(query(None, Some("")).into_filter().completed, Some(false));
    }
}
