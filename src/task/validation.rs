//! Task payload schemas.
//!
//! Two variants share the same field rules:
//! - **strict** (`validate_create`): title, description, priority and dueDate are required
//! - **partial** (`validate_update`): every field is optional, `completed` is also accepted
//!
//! Input is an untyped field map ([`RawFields`]) produced by the API body
//! normalizer. Unknown fields are ignored. All failing fields are collected
//! into one [`ValidationErrors`] report rather than stopping at the first.
//!
//! `dueDate` stays a string in the validated output; it is turned into a
//! concrete timestamp by `into_new_task` / `into_patch`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::task::{parse_due_date, NewTask, Priority, TaskPatch};

pub const TITLE_REQUIRED: &str = "Заголовок обязателен";
pub const DESCRIPTION_REQUIRED: &str = "Описание обязательно";
pub const PRIORITY_INVALID: &str = "Приоритет должен быть low, medium или high";
pub const DUE_DATE_INVALID: &str = "Некорректная дата";
pub const FIELD_REQUIRED: &str = "Обязательное поле";
pub const EXPECTED_STRING: &str = "Ожидалась строка";
pub const EXPECTED_BOOLEAN: &str = "Ожидалось логическое значение";

/// A single raw field value as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Bool(bool),
    Null,
    Other(serde_json::Value),
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Null => Self::Null,
            other => Self::Other(other),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Canonical, encoding-independent request payload.
pub type RawFields = BTreeMap<String, RawValue>;

/// Field-keyed validation report (field name → message).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("task payload rejected ({} invalid field(s))", .0.len())]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Output of the strict schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
}

impl CreateTaskInput {
    pub fn into_new_task(self) -> Result<NewTask, ValidationErrors> {
        let Some(due_date) = parse_due_date(&self.due_date) else {
            let mut errors = ValidationErrors::new();
            errors.add("dueDate", DUE_DATE_INVALID);
            return Err(errors);
        };
        Ok(NewTask {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date,
        })
    }
}

/// Output of the partial schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTaskInput {
    pub fn into_patch(self) -> Result<TaskPatch, ValidationErrors> {
        let due_date = match self.due_date.as_deref() {
            Some(raw) => match parse_due_date(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    let mut errors = ValidationErrors::new();
                    errors.add("dueDate", DUE_DATE_INVALID);
                    return Err(errors);
                }
            },
            None => None,
        };
        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date,
            completed: self.completed,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Partial,
}

impl Mode {
    /// Report for a field that is absent (or null where null means absent).
    fn missing(self, field: &str, errors: &mut ValidationErrors, message: &str) {
        if self == Mode::Strict {
            errors.add(field, message);
        }
    }
}

/// Validate a create payload.
pub fn validate_create(fields: &RawFields) -> Result<CreateTaskInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let title = text_field(fields, "title", TITLE_REQUIRED, Mode::Strict, &mut errors);
    let description = text_field(
        fields,
        "description",
        DESCRIPTION_REQUIRED,
        Mode::Strict,
        &mut errors,
    );
    let priority = priority_field(fields, Mode::Strict, &mut errors);
    let due_date = due_date_field(fields, Mode::Strict, &mut errors);

    match (title, description, priority, due_date) {
        (Some(title), Some(description), Some(priority), Some(due_date)) => {
            errors.into_result(CreateTaskInput {
                title,
                description,
                priority,
                due_date,
            })
        }
        _ => Err(errors),
    }
}

/// Validate an update payload. An empty map is a valid (no-op) update.
pub fn validate_update(fields: &RawFields) -> Result<UpdateTaskInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let input = UpdateTaskInput {
        title: text_field(fields, "title", TITLE_REQUIRED, Mode::Partial, &mut errors),
        description: text_field(
            fields,
            "description",
            DESCRIPTION_REQUIRED,
            Mode::Partial,
            &mut errors,
        ),
        priority: priority_field(fields, Mode::Partial, &mut errors),
        due_date: due_date_field(fields, Mode::Partial, &mut errors),
        completed: completed_field(fields, &mut errors),
    };
    errors.into_result(input)
}

fn text_field(
    fields: &RawFields,
    name: &str,
    empty_message: &str,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match fields.get(name) {
        None => {
            mode.missing(name, errors, FIELD_REQUIRED);
            None
        }
        Some(RawValue::Null) if mode == Mode::Strict => {
            errors.add(name, FIELD_REQUIRED);
            None
        }
        Some(RawValue::Text(value)) if value.is_empty() => {
            errors.add(name, empty_message);
            None
        }
        Some(RawValue::Text(value)) => Some(value.clone()),
        Some(_) => {
            errors.add(name, EXPECTED_STRING);
            None
        }
    }
}

fn priority_field(fields: &RawFields, mode: Mode, errors: &mut ValidationErrors) -> Option<Priority> {
    match fields.get("priority") {
        None => {
            mode.missing("priority", errors, PRIORITY_INVALID);
            None
        }
        Some(RawValue::Text(value)) => {
            let parsed = Priority::parse(value);
            if parsed.is_none() {
                errors.add("priority", PRIORITY_INVALID);
            }
            parsed
        }
        Some(_) => {
            errors.add("priority", PRIORITY_INVALID);
            None
        }
    }
}

fn due_date_field(fields: &RawFields, mode: Mode, errors: &mut ValidationErrors) -> Option<String> {
    match fields.get("dueDate") {
        None => {
            mode.missing("dueDate", errors, FIELD_REQUIRED);
            None
        }
        Some(RawValue::Null) if mode == Mode::Strict => {
            errors.add("dueDate", FIELD_REQUIRED);
            None
        }
        Some(RawValue::Text(value)) => {
            if parse_due_date(value).is_some() {
                Some(value.clone())
            } else {
                errors.add("dueDate", DUE_DATE_INVALID);
                None
            }
        }
        Some(_) => {
            errors.add("dueDate", EXPECTED_STRING);
            None
        }
    }
}

fn completed_field(fields: &RawFields, errors: &mut ValidationErrors) -> Option<bool> {
    match fields.get("completed") {
        None => None,
        Some(RawValue::Bool(value)) => Some(*value),
        // Form-encoded bodies carry booleans as text.
        Some(RawValue::Text(value)) if value == "true" => Some(true),
        Some(RawValue::Text(value)) if value == "false" => Some(false),
        Some(_) => {
            errors.add("completed", EXPECTED_BOOLEAN);
            None
        }
    }
}
