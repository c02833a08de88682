//! Task module - the task entity and the rules for accepting task payloads.
//!
//! - `task`: the persisted entity, its priority enum and the write-side records
//! - `validation`: strict (create) and partial (update) payload schemas

pub mod task;
pub mod validation;

pub use task::{parse_due_date, NewTask, Priority, Task, TaskFilter, TaskId, TaskPatch};
pub use validation::{validate_create, validate_update, RawFields, RawValue, ValidationErrors};
