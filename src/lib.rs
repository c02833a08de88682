//! # Taskboard
//!
//! A small task manager: tasks with a title, description, priority, due date
//! and completion flag, managed through a JSON REST API backed by SQLite.
//!
//! This library provides:
//! - An HTTP API for creating, listing, reading, updating and deleting tasks
//! - A validation schema shared by the server and the client-side form
//! - A typed client plus list/form view state holders for UI layers
//!
//! ## Request Flow
//!
//! ```text
//!   TaskListView / TaskFormView
//!              │  HTTP (HttpTaskClient)
//!              ▼
//!   ┌──────────────────────┐
//!   │  api::tasks handlers │  parse id → normalize body → validate
//!   └──────────┬───────────┘
//!              ▼
//!   ┌──────────────────────┐
//!   │  store::TaskGateway  │  SqliteTaskStore (rusqlite)
//!   └──────────────────────┘
//! ```
//!
//! ## Modules
//! - `api`: router, handlers, envelopes and error mapping
//! - `task`: the task entity and payload validation
//! - `store`: persistence gateway
//! - `client`: HTTP client and view state
//! - `config`: environment configuration

pub mod api;
pub mod client;
pub mod config;
pub mod store;
pub mod task;

pub use config::Config;
pub use store::{SqliteTaskStore, StoreError, TaskGateway};
pub use task::{Priority, Task};
