//! HTTP API.
//!
//! - `routes`: application state, router assembly and the server loop
//! - `tasks`: task CRUD endpoints under `/api/tasks`
//! - `body`: form / multipart / JSON body normalization
//! - `error`: error taxonomy and status mapping
//! - `types`: response envelopes and query types
//! - `sitemap`, `og`: ancillary XML/SVG endpoints

mod body;
pub mod error;
mod og;
pub mod routes;
mod sitemap;
mod tasks;
pub mod types;

pub use body::{BodyRejection, RequestBody};
pub use error::{ApiError, Operation};
pub use routes::{router, serve, serve_with_shutdown, AppState};

/// Escape text for inclusion in XML/SVG content or attribute values.
pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
