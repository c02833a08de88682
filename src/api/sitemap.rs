//! `GET /sitemap.xml` - site root plus one entry per task detail page.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use super::escape_xml;
use super::routes::AppState;
use crate::task::task::iso_millis;
use crate::task::{Priority, Task, TaskFilter};

const SITE_REQUIRED: &str = "Site configuration is required to generate sitemap";

/// Crawl weight of a task page: finished tasks rank lowest, then by priority.
fn page_weight(task: &Task) -> &'static str {
    if task.completed {
        return "0.5";
    }
    match task.priority {
        Priority::High => "0.9",
        Priority::Medium => "0.8",
        Priority::Low => "0.7",
    }
}

/// Render the urlset. `base_url` must not end with a slash.
pub fn render_sitemap(base_url: &str, tasks: &[Task], now: DateTime<Utc>) -> String {
    let base = escape_xml(base_url);
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    xml.push_str(&format!(
        "  <url>\n    <loc>{}/</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>daily</changefreq>\n    <priority>1.0</priority>\n  </url>\n",
        base,
        iso_millis::format(&now)
    ));
    for task in tasks {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}/tasks/{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>weekly</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            base,
            task.id,
            iso_millis::format(&task.updated_at),
            page_weight(task)
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> Response {
    let Some(site_url) = state.config.site_url.as_ref() else {
        tracing::warn!("Sitemap requested but SITE_URL is not configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, SITE_REQUIRED).into_response();
    };

    let tasks = match state.tasks.list(TaskFilter::default()).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!("Failed to load tasks for sitemap: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate sitemap")
                .into_response();
        }
    };

    let base_url = site_url.as_str().trim_end_matches('/');
    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        render_sitemap(base_url, &tasks, Utc::now()),
    )
        .into_response()
}
