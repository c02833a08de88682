//! `GET /api/og` - social preview card for a task, rendered as SVG.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::escape_xml;

const TITLE_LIMIT: usize = 40;

#[derive(Debug, Default, Deserialize)]
pub struct OgQuery {
    pub title: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

struct Palette {
    background: &'static str,
    text: &'static str,
    border: &'static str,
}

/// Colours and label for a priority query value; unknown values get the neutral scheme.
fn scheme(priority: &str) -> (Palette, &'static str) {
    match priority {
        "high" => (
            Palette { background: "#FEE2E2", text: "#B91C1C", border: "#EF4444" },
            "Высокий",
        ),
        "medium" => (
            Palette { background: "#FEF3C7", text: "#92400E", border: "#F59E0B" },
            "Средний",
        ),
        "low" => (
            Palette { background: "#DCFCE7", text: "#166534", border: "#22C55E" },
            "Низкий",
        ),
        _ => (
            Palette { background: "#E0E7FF", text: "#3730A3", border: "#6366F1" },
            "Стандартный",
        ),
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let mut short: String = title.chars().take(TITLE_LIMIT).collect();
        short.push_str("...");
        short
    } else {
        title.to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn render_card(query: &OgQuery) -> String {
    let title = non_empty(query.title.as_deref()).unwrap_or("Задача");
    let priority = non_empty(query.priority.as_deref()).unwrap_or("default");
    let status = non_empty(query.status.as_deref()).unwrap_or("В процессе");
    let (palette, label) = scheme(priority);

    format!(
        r##"<svg width="1200" height="630" xmlns="http://www.w3.org/2000/svg">
  <rect width="1200" height="630" fill="{bg}" />
  <rect width="12" height="630" fill="{border}" />
  <text x="50" y="200" font-family="Arial, sans-serif" font-size="48" font-weight="bold" fill="{fg}">{title}</text>
  <text x="50" y="300" font-family="Arial, sans-serif" font-size="32" fill="{fg}">Приоритет: {label}</text>
  <text x="50" y="360" font-family="Arial, sans-serif" font-size="32" fill="{fg}">Статус: {status}</text>
  <text x="50" y="550" font-family="Arial, sans-serif" font-size="24" font-weight="bold" fill="{fg}">Менеджер задач</text>
</svg>
"##,
        bg = palette.background,
        border = palette.border,
        fg = palette.text,
        title = escape_xml(&truncate_title(title)),
        label = label,
        status = escape_xml(status),
    )
}

pub async fn og_image(Query(query): Query<OgQuery>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        render_card(&query),
    )
        .into_response()
}
