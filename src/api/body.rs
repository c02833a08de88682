//! Request body normalization.
//!
//! Task payloads arrive form-encoded (`application/x-www-form-urlencoded`),
//! as browser `FormData` (`multipart/form-data`) or as JSON. [`RequestBody`]
//! picks the decoder from `Content-Type` and [`RequestBody::into_fields`]
//! turns any of them into the one [`RawFields`] map the schemas consume.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};

use super::types::ErrorEnvelope;
use crate::task::{RawFields, RawValue};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
    Json(serde_json::Map<String, serde_json::Value>),
}

impl RequestBody {
    /// Normalize to a field map. For repeated form keys the first value wins.
    pub fn into_fields(self) -> RawFields {
        let mut fields = RawFields::new();
        match self {
            Self::Form(pairs) | Self::Multipart(pairs) => {
                for (name, value) in pairs {
                    fields.entry(name).or_insert(RawValue::Text(value));
                }
            }
            Self::Json(map) => {
                for (name, value) in map {
                    fields.insert(name, RawValue::from(value));
                }
            }
        }
        fields
    }
}

/// Why a body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BodyRejection(pub String);

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorEnvelope::new(self.0))).into_response()
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<serde_json::Value>::from_request(req, state)
                .await
                .map_err(|e| BodyRejection(e.body_text()))?;
            match value {
                serde_json::Value::Object(map) => Ok(Self::Json(map)),
                _ => Err(BodyRejection("expected a JSON object".to_string())),
            }
        } else if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| BodyRejection(e.body_text()))?;
            let mut pairs = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| BodyRejection(e.body_text()))?
            {
                // Uploaded files carry no task fields.
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field.text().await.map_err(|e| BodyRejection(e.body_text()))?;
                pairs.push((name, value));
            }
            Ok(Self::Multipart(pairs))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| BodyRejection(e.body_text()))?;
            Ok(Self::Form(pairs))
        } else {
            Err(BodyRejection(format!(
                "unsupported content type {:?}",
                content_type
            )))
        }
    }
}
