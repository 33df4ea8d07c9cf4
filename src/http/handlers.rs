//! Request handlers for the conversion and liveness endpoints.
//!
//! Three equivalent ingestion paths converge on
//! [`ConvertService::convert`](crate::convert::ConvertService::convert):
//! a JSON body, a form field (urlencoded or multipart), and a raw body.
//! Whatever the entry, the response contract is identical — PDF bytes as a
//! forced download with a timestamped filename.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::{self, HeaderName};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use super::error::ApiError;
use super::AppState;

/// Field name shared by the JSON and form entry points.
pub const HTML_FIELD: &str = "htmlContent";

/// Download filename prefix, preserved verbatim for existing consumers.
const FILENAME_PREFIX: &str = "xyz";

/// Compact UTC stamp embedded in the download filename.
const FILENAME_STAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Missing field decodes as empty and is rejected by validation, so a
    /// body without `htmlContent` gets the same 400 as an empty one.
    #[serde(rename = "htmlContent", default)]
    pub html_content: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    #[serde(rename = "htmlContent", default)]
    pub html_content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

// ── Conversion entry points ──────────────────────────────────────────────────

/// POST /convert — JSON body `{ "htmlContent": "…" }`.
pub async fn convert_json(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Response, ApiError> {
    let pdf = state.convert.convert(&req.html_content).await?;
    Ok(pdf_response(pdf))
}

/// POST /convert-form — form field `htmlContent`, urlencoded or multipart.
pub async fn convert_form(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ApiError> {
    let html = extract_form_field(&state, req).await?;
    let pdf = state.convert.convert(&html).await?;
    Ok(pdf_response(pdf))
}

/// POST /convert-raw — the entire body, decoded as UTF-8 (lossy).
pub async fn convert_raw(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let html = String::from_utf8_lossy(&body);
    let pdf = state.convert.convert(&html).await?;
    Ok(pdf_response(pdf))
}

/// GET /health — liveness only, no dependency checks.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Healthy",
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Pull `htmlContent` out of either form flavour. A missing field resolves
/// to an empty string and is rejected by the orchestrator's validation,
/// keeping the 400 semantics in one place.
async fn extract_form_field(state: &AppState, req: Request) -> Result<String, ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        {
            if field.name() == Some(HTML_FIELD) {
                return field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable form field: {e}")));
            }
        }
        Ok(String::new())
    } else {
        let Form(form) = Form::<ConvertForm>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid form body: {e}")))?;
        Ok(form.html_content)
    }
}

/// 200 response carrying the PDF as a forced download.
fn pdf_response(pdf: Vec<u8>) -> Response {
    let stamp = OffsetDateTime::now_utc()
        .format(FILENAME_STAMP_FORMAT)
        .unwrap_or_default();
    let disposition = format!("attachment; filename=\"{FILENAME_PREFIX}_{stamp}.pdf\"");
    let headers: [(HeaderName, String); 2] = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    (headers, pdf).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_stamp_is_fourteen_digits() {
        let stamp = OffsetDateTime::now_utc()
            .format(FILENAME_STAMP_FORMAT)
            .unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn health_payload_uses_pascal_case() {
        let body = serde_json::to_value(HealthResponse {
            status: "Healthy",
            timestamp: "2026-08-06T12:00:00Z".into(),
        })
        .unwrap();
        assert_eq!(body["Status"], "Healthy");
        assert!(body["Timestamp"].is_string());
    }

    #[test]
    fn missing_json_field_decodes_as_empty() {
        let req: ConvertRequest = serde_json::from_str("{}").unwrap();
        assert!(req.html_content.is_empty());
    }
}
