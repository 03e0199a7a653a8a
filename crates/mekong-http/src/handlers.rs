//! Route handlers: upload and diagnosis.
//!
//! Both routes authenticate first: a missing or rejected token answers 401
//! before any file or schema processing happens. The upload pipeline then
//! runs parse → validate → sign → PUT, so rejected input never reaches the
//! signature engine or the store.

use bytes::Bytes;
use chrono::Utc;
use http::request::Parts;
use mekong_core::{GatewayError, SubjectId};
use mekong_diagnosis::DiagnosisRequest;
use mekong_identity::extract_bearer_token;
use mekong_storage::ObjectKey;
use tracing::{debug, info};

use crate::body::ResponseBody;
use crate::multipart::{extract_boundary, parse_multipart};
use crate::response::{UploadResponse, json_response};
use crate::service::GatewayState;
use crate::validation::validate_upload;

/// Authenticate the caller from the `Authorization` header.
///
/// Every failure collapses to [`GatewayError::Unauthorized`]; the reason is
/// logged but never surfaced.
async fn authenticate(parts: &Parts, state: &GatewayState) -> Result<SubjectId, GatewayError> {
    let token = extract_bearer_token(&parts.headers).map_err(|err| {
        debug!(error = %err, "no usable bearer token");
        GatewayError::Unauthorized
    })?;

    state.verifier.verify(token).await.map_err(|err| {
        debug!(error = %err, "token verification failed");
        GatewayError::Unauthorized
    })
}

/// Handle `POST /upload`.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] for token failures,
/// [`GatewayError::InvalidInput`] for malformed or rejected uploads, and the
/// store's error for a failed PUT.
pub async fn handle_upload(
    parts: Parts,
    body: Bytes,
    state: &GatewayState,
) -> Result<http::Response<ResponseBody>, GatewayError> {
    let subject = authenticate(&parts, state).await?;

    let content_type = parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::invalid_input("Expected multipart/form-data request"))?;
    let boundary = extract_boundary(content_type)?;
    let form = parse_multipart(&body, &boundary)?;

    // Legacy field still sent by older clients. The authenticated subject
    // always wins; the field is never consulted.
    if let Some(user_id) = form.fields.get("userId") {
        debug!(subject = %subject, user_id, "ignoring legacy userId form field");
    }

    validate_upload(form.file.as_ref(), state.max_upload_bytes)?;
    let Some(file) = form.file else {
        return Err(GatewayError::invalid_input("No file provided"));
    };

    let content_type = file
        .content_type
        .as_deref()
        .unwrap_or("image/jpeg")
        .to_owned();
    let key = ObjectKey::generate(
        &subject,
        file.file_name.as_deref().unwrap_or_default(),
        Utc::now().timestamp_millis(),
    );

    let stored = state.store.put_object(&key, &content_type, file.data).await?;

    info!(subject = %subject, key = %key, "upload stored");

    Ok(json_response(
        http::StatusCode::OK,
        &UploadResponse {
            success: true,
            url: stored.url,
            file_name: stored.key,
        },
    ))
}

/// Handle `POST /diagnosis`.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] for token failures,
/// [`GatewayError::InvalidInput`] for schema violations, and
/// [`GatewayError::Config`] when no LLM backend is configured.
pub async fn handle_diagnosis(
    parts: Parts,
    body: Bytes,
    state: &GatewayState,
) -> Result<http::Response<ResponseBody>, GatewayError> {
    let subject = authenticate(&parts, state).await?;

    let request: DiagnosisRequest = serde_json::from_slice(&body)
        .map_err(|_| GatewayError::invalid_input("Invalid input"))?;
    request.validate()?;

    let advisory = state.diagnosis.diagnose(&subject, &request).await?;
    Ok(json_response(http::StatusCode::OK, &advisory))
}
