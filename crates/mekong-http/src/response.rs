//! JSON response envelopes, CORS headers, and error formatting.
//!
//! Every non-preflight response is JSON. Successful uploads answer with
//! `{"success":true,"url":...,"fileName":...}`; failures answer with
//! `{"success":false,"error":...}` carrying only the client-safe message.

use http::header::HeaderValue;
use mekong_core::GatewayError;
use serde::Serialize;

use crate::body::ResponseBody;

/// Headers a browser may send on the authenticated routes.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Successful upload envelope.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true` in this envelope.
    pub success: bool,
    /// Public URL of the stored object.
    pub url: String,
    /// The object key the file was stored under.
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Failure envelope.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

/// Build a JSON response with the given status.
///
/// Serialization of the gateway's own response types cannot fail; if it
/// somehow does, a bare 500 is returned instead of a panic.
#[must_use]
pub fn json_response<T: Serialize>(
    status: http::StatusCode,
    value: &T,
) -> http::Response<ResponseBody> {
    let body = match serde_json::to_vec(value) {
        Ok(bytes) => ResponseBody::from_bytes(bytes),
        Err(_) => {
            return http::Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(ResponseBody::empty())
                .expect("static response should be valid");
        }
    };

    http::Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body)
        .expect("static response should be valid")
}

/// Convert a gateway error into its JSON error response.
#[must_use]
pub fn error_to_response(err: &GatewayError) -> http::Response<ResponseBody> {
    json_response(
        err.status_code(),
        &ErrorResponse {
            success: false,
            error: err.client_message(),
        },
    )
}

/// Produce the CORS preflight response.
#[must_use]
pub fn preflight_response() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .header("Access-Control-Max-Age", "86400")
        .body(ResponseBody::empty())
        .expect("static CORS response should be valid")
}

/// Produce the health check response.
#[must_use]
pub fn health_response() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(ResponseBody::from_string(
            r#"{"status":"running","service":"mekong-gateway"}"#,
        ))
        .expect("static health response should be valid")
}

/// Produce the 404 response for unknown routes.
#[must_use]
pub fn not_found_response() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(ResponseBody::from_string(
            r#"{"success":false,"error":"Not found"}"#,
        ))
        .expect("static response should be valid")
}

/// Add common headers to every response.
#[must_use]
pub fn add_common_headers(
    mut response: http::Response<ResponseBody>,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert("Server", HeaderValue::from_static("MekongGateway"));
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_upload_success_response() {
        let resp = json_response(
            http::StatusCode::OK,
            &UploadResponse {
                success: true,
                url: "https://store.test/bucket/key.jpg".to_owned(),
                file_name: "diagnoses/u1/1.jpg".to_owned(),
            },
        );
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json"),
        );
    }

    #[test]
    fn test_should_serialize_file_name_in_camel_case() {
        let json = serde_json::to_string(&UploadResponse {
            success: true,
            url: "u".to_owned(),
            file_name: "k".to_owned(),
        })
        .expect("serializable");
        assert!(json.contains("\"fileName\":\"k\""));
    }

    #[test]
    fn test_should_map_error_to_envelope() {
        let err = GatewayError::invalid_input("No file provided");
        let resp = error_to_response(&err);
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_answer_preflight_without_body() {
        let resp = preflight_response();
        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()
                .get("Access-Control-Allow-Headers")
                .and_then(|v| v.to_str().ok()),
            Some(CORS_ALLOW_HEADERS),
        );
    }

    #[test]
    fn test_should_add_common_headers() {
        let resp = http::Response::builder()
            .status(http::StatusCode::OK)
            .body(ResponseBody::empty())
            .expect("valid response");
        let resp = add_common_headers(resp, "req-1");
        assert_eq!(
            resp.headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-1"),
        );
        assert_eq!(
            resp.headers().get("Server").and_then(|v| v.to_str().ok()),
            Some("MekongGateway"),
        );
        assert!(resp.headers().contains_key("Access-Control-Allow-Origin"));
    }
}
