//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayService`] ties routing, authentication, validation, and the
//! backing clients together:
//!
//! 1. CORS preflight and health-check interception
//! 2. Request body collection
//! 3. Route dispatch to the upload or diagnosis handler
//! 4. Error formatting and common response headers (`x-request-id`,
//!    `Server`, CORS)
//!
//! All state lives in [`GatewayState`], injected at construction time and
//! shared immutably between requests.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use mekong_core::GatewayError;
use mekong_diagnosis::DiagnosisEngine;
use mekong_identity::IdentityVerifier;
use mekong_storage::ObjectStore;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::body::ResponseBody;
use crate::handlers;
use crate::response::{
    add_common_headers, error_to_response, health_response, not_found_response, preflight_response,
};
use crate::router::{self, Route};

/// Everything a request handler needs, injected once at startup.
#[derive(Clone)]
pub struct GatewayState {
    /// Bearer-token verifier.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Object-store transport.
    pub store: Arc<dyn ObjectStore>,
    /// Diagnosis engine (LLM + fallback).
    pub diagnosis: DiagnosisEngine,
    /// Upload size ceiling in bytes.
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

/// The gateway service handed to hyper per connection.
#[derive(Debug, Clone)]
pub struct GatewayService {
    state: Arc<GatewayState>,
}

impl GatewayService {
    /// Create a service over the given state.
    #[must_use]
    pub fn new(state: GatewayState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

impl Service<http::Request<Incoming>> for GatewayService {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let (parts, incoming) = req.into_parts();

            let body = match incoming.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    error!(request_id, error = %e, "failed to collect request body");
                    let err =
                        GatewayError::Internal(anyhow::anyhow!("failed to read request body"));
                    return Ok(add_common_headers(error_to_response(&err), &request_id));
                }
            };

            let response = handle_request(parts, body, &state, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process one collected request through the gateway pipeline.
///
/// Split out from the `Service` impl so tests can drive the full pipeline
/// with in-process fakes and no network listener.
pub async fn handle_request(
    parts: http::request::Parts,
    body: Bytes,
    state: &GatewayState,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    debug!(%method, %path, request_id, "processing request");

    match router::resolve(&method, &path) {
        Route::Preflight => preflight_response(),
        Route::Health => health_response(),
        Route::Upload => match handlers::handle_upload(parts, body, state).await {
            Ok(response) => response,
            Err(err) => {
                warn!(request_id, error = %err, "upload request failed");
                error_to_response(&err)
            }
        },
        Route::Diagnosis => match handlers::handle_diagnosis(parts, body, state).await {
            Ok(response) => response,
            Err(err) => {
                warn!(request_id, error = %err, "diagnosis request failed");
                error_to_response(&err)
            }
        },
        Route::NotFound => {
            debug!(%method, %path, request_id, "no route matched");
            not_found_response()
        }
    }
}
