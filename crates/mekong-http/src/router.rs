//! Request routing.
//!
//! The gateway exposes a deliberately small surface; routing is a direct
//! match on method and path.

use http::Method;

/// The routes the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST /upload`: signed object-storage upload.
    Upload,
    /// `POST /diagnosis`: AI diagnosis with rule-based fallback.
    Diagnosis,
    /// `GET /health`: liveness probe.
    Health,
    /// `OPTIONS *`: CORS preflight.
    Preflight,
    /// Anything else.
    NotFound,
}

/// Resolve a method/path pair to a route.
#[must_use]
pub fn resolve(method: &Method, path: &str) -> Route {
    if *method == Method::OPTIONS {
        return Route::Preflight;
    }

    match (method, path) {
        (&Method::POST, "/upload") => Route::Upload,
        (&Method::POST, "/diagnosis") => Route::Diagnosis,
        (&Method::GET, "/health" | "/_health") => Route::Health,
        _ => Route::NotFound,
    }
}
