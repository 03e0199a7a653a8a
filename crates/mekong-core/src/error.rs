//! Error types for the Mekong Doctor gateway.
//!
//! All request handling funnels into [`GatewayError`], which carries enough
//! structure to pick an HTTP status code and a client-safe message. Internal
//! detail (upstream bodies, transport errors, configuration paths) stays in
//! the logs and never reaches the caller.

/// Gateway error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The bearer token is missing, malformed, or rejected by the identity
    /// provider. Deliberately carries no detail.
    #[error("Unauthorized")]
    Unauthorized,

    /// The client submitted an unacceptable request (missing file, oversized
    /// payload, disallowed MIME type, schema violation).
    #[error("{0}")]
    InvalidInput(String),

    /// A required secret or setting is absent at startup. Fatal: the service
    /// must not start serving.
    #[error("configuration error: {0}")]
    Config(String),

    /// An upstream dependency (object store, identity provider, LLM API)
    /// answered with a non-success status.
    #[error("{service} request failed: {status}")]
    Upstream {
        /// Which upstream failed, e.g. `"object store"`.
        service: &'static str,
        /// The HTTP status code the upstream returned.
        status: u16,
    },

    /// Unexpected internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Convenience constructor for invalid-input errors.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// The HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => http::StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Upstream { .. } | Self::Internal(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message exposed to the caller.
    ///
    /// Client-caused errors echo their descriptive message; everything else
    /// collapses to a generic string so internals never leak.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_owned(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Upstream { service, status } => format!("{service} request failed: {status}"),
            Self::Config(_) | Self::Internal(_) => "Internal error".to_owned(),
        }
    }
}

/// Convenience result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_unauthorized_to_401() {
        assert_eq!(
            GatewayError::Unauthorized.status_code(),
            http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_should_map_invalid_input_to_400() {
        let err = GatewayError::invalid_input("No file provided");
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "No file provided");
    }

    #[test]
    fn test_should_map_upstream_to_500_with_status_in_message() {
        let err = GatewayError::Upstream {
            service: "object store",
            status: 503,
        };
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "object store request failed: 503");
    }

    #[test]
    fn test_should_hide_internal_detail_from_client() {
        let err = GatewayError::Internal(anyhow::anyhow!("db password leaked"));
        assert_eq!(err.client_message(), "Internal error");

        let err = GatewayError::Config("STORE_SECRET_ACCESS_KEY missing".to_owned());
        assert_eq!(err.client_message(), "Internal error");
    }
}
