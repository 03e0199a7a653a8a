//! Error types for identity verification.

/// Errors that can occur while verifying a bearer token.
///
/// All variants map to HTTP 401 at the service boundary. The distinctions
/// exist for logging only and must never reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The `Authorization` header is absent or not a `Bearer` scheme.
    #[error("missing or malformed Authorization header")]
    MissingBearer,

    /// The provider rejected the token (expired, revoked, or unknown).
    #[error("identity provider rejected token: {status}")]
    Rejected {
        /// HTTP status the provider answered with.
        status: u16,
    },

    /// The provider answered 2xx but without a usable subject identifier.
    #[error("identity provider returned no subject")]
    MissingSubject,

    /// The verification call itself failed (connect, TLS, timeout).
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}
