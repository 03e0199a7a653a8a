//! Identity verifier trait and implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use mekong_core::SubjectId;
use serde::Deserialize;
use tracing::debug;

use crate::error::IdentityError;

/// Verifies bearer tokens and resolves them to subject identifiers.
///
/// Implementations may back this with an identity provider's REST API, a
/// local JWKS cache, or (for tests) a fixed table.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Confirm `token` represents a valid session and return its subject.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if the token is rejected for any reason.
    async fn verify(&self, token: &str) -> Result<SubjectId, IdentityError>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns [`IdentityError::MissingBearer`] if the header is absent, not
/// valid UTF-8, not a `Bearer` scheme, or carries an empty token.
pub fn extract_bearer_token(headers: &http::HeaderMap) -> Result<&str, IdentityError> {
    let value = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(IdentityError::MissingBearer)?
        .to_str()
        .map_err(|_| IdentityError::MissingBearer)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(IdentityError::MissingBearer)?
        .trim();

    if token.is_empty() {
        return Err(IdentityError::MissingBearer);
    }
    Ok(token)
}

/// The subset of the provider's user object this crate consumes.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    #[serde(default)]
    id: String,
}

/// Verifies tokens with a read-only call to the identity provider.
///
/// Issues `GET {base_url}/auth/v1/user` with the bearer token and the
/// service API key; a 2xx response with a non-empty `id` field is the only
/// accepted outcome.
#[derive(Clone)]
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityVerifier")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpIdentityVerifier {
    /// Create a verifier using the given HTTP client and provider settings.
    ///
    /// The client is shared so its timeout policy applies uniformly to all
    /// outbound calls the gateway makes.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<SubjectId, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "identity provider rejected token");
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
            });
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|_| IdentityError::MissingSubject)?;

        SubjectId::new(user.id).map_err(|_| IdentityError::MissingSubject)
    }
}

/// An in-memory verifier backed by a token table.
///
/// Suitable for tests and local development only.
///
/// # Examples
///
/// ```
/// use mekong_identity::StaticIdentityVerifier;
///
/// let verifier = StaticIdentityVerifier::new(vec![
///     ("token-1".to_owned(), "user_1".to_owned()),
/// ]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, String>,
}

impl StaticIdentityVerifier {
    /// Create a verifier from `(token, subject)` pairs.
    pub fn new(tokens: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<SubjectId, IdentityError> {
        let subject = self
            .tokens
            .get(token)
            .ok_or(IdentityError::Rejected { status: 401 })?;
        SubjectId::new(subject.clone()).map_err(|_| IdentityError::MissingSubject)
    }
}
