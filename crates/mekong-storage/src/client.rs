//! The object-store client: sign, PUT once, surface the outcome.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use mekong_sigv4::{RequestSigner, build_canonical_uri};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::object_key::ObjectKey;

/// The outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Deterministic public URL: `{endpoint}/{bucket}/{object_key}`.
    pub url: String,
    /// The object key the file was stored under.
    pub key: String,
}

/// Seam between the HTTP layer and the store transport.
///
/// The production implementation is [`ObjectStoreClient`]; tests substitute
/// an in-process fake to observe (or fail) the PUT without a network.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `payload` under `key` with the given content type.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UploadFailed`] on a non-2xx answer from the
    /// store, or [`StorageError::Transport`] if the call never completed.
    async fn put_object(
        &self,
        key: &ObjectKey,
        content_type: &str,
        payload: Bytes,
    ) -> Result<StoredObject, StorageError>;
}

/// Signed-PUT client for an S3-compatible store.
///
/// Holds no per-request state: every call hashes the payload, derives a
/// fresh date-scoped signing key, and issues exactly one PUT.
#[derive(Debug, Clone)]
pub struct ObjectStoreClient {
    client: reqwest::Client,
    signer: RequestSigner,
    host: String,
    bucket: String,
}

impl ObjectStoreClient {
    /// Create a client for the given account and bucket.
    ///
    /// The endpoint host follows the account-scoped convention
    /// `{account_id}.r2.cloudflarestorage.com`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        account_id: &str,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            client,
            signer: RequestSigner::new(access_key_id, secret_access_key, region, "s3"),
            host: format!("{account_id}.r2.cloudflarestorage.com"),
            bucket: bucket.into(),
        }
    }

    /// The URL an object with `path` is reachable under.
    fn object_url(&self, encoded_path: &str) -> String {
        format!("https://{}{encoded_path}", self.host)
    }
}

#[async_trait]
impl ObjectStore for ObjectStoreClient {
    async fn put_object(
        &self,
        key: &ObjectKey,
        content_type: &str,
        payload: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let path = format!("/{}/{}", self.bucket, key.as_str());
        // The request URL must carry the same encoded form the signature was
        // computed over.
        let encoded_path = build_canonical_uri(&path);
        let url = self.object_url(&encoded_path);

        let signed = self
            .signer
            .sign_put(&self.host, &path, content_type, &payload, Utc::now());

        debug!(key = %key, size = payload.len(), "uploading object");

        // Single attempt by design; a failure is surfaced, not retried.
        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("x-amz-date", &signed.amz_date)
            .header("Authorization", &signed.authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(key = %key, status = status.as_u16(), "object store rejected upload");
            return Err(StorageError::UploadFailed {
                status: status.as_u16(),
            });
        }

        debug!(key = %key, "object stored");
        Ok(StoredObject {
            url,
            key: key.as_str().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use mekong_core::SubjectId;

    use super::*;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(
            reqwest::Client::new(),
            "AKIA_TEST",
            "secret",
            "0123456789abcdef",
            "mekong-doctor",
            "auto",
        )
    }

    #[test]
    fn test_should_derive_host_from_account_id() {
        let client = test_client();
        assert_eq!(client.host, "0123456789abcdef.r2.cloudflarestorage.com");
    }

    #[test]
    fn test_should_build_deterministic_object_url() {
        let client = test_client();
        let subject = SubjectId::new("user_1").expect("valid subject");
        let key = ObjectKey::generate(&subject, "leaf.jpg", 1_700_000_000_000);
        let path = format!("/{}/{}", client.bucket, key.as_str());
        let url = client.object_url(&build_canonical_uri(&path));
        assert_eq!(
            url,
            "https://0123456789abcdef.r2.cloudflarestorage.com/mekong-doctor/diagnoses/user_1/1700000000000.jpg"
        );
    }
}
