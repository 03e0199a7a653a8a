//! Error types for the object-store client.

use mekong_core::GatewayError;

/// Errors that can occur while uploading an object.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store answered the PUT with a non-success status. No retry is
    /// attempted; the caller is expected to resubmit.
    #[error("object store rejected upload: {status}")]
    UploadFailed {
        /// HTTP status code from the store.
        status: u16,
    },

    /// The PUT never completed (connect, TLS, timeout).
    #[error("object store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UploadFailed { status } => GatewayError::Upstream {
                service: "object store",
                status,
            },
            StorageError::Transport(e) => GatewayError::Internal(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_upload_failure_to_upstream_error() {
        let err: GatewayError = StorageError::UploadFailed { status: 503 }.into();
        assert!(matches!(
            err,
            GatewayError::Upstream {
                service: "object store",
                status: 503
            }
        ));
    }
}
