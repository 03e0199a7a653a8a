//! Shared validated newtypes.

use std::fmt;

use crate::error::GatewayError;

/// The stable unique identifier of an authenticated caller, as issued by the
/// identity provider.
///
/// Guaranteed non-empty. Object keys are always namespaced under this value,
/// so it must never be constructed from client-supplied form fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a new subject identifier.
    ///
    /// # Errors
    /// Returns an error if the identifier is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, GatewayError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GatewayError::Unauthorized);
        }
        Ok(Self(id))
    }

    /// Get the subject identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
