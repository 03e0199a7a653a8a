//! Diagnosis orchestration: LLM first, deterministic fallback second.

use std::sync::Arc;

use mekong_core::{GatewayError, SubjectId};
use tracing::{info, warn};

use crate::advisory::{Advisory, rule_based_advisory};
use crate::llm::{ChatApi, extract_advisory};
use crate::prompt::{build_system_prompt, build_user_prompt};
use crate::request::DiagnosisRequest;

/// Produces advisories for validated diagnosis requests.
#[derive(Clone)]
pub struct DiagnosisEngine {
    chat: Option<Arc<dyn ChatApi>>,
}

impl std::fmt::Debug for DiagnosisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisEngine")
            .field("chat", &self.chat.as_ref().map(|_| "..."))
            .finish()
    }
}

impl DiagnosisEngine {
    /// Create an engine backed by the given chat API.
    #[must_use]
    pub fn new(chat: Arc<dyn ChatApi>) -> Self {
        Self { chat: Some(chat) }
    }

    /// Create an engine with no LLM backend configured.
    ///
    /// Diagnosis requests against it fail with a configuration error.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { chat: None }
    }

    /// Produce an advisory for a validated request.
    ///
    /// The LLM path is attempted first; any failure along it (transport,
    /// upstream rejection, empty or unparseable output) degrades to the
    /// rule-based advisory rather than an error, so the caller always
    /// receives an answer once authenticated and validated.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when no LLM backend is configured.
    pub async fn diagnose(
        &self,
        subject: &SubjectId,
        request: &DiagnosisRequest,
    ) -> Result<Advisory, GatewayError> {
        let Some(chat) = &self.chat else {
            return Err(GatewayError::Config(
                "LLM API key is not configured".to_owned(),
            ));
        };

        info!(subject = %subject, crop = %request.crop_type, "diagnosis requested");

        let system = build_system_prompt(request.language);
        let user = build_user_prompt(request);

        match chat.chat(&system, &user).await {
            Ok(content) => {
                if let Some(advisory) = extract_advisory(&content) {
                    return Ok(advisory);
                }
                warn!("LLM output was not a valid advisory, using rule-based fallback");
                Ok(rule_based_advisory(request))
            }
            Err(err) => {
                warn!(error = %err, "LLM call failed, using rule-based fallback");
                Ok(rule_based_advisory(request))
            }
        }
    }
}
