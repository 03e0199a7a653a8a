//! Crop-salinity diagnosis for the Mekong Doctor gateway.
//!
//! A diagnosis request carries the measured salinity, the crop's tolerance
//! threshold, and free-text symptoms. The engine forwards a prompt to an
//! OpenRouter-compatible LLM API and, whenever that path fails (transport
//! error, upstream rejection, or unparseable model output), degrades to a
//! deterministic rule-based advisory so the farmer always gets an answer.
//!
//! - [`request`] - validated request schema and input sanitization
//! - [`advisory`] - the advisory wire shape and the rule-based fallback
//! - [`prompt`] - system/user prompt construction
//! - [`llm`] - the chat API seam and the OpenRouter client
//! - [`engine`] - orchestration: LLM first, fallback second

pub mod advisory;
pub mod engine;
pub mod llm;
pub mod prompt;
pub mod request;

pub use advisory::{Advisory, AdvisoryStatus, rule_based_advisory};
pub use engine::DiagnosisEngine;
pub use llm::{ChatApi, LlmError, OpenRouterClient, extract_advisory};
pub use request::{DiagnosisRequest, Language, sanitize_symptoms};
