//! Configuration for the Mekong Doctor gateway.
//!
//! All configuration is driven by environment variables. Object-store and
//! identity-provider secrets are required: [`GatewayConfig::from_env`] fails
//! before the service binds its listener if any of them is absent, so a
//! misconfigured deployment never serves a single request.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::GatewayError;

/// Maximum accepted upload size: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Gateway configuration.
///
/// Constructed from the environment in production via [`GatewayConfig::from_env`],
/// or explicitly (with fake credentials) in tests via the builder.
///
/// # Examples
///
/// ```
/// use mekong_core::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .store_access_key_id("AKIA_TEST".into())
///     .store_secret_access_key("secret".into())
///     .store_account_id("0123456789abcdef".into())
///     .store_bucket("mekong-doctor".into())
///     .identity_url("https://identity.test".into())
///     .identity_api_key("anon-key".into())
///     .build();
/// assert_eq!(config.store_region, "auto");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway (e.g. `"0.0.0.0:8787"`).
    #[builder(default = String::from("0.0.0.0:8787"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Object-store access key ID. Required.
    pub store_access_key_id: String,

    /// Object-store secret access key. Required.
    pub store_secret_access_key: String,

    /// Object-store account identifier (forms the endpoint host). Required.
    pub store_account_id: String,

    /// Bucket that uploaded images land in. Required.
    pub store_bucket: String,

    /// Signing region for the object store.
    #[builder(default = String::from("auto"))]
    pub store_region: String,

    /// Base URL of the identity provider. Required.
    pub identity_url: String,

    /// Service API key sent alongside verification calls. Required.
    pub identity_api_key: String,

    /// API key for the LLM backend. Optional: when absent the diagnosis
    /// route reports a configuration failure instead of calling out.
    #[builder(default)]
    pub llm_api_key: Option<String>,

    /// Base URL of the OpenRouter-compatible LLM API.
    #[builder(default = String::from("https://openrouter.ai/api/v1"))]
    pub llm_api_url: String,

    /// Model identifier passed to the LLM API.
    #[builder(default = String::from("qwen/qwen3-4b:free"))]
    pub llm_model: String,

    /// Upload size ceiling in bytes.
    #[builder(default = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Required | Default |
    /// |----------|----------|---------|
    /// | `GATEWAY_LISTEN` | no | `0.0.0.0:8787` |
    /// | `LOG_LEVEL` | no | `info` |
    /// | `STORE_ACCESS_KEY_ID` | yes | - |
    /// | `STORE_SECRET_ACCESS_KEY` | yes | - |
    /// | `STORE_ACCOUNT_ID` | yes | - |
    /// | `STORE_BUCKET` | yes | - |
    /// | `STORE_REGION` | no | `auto` |
    /// | `IDENTITY_URL` | yes | - |
    /// | `IDENTITY_API_KEY` | yes | - |
    /// | `LLM_API_KEY` | no | *(unset)* |
    /// | `LLM_API_URL` | no | `https://openrouter.ai/api/v1` |
    /// | `LLM_MODEL` | no | `qwen/qwen3-4b:free` |
    /// | `MAX_UPLOAD_BYTES` | no | `10485760` |
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] naming the first missing required
    /// variable. This is a fatal startup condition.
    pub fn from_env() -> Result<Self, GatewayError> {
        let mut config = Self::builder()
            .store_access_key_id(required_var("STORE_ACCESS_KEY_ID")?)
            .store_secret_access_key(required_var("STORE_SECRET_ACCESS_KEY")?)
            .store_account_id(required_var("STORE_ACCOUNT_ID")?)
            .store_bucket(required_var("STORE_BUCKET")?)
            .identity_url(required_var("IDENTITY_URL")?)
            .identity_api_key(required_var("IDENTITY_API_KEY")?)
            .build();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("STORE_REGION") {
            config.store_region = v;
        }
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            config.llm_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_API_URL") {
            config.llm_api_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            config.llm_model = v;
        }
        if let Ok(v) = std::env::var("MAX_UPLOAD_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                config.max_upload_bytes = n;
            }
        }

        Ok(config)
    }

    /// The object-store endpoint derived from the account identifier.
    #[must_use]
    pub fn store_endpoint(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.store_account_id)
    }
}

/// Read a required environment variable, rejecting empty values.
fn required_var(name: &str) -> Result<String, GatewayError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::Config(format!(
            "required environment variable {name} is not set"
        ))),
    }
}
