//! HTTP service layer for the Mekong Doctor gateway.
//!
//! Ties together routing, authentication, validation, and the backing
//! clients into a single hyper-compatible service:
//!
//! 1. CORS preflight and health-check interception
//! 2. Request body collection
//! 3. Route resolution ([`router`])
//! 4. Bearer-token authentication
//! 5. Multipart parsing ([`multipart`]) and upload validation ([`validation`])
//! 6. Dispatch to the object store or the diagnosis engine ([`handlers`])
//! 7. JSON response envelopes and common headers ([`response`])

pub mod body;
pub mod handlers;
pub mod multipart;
pub mod response;
pub mod router;
pub mod service;
pub mod validation;

pub use body::ResponseBody;
pub use service::{GatewayService, GatewayState};
