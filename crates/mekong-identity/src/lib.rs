//! Bearer-token authentication for the Mekong Doctor gateway.
//!
//! Incoming requests carry `Authorization: Bearer <token>`. This crate
//! confirms the token represents a currently valid session with the identity
//! provider and extracts the stable subject identifier. The verification
//! call is read-only; no session state is created or refreshed.
//!
//! The provider seam is the [`IdentityVerifier`] trait:
//!
//! - [`HttpIdentityVerifier`] performs the real over-the-wire check.
//! - [`StaticIdentityVerifier`] backs tests with a fixed token table.
//!
//! Every failure mode deliberately collapses to the same opaque
//! [`IdentityError`] variants; the HTTP layer maps all of them to a bare
//! 401 so callers learn nothing about why a token was rejected.

pub mod error;
pub mod verifier;

pub use error::IdentityError;
pub use verifier::{
    HttpIdentityVerifier, IdentityVerifier, StaticIdentityVerifier, extract_bearer_token,
};
