//! AWS Signature Version 4 request signing.
//!
//! This crate implements the client side of SigV4: given a secret key and the
//! parts of an outgoing HTTP request, it produces the `Authorization` header
//! an S3-compatible object store will accept. The check on the store side is
//! exact-match (a single deviating byte in the canonical request yields a
//! rejected signature), so every normalization step here is deterministic.
//!
//! The signing pipeline:
//!
//! 1. Hash the payload (`x-amz-content-sha256`).
//! 2. Build the canonical request from method, URI, query, headers, and the
//!    payload hash ([`canonical`]).
//! 3. Build the string to sign from the timestamp, credential scope, and the
//!    canonical request hash.
//! 4. Derive the signing key by chained HMAC-SHA256 over date, region,
//!    service, and the `aws4_request` terminator.
//! 5. Sign and hex-encode ([`signer`]).
//!
//! Everything is a pure function of its inputs; no clock or network access
//! happens in this crate. The caller supplies the timestamp.

pub mod canonical;
pub mod signer;

pub use canonical::{build_canonical_request, build_canonical_uri, build_signed_headers_string};
pub use signer::{
    RequestSigner, SignedHeaders, build_string_to_sign, compute_signature, credential_scope,
    derive_signing_key, format_amz_date, hash_payload,
};
