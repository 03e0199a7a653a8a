//! Object-store upload flow for the Mekong Doctor gateway.
//!
//! Uploads land in an S3-compatible store under keys that are always
//! namespaced by the authenticated caller:
//!
//! ```text
//! diagnoses/{subject}/{unix_millis}.{extension}
//! ```
//!
//! The key is never taken from client input ([`object_key`]), and the PUT is
//! signed with SigV4 and issued exactly once; a failed attempt surfaces to
//! the caller rather than retrying ([`client`]).

pub mod client;
pub mod error;
pub mod object_key;

pub use client::{ObjectStore, ObjectStoreClient, StoredObject};
pub use error::StorageError;
pub use object_key::ObjectKey;
