//! Storage module
//!
//! Object storage for uploaded photo files in the local backend.

pub mod blob_store;

pub use blob_store::BlobStore;
