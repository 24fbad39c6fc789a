//! Bucket/path object storage adapter.
//!
//! Objects are addressed under `{base}/storage/v1/object/...`. Path segments
//! are percent-encoded individually so nested folders keep their slashes.

mod dto;
mod http_object_storage;

pub use http_object_storage::HttpObjectStorage;
