//! Driven port for the relational side of the backend.
//!
//! Rows cross this boundary as JSON objects. Typed decoding happens in the
//! data-access service so adapters stay schema-agnostic.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::{Filters, Projection};

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The call failed before a response arrived, timed out, or hit a 5xx.
        Transport { message: String } =>
            "record store transport failed: {message}",
        /// The backend rejected the request, for example a constraint violation.
        Rejected { message: String, code: String, details: Option<Value> } =>
            "record store rejected request ({code}): {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "record store response decode failed: {message}",
        /// The adapter refused to issue the request.
        InvalidRequest { message: String } =>
            "record store request invalid: {message}",
    }
}

/// Port for table-oriented reads and writes.
///
/// Every mutating call returns the affected rows as persisted, mirroring a
/// `return=representation` preference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read rows matching `filters`.
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        filters: &Filters,
    ) -> Result<Vec<Value>, RecordStoreError>;

    /// Insert rows and return them with backend-generated columns filled in.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RecordStoreError>;

    /// Apply `patch` to rows matching `filters` and return the updated rows.
    async fn update(
        &self,
        table: &str,
        filters: &Filters,
        patch: Value,
    ) -> Result<Vec<Value>, RecordStoreError>;

    /// Delete rows matching `filters` and return them as they were.
    async fn delete(&self, table: &str, filters: &Filters)
    -> Result<Vec<Value>, RecordStoreError>;
}
