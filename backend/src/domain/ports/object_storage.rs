//! Driven port for bucket/path object storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::define_port_error;

/// Default `Cache-Control` max-age applied to uploads.
pub const DEFAULT_CACHE_CONTROL_SECONDS: u32 = 3600;
/// Default content type applied to uploads.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
/// Default page size for object listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Upload metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// MIME type stored with the object.
    pub content_type: String,
    /// Cache lifetime advertised to clients, in seconds.
    pub cache_control_seconds: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            cache_control_seconds: DEFAULT_CACHE_CONTROL_SECONDS,
        }
    }
}

impl UploadOptions {
    /// Options with an explicit content type and the default cache lifetime.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }
}

/// Column used to order object listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Object name.
    #[default]
    Name,
    /// Creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
}

/// Sort direction for object listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Ordering for object listings; defaults to name ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// Sort column.
    pub column: SortColumn,
    /// Sort direction.
    pub order: SortOrder,
}

/// Paging and ordering for object listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum entries returned.
    pub limit: usize,
    /// Entries skipped before the first returned one.
    pub offset: usize,
    /// Ordering.
    pub sort_by: SortBy,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            sort_by: SortBy::default(),
        }
    }
}

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Name relative to the listed folder.
    pub name: String,
    /// Backend object identifier; folders have none.
    pub id: Option<uuid::Uuid>,
    /// Creation time, when known.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time, when known.
    pub updated_at: Option<DateTime<Utc>>,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// MIME type, when known.
    pub content_type: Option<String>,
}

/// Location of a freshly uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Path inside the bucket.
    pub path: String,
    /// Fully qualified `bucket/path` key.
    pub full_path: String,
}

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The call failed before a response arrived, timed out, or hit a 5xx.
        Transport { message: String } =>
            "object storage transport failed: {message}",
        /// An object already exists at the upload path.
        AlreadyExists { path: String } =>
            "object already exists: {path}",
        /// No object exists at the path.
        NotFound { path: String } =>
            "object not found: {path}",
        /// The backend rejected the request, for example a size or type limit.
        Rejected { message: String, code: String } =>
            "object storage rejected request ({code}): {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "object storage response decode failed: {message}",
        /// The adapter refused to issue the request.
        InvalidRequest { message: String } =>
            "object storage request invalid: {message}",
    }
}

/// Port for bucket/path object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `content` at `path`. Without `upsert`, an existing object is an error.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: &UploadOptions,
        upsert: bool,
    ) -> Result<UploadedObject, ObjectStorageError>;

    /// Best-effort public URL; existence is not checked.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Issue a URL valid for `expires_in_seconds`.
    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_seconds: u64,
    ) -> Result<String, ObjectStorageError>;

    /// Remove objects and return the paths that existed.
    async fn remove(&self, bucket: &str, paths: &[String])
    -> Result<Vec<String>, ObjectStorageError>;

    /// List the direct children of `folder`.
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, ObjectStorageError>;

    /// Fetch raw object content.
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectStorageError>;
}
