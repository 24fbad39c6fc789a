//! Wire shapes of storage API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{ListOptions, SortBy, StoredObject};

#[derive(Debug, Default, Deserialize)]
pub(super) struct StorageErrorDto {
    #[serde(default, rename = "statusCode")]
    status_code: Option<Value>,
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
}

impl StorageErrorDto {
    /// Embedded status code; the API sends it as a string or a number.
    pub(super) fn status_code(&self) -> Option<String> {
        match self.status_code.as_ref()? {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }

    pub(super) fn is_duplicate(&self) -> bool {
        self.status_code().as_deref() == Some("409")
            || self
                .error
                .as_deref()
                .is_some_and(|error| error.eq_ignore_ascii_case("duplicate"))
    }

    pub(super) fn is_not_found(&self) -> bool {
        self.status_code().as_deref() == Some("404")
            || self.error.as_deref().is_some_and(|error| {
                error.eq_ignore_ascii_case("not_found") || error.eq_ignore_ascii_case("not found")
            })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    #[serde(rename = "Key")]
    pub(super) key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SignRequestDto {
    #[serde(rename = "expiresIn")]
    pub(super) expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SignResponseDto {
    #[serde(rename = "signedURL")]
    pub(super) signed_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RemoveRequestDto<'a> {
    pub(super) prefixes: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(super) struct RemovedObjectDto {
    pub(super) name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ListRequestDto<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

impl<'a> ListRequestDto<'a> {
    pub(super) fn new(folder: &'a str, options: &ListOptions) -> Self {
        Self {
            prefix: folder.trim_matches('/'),
            limit: options.limit,
            offset: options.offset,
            sort_by: options.sort_by,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMetadataDto {
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    mimetype: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListedObjectDto {
    name: String,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: Option<ObjectMetadataDto>,
}

impl From<ListedObjectDto> for StoredObject {
    fn from(dto: ListedObjectDto) -> Self {
        let metadata = dto.metadata.unwrap_or_default();
        Self {
            name: dto.name,
            id: dto.id,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            size: metadata.size,
            content_type: metadata.mimetype,
        }
    }
}
