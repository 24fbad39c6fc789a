//! Reqwest-backed object storage adapter.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    ListRequestDto, ListedObjectDto, RemoveRequestDto, RemovedObjectDto, SignRequestDto,
    SignResponseDto, StorageErrorDto, UploadResponseDto,
};
use crate::config::BackendConnection;
use crate::domain::ports::{
    ListOptions, ObjectStorage, ObjectStorageError, StoredObject, UploadOptions, UploadedObject,
};
use crate::outbound::http_support::{
    authorise, build_client, is_transport_status, service_root, status_message,
    transport_message,
};

/// Object storage talking to a storage API under `{base}/storage/v1`.
pub struct HttpObjectStorage {
    client: Client,
    connection: BackendConnection,
    storage_root: Url,
}

impl HttpObjectStorage {
    /// Build an adapter using the connection's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::InvalidRequest`] when the base URL cannot
    /// carry a path or the HTTP client cannot be constructed.
    pub fn new(connection: BackendConnection) -> Result<Self, ObjectStorageError> {
        let storage_root =
            service_root(connection.base_url(), &["storage", "v1"]).ok_or_else(|| {
                ObjectStorageError::invalid_request(format!(
                    "backend url {} cannot be used as a base",
                    connection.base_url()
                ))
            })?;
        let client = build_client(&connection).map_err(|error| {
            ObjectStorageError::invalid_request(format!("http client could not be built: {error}"))
        })?;
        Ok(Self {
            client,
            connection,
            storage_root,
        })
    }

    /// `{root}/object/{scope..}/{bucket}/{path..}` with each segment encoded.
    fn object_url(&self, scope: &[&str], bucket: &str, path: Option<&str>) -> Url {
        let mut url = self.storage_root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("object").extend(scope).push(bucket);
            if let Some(path) = path {
                segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        authorise(self.client.request(method, url), &self.connection)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<Response, ObjectStorageError> {
        let response = builder
            .send()
            .await
            .map_err(|error| ObjectStorageError::transport(transport_message(&error)))?;
        let status = response.status();
        debug!(status = status.as_u16(), path, "object storage response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| ObjectStorageError::transport(transport_message(&error)))?;
        Err(map_status_error(status, body.as_ref(), path))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ObjectStorageError> {
        let body = self
            .send(builder, path)
            .await?
            .bytes()
            .await
            .map_err(|error| ObjectStorageError::transport(transport_message(&error)))?;
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            ObjectStorageError::decode(format!("invalid storage payload for {path}: {error}"))
        })
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: &UploadOptions,
        upsert: bool,
    ) -> Result<UploadedObject, ObjectStorageError> {
        let builder = self
            .request(Method::POST, self.object_url(&[], bucket, Some(path)))
            .header(CONTENT_TYPE, options.content_type.as_str())
            .header(
                CACHE_CONTROL,
                format!("max-age={}", options.cache_control_seconds),
            )
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(content);
        let response: UploadResponseDto = self.send_json(builder, path).await?;
        Ok(UploadedObject {
            path: path.to_owned(),
            full_path: response
                .key
                .unwrap_or_else(|| format!("{bucket}/{path}")),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.object_url(&["public"], bucket, Some(path)).into()
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_seconds: u64,
    ) -> Result<String, ObjectStorageError> {
        let builder = self
            .request(Method::POST, self.object_url(&["sign"], bucket, Some(path)))
            .json(&SignRequestDto {
                expires_in: expires_in_seconds,
            });
        let response: SignResponseDto = self.send_json(builder, path).await?;
        Ok(resolve_signed_url(&self.storage_root, &response.signed_url))
    }

    async fn remove(
        &self,
        bucket: &str,
        paths: &[String],
    ) -> Result<Vec<String>, ObjectStorageError> {
        let builder = self
            .request(Method::DELETE, self.object_url(&[], bucket, None))
            .json(&RemoveRequestDto { prefixes: paths });
        let removed: Vec<RemovedObjectDto> = self.send_json(builder, bucket).await?;
        Ok(removed.into_iter().map(|object| object.name).collect())
    }

    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, ObjectStorageError> {
        let builder = self
            .request(Method::POST, self.object_url(&["list"], bucket, None))
            .json(&ListRequestDto::new(folder, options));
        let listed: Vec<ListedObjectDto> = self.send_json(builder, folder).await?;
        Ok(listed.into_iter().map(StoredObject::from).collect())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectStorageError> {
        let builder = self.request(
            Method::GET,
            self.object_url(&["authenticated"], bucket, Some(path)),
        );
        let body = self
            .send(builder, path)
            .await?
            .bytes()
            .await
            .map_err(|error| ObjectStorageError::transport(transport_message(&error)))?;
        Ok(body.to_vec())
    }
}

/// Signed URLs come back relative to the storage root.
fn resolve_signed_url(storage_root: &Url, signed: &str) -> String {
    if signed.starts_with("http://") || signed.starts_with("https://") {
        return signed.to_owned();
    }
    let root = storage_root.as_str().trim_end_matches('/');
    format!("{root}/{}", signed.trim_start_matches('/'))
}

fn map_status_error(status: StatusCode, body: &[u8], path: &str) -> ObjectStorageError {
    if is_transport_status(status) {
        return ObjectStorageError::transport(status_message(status, body));
    }
    let dto = serde_json::from_slice::<StorageErrorDto>(body).unwrap_or_default();
    if status == StatusCode::CONFLICT || dto.is_duplicate() {
        return ObjectStorageError::already_exists(path);
    }
    if status == StatusCode::NOT_FOUND || dto.is_not_found() {
        return ObjectStorageError::not_found(path);
    }
    let code = dto
        .status_code()
        .unwrap_or_else(|| status.as_u16().to_string());
    let message = dto
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| status_message(status, body));
    ObjectStorageError::rejected(message, code)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network storage helpers.

    use std::time::Duration;

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn storage() -> HttpObjectStorage {
        let connection = BackendConnection::new(
            Url::parse("https://crm.example.test").expect("valid url"),
            "anon-key",
            Duration::from_secs(5),
        );
        HttpObjectStorage::new(connection).expect("adapter builds")
    }

    #[test]
    fn public_urls_encode_each_segment() {
        let url = storage().public_url("lead-files", "leads/42/business card.png");
        assert_eq!(
            url,
            "https://crm.example.test/storage/v1/object/public/lead-files/leads/42/business%20card.png"
        );
    }

    #[test]
    fn folder_urls_have_no_trailing_path() {
        let url = storage().object_url(&["list"], "lead-files", None);
        assert_eq!(
            url.as_str(),
            "https://crm.example.test/storage/v1/object/list/lead-files"
        );
    }

    #[rstest]
    #[case::relative(
        "/object/sign/lead-files/a.txt?token=t",
        "https://crm.example.test/storage/v1/object/sign/lead-files/a.txt?token=t"
    )]
    #[case::absolute("https://cdn.example.test/a?token=t", "https://cdn.example.test/a?token=t")]
    fn signed_urls_are_made_absolute(#[case] signed: &str, #[case] expected: &str) {
        assert_eq!(resolve_signed_url(&storage().storage_root, signed), expected);
    }

    #[rstest]
    #[case::http_conflict(StatusCode::CONFLICT, json!({}))]
    #[case::embedded_code(
        StatusCode::BAD_REQUEST,
        json!({
            "statusCode": "409",
            "error": "Duplicate",
            "message": "The resource already exists"
        })
    )]
    fn duplicates_map_to_already_exists(
        #[case] status: StatusCode,
        #[case] body: serde_json::Value,
    ) {
        let error = map_status_error(status, body.to_string().as_bytes(), "a.txt");
        assert_eq!(error, ObjectStorageError::already_exists("a.txt"));
    }

    #[rstest]
    #[case::http_not_found(StatusCode::NOT_FOUND, json!({}))]
    #[case::embedded_code(
        StatusCode::BAD_REQUEST,
        json!({ "statusCode": 404, "error": "not_found", "message": "Object not found" })
    )]
    fn missing_objects_map_to_not_found(
        #[case] status: StatusCode,
        #[case] body: serde_json::Value,
    ) {
        let error = map_status_error(status, body.to_string().as_bytes(), "gone.txt");
        assert_eq!(error, ObjectStorageError::not_found("gone.txt"));
    }

    #[test]
    fn other_rejections_keep_code_and_message() {
        let body = json!({
            "statusCode": "413",
            "error": "Payload too large",
            "message": "The object exceeded the maximum allowed size"
        })
        .to_string();
        let error = map_status_error(StatusCode::BAD_REQUEST, body.as_bytes(), "big.bin");
        assert_eq!(
            error,
            ObjectStorageError::rejected("The object exceeded the maximum allowed size", "413")
        );
    }

    #[test]
    fn server_errors_are_transport_faults() {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"", "a.txt");
        assert!(matches!(error, ObjectStorageError::Transport { .. }));
    }

    #[test]
    fn list_requests_serialise_sort_options() {
        let request = ListRequestDto::new("/leads/42/", &ListOptions::default());
        assert_eq!(
            serde_json::to_value(&request).expect("request serialises"),
            json!({
                "prefix": "leads/42",
                "limit": 100,
                "offset": 0,
                "sortBy": { "column": "name", "order": "asc" }
            })
        );
    }
}
