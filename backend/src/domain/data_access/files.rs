//! Object storage operations sharing the record layer's envelope contract.

use std::sync::Arc;

use tracing::debug;

use super::{map_object_storage_error, run_guarded};
use crate::domain::ports::{
    ListOptions, ObjectStorage, ObjectStorageError, StoredObject, UploadOptions, UploadedObject,
};
use crate::domain::{Envelope, ErrorInfo};

/// Lifetime of signed URLs when the caller does not pick one.
pub const DEFAULT_SIGNED_URL_EXPIRY_SECONDS: u64 = 3600;

/// Binary half of the data-access layer.
pub struct FileAccess<O> {
    storage: Arc<O>,
}

impl<O> Clone for FileAccess<O> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<O> FileAccess<O> {
    /// Wrap an object storage adapter.
    pub fn new(storage: Arc<O>) -> Self {
        Self { storage }
    }
}

impl<O> FileAccess<O>
where
    O: ObjectStorage,
{
    /// Upload `content` to `path`, failing if an object already exists there.
    pub async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        content: impl Into<Vec<u8>>,
        options: &UploadOptions,
    ) -> Envelope<UploadedObject> {
        self.upload(bucket, path, content.into(), options, false)
            .await
    }

    /// Upload `content` to `path`, silently replacing any existing object.
    pub async fn upload_file_overwrite(
        &self,
        bucket: &str,
        path: &str,
        content: impl Into<Vec<u8>>,
        options: &UploadOptions,
    ) -> Envelope<UploadedObject> {
        self.upload(bucket, path, content.into(), options, true).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: &UploadOptions,
        upsert: bool,
    ) -> Envelope<UploadedObject> {
        let operation = if upsert {
            "upload_file_overwrite"
        } else {
            "upload_file"
        };
        run_guarded(operation, bucket, async {
            validate_location(bucket, path)?;
            debug!(bucket, path, bytes = content.len(), upsert, "uploading object");
            self.storage
                .upload(bucket, path, content, options, upsert)
                .await
                .map_err(map_object_storage_error)
        })
        .await
    }

    /// Public URL for `path`. Existence is not checked and this never fails.
    pub fn get_public_url(&self, bucket: &str, path: &str) -> String {
        self.storage.public_url(bucket, path)
    }

    /// Time-boxed URL for `path`; `None` uses
    /// [`DEFAULT_SIGNED_URL_EXPIRY_SECONDS`].
    pub async fn get_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expiry_seconds: Option<u64>,
    ) -> Envelope<String> {
        let expiry = expiry_seconds.unwrap_or(DEFAULT_SIGNED_URL_EXPIRY_SECONDS);
        run_guarded("get_signed_url", bucket, async {
            validate_location(bucket, path)?;
            if expiry == 0 {
                return Err(ErrorInfo::internal("signed URL expiry must be positive"));
            }
            self.storage
                .signed_url(bucket, path, expiry)
                .await
                .map_err(map_object_storage_error)
        })
        .await
    }

    /// Delete one object. Deleting a missing object succeeds.
    pub async fn delete_file(&self, bucket: &str, path: &str) -> Envelope<()> {
        run_guarded("delete_file", bucket, async {
            validate_location(bucket, path)?;
            self.remove(bucket, &[path.to_owned()]).await.map(|_| ())
        })
        .await
    }

    /// Delete several objects and return the paths that existed.
    pub async fn delete_files(&self, bucket: &str, paths: &[String]) -> Envelope<Vec<String>> {
        run_guarded("delete_files", bucket, async {
            for path in paths {
                validate_location(bucket, path)?;
            }
            if paths.is_empty() {
                return Ok(Vec::new());
            }
            self.remove(bucket, paths).await
        })
        .await
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<Vec<String>, ErrorInfo> {
        match self.storage.remove(bucket, paths).await {
            Ok(removed) => Ok(removed),
            Err(ObjectStorageError::NotFound { path }) => {
                debug!(bucket, path, "object already absent");
                Ok(Vec::new())
            }
            Err(error) => Err(map_object_storage_error(error)),
        }
    }

    /// List the direct children of `folder`.
    pub async fn list_files(
        &self,
        bucket: &str,
        folder: &str,
        options: &ListOptions,
    ) -> Envelope<Vec<StoredObject>> {
        run_guarded("list_files", bucket, async {
            if bucket.trim().is_empty() {
                return Err(ErrorInfo::internal("bucket name must not be blank"));
            }
            self.storage
                .list(bucket, folder, options)
                .await
                .map_err(map_object_storage_error)
        })
        .await
    }

    /// Download raw object content.
    pub async fn download_file(&self, bucket: &str, path: &str) -> Envelope<Vec<u8>> {
        run_guarded("download_file", bucket, async {
            validate_location(bucket, path)?;
            self.storage
                .download(bucket, path)
                .await
                .map_err(map_object_storage_error)
        })
        .await
    }
}

fn validate_location(bucket: &str, path: &str) -> Result<(), ErrorInfo> {
    if bucket.trim().is_empty() {
        return Err(ErrorInfo::internal("bucket name must not be blank"));
    }
    if path.trim().is_empty() || path.ends_with('/') {
        return Err(ErrorInfo::internal(format!(
            "object path '{path}' must name a file"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
