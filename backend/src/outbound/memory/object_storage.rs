//! In-memory [`ObjectStorage`] keyed by bucket and path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    ListOptions, ObjectStorage, ObjectStorageError, SortColumn, SortOrder, StoredObject,
    UploadOptions, UploadedObject,
};

const URL_BASE: &str = "memory://storage";

#[derive(Debug, Clone)]
struct MemoryObject {
    id: Uuid,
    content: Vec<u8>,
    content_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

type Buckets = BTreeMap<String, BTreeMap<String, MemoryObject>>;

/// Object storage holding content in process memory.
pub struct InMemoryObjectStorage {
    buckets: Mutex<Buckets>,
    clock: Arc<dyn Clock>,
}

impl InMemoryObjectStorage {
    /// Empty storage stamping times from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(Buckets::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>, ObjectStorageError> {
        self.buckets
            .lock()
            .map_err(|_| ObjectStorageError::transport("in-memory object storage lock poisoned"))
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: &UploadOptions,
        upsert: bool,
    ) -> Result<UploadedObject, ObjectStorageError> {
        let now = self.clock.utc();
        let mut buckets = self.lock()?;
        let objects = buckets.entry(bucket.to_owned()).or_default();
        let created_at = match objects.get(path) {
            Some(_) if !upsert => return Err(ObjectStorageError::already_exists(path)),
            Some(existing) => existing.created_at,
            None => now,
        };
        objects.insert(
            path.to_owned(),
            MemoryObject {
                id: Uuid::new_v4(),
                content,
                content_type: options.content_type.clone(),
                created_at,
                updated_at: now,
            },
        );
        Ok(UploadedObject {
            path: path.to_owned(),
            full_path: format!("{bucket}/{path}"),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{URL_BASE}/object/public/{bucket}/{path}")
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_seconds: u64,
    ) -> Result<String, ObjectStorageError> {
        let exists = self
            .lock()?
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(path));
        if !exists {
            return Err(ObjectStorageError::not_found(path));
        }
        let seconds = i64::try_from(expires_in_seconds).map_err(|_| {
            ObjectStorageError::invalid_request("signed URL expiry is out of range")
        })?;
        let expires_at = self.clock.utc() + TimeDelta::seconds(seconds);
        Ok(format!(
            "{URL_BASE}/object/sign/{bucket}/{path}?expires={}",
            expires_at.timestamp()
        ))
    }

    async fn remove(
        &self,
        bucket: &str,
        paths: &[String],
    ) -> Result<Vec<String>, ObjectStorageError> {
        let mut buckets = self.lock()?;
        let Some(objects) = buckets.get_mut(bucket) else {
            return Ok(Vec::new());
        };
        Ok(paths
            .iter()
            .filter(|path| objects.remove(path.as_str()).is_some())
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, ObjectStorageError> {
        let buckets = self.lock()?;
        let Some(objects) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };
        let folder = folder.trim_matches('/');
        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{folder}/")
        };

        let mut folders = BTreeSet::new();
        let mut entries = Vec::new();
        for (path, object) in objects.range(prefix.clone()..) {
            let Some(rest) = path.strip_prefix(prefix.as_str()) else {
                break;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    folders.insert(child.to_owned());
                }
                None => entries.push(StoredObject {
                    name: rest.to_owned(),
                    id: Some(object.id),
                    created_at: Some(object.created_at),
                    updated_at: Some(object.updated_at),
                    size: Some(object.content.len() as u64),
                    content_type: Some(object.content_type.clone()),
                }),
            }
        }
        entries.extend(folders.into_iter().map(|name| StoredObject {
            name,
            id: None,
            created_at: None,
            updated_at: None,
            size: None,
            content_type: None,
        }));

        sort_entries(&mut entries, options);
        Ok(entries
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectStorageError> {
        self.lock()?
            .get(bucket)
            .and_then(|objects| objects.get(path))
            .map(|object| object.content.clone())
            .ok_or_else(|| ObjectStorageError::not_found(path))
    }
}

fn sort_entries(entries: &mut [StoredObject], options: &ListOptions) {
    entries.sort_by(|left, right| {
        let ordering = match options.sort_by.column {
            SortColumn::Name => left.name.cmp(&right.name),
            SortColumn::CreatedAt => left.created_at.cmp(&right.created_at),
            SortColumn::UpdatedAt => left.updated_at.cmp(&right.updated_at),
        }
        .then_with(|| left.name.cmp(&right.name));
        match options.sort_by.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
