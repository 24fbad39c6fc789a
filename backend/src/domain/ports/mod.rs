//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod notifier;
mod object_storage;
mod record_store;

#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::Notifier;
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{
    DEFAULT_CACHE_CONTROL_SECONDS, DEFAULT_CONTENT_TYPE, DEFAULT_LIST_LIMIT, ListOptions,
    ObjectStorage, ObjectStorageError, SortBy, SortColumn, SortOrder, StoredObject,
    UploadOptions, UploadedObject,
};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{RecordStore, RecordStoreError};
