//! Process-local adapters for tests and demos.
//!
//! Both adapters keep their data behind a mutex and stamp timestamps from an
//! injected [`mockable::Clock`], so tests can assert on exact values.

mod object_storage;
mod record_store;

pub use object_storage::InMemoryObjectStorage;
pub use record_store::InMemoryRecordStore;
