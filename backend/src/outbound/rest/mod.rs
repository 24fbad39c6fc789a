//! PostgREST-style record store adapter.
//!
//! Tables are addressed as `{base}/rest/v1/{table}`; filters travel as query
//! parameters and writes ask for `return=representation` so the persisted
//! rows come back in the response.

mod dto;
mod http_record_store;
mod query;

pub use http_record_store::PostgrestRecordStore;
