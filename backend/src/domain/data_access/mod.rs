//! Generic data-access services.
//!
//! [`RecordAccess`] wraps a [`RecordStore`](crate::domain::ports::RecordStore)
//! and [`FileAccess`] wraps an
//! [`ObjectStorage`](crate::domain::ports::ObjectStorage). Every public
//! operation is total: port errors, decode failures, and panics raised while
//! the operation runs are all reshaped into the `error` slot of an
//! [`Envelope`]. Calls are independent; nothing spans a transaction.

mod files;
mod records;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{error, warn};

use crate::domain::ports::{ObjectStorageError, RecordStoreError};
use crate::domain::{Envelope, ErrorInfo};

pub use files::{DEFAULT_SIGNED_URL_EXPIRY_SECONDS, FileAccess};
pub use records::RecordAccess;

/// HTTP-style code attached to "already exists" upload failures.
pub const ALREADY_EXISTS_CODE: &str = "409";

/// Drive `future` to completion and normalise its outcome.
async fn run_guarded<T, F>(operation: &'static str, target: &str, future: F) -> Envelope<T>
where
    F: Future<Output = Result<T, ErrorInfo>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(data)) => Envelope::success(data),
        Ok(Err(failure)) => {
            warn!(
                operation,
                target,
                kind = ?failure.kind(),
                code = ?failure.code(),
                message = failure.message(),
                "data access call failed"
            );
            Envelope::failure(failure)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(operation, target, panic = %message, "data access call panicked");
            Envelope::failure(ErrorInfo::internal(format!(
                "{operation} on {target} failed unexpectedly: {message}"
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

fn map_record_store_error(error: RecordStoreError) -> ErrorInfo {
    match error {
        RecordStoreError::Transport { message } => ErrorInfo::transport(message),
        RecordStoreError::Rejected {
            message,
            code,
            details,
        } => {
            let info = ErrorInfo::constraint(message).with_code(code);
            match details {
                Some(details) => info.with_details(details),
                None => info,
            }
        }
        RecordStoreError::Decode { message } => {
            ErrorInfo::internal(format!("backend response could not be decoded: {message}"))
        }
        RecordStoreError::InvalidRequest { message } => {
            ErrorInfo::internal(format!("request was not sent: {message}"))
        }
    }
}

fn map_object_storage_error(error: ObjectStorageError) -> ErrorInfo {
    match error {
        ObjectStorageError::Transport { message } => ErrorInfo::transport(message),
        ObjectStorageError::AlreadyExists { path } => {
            ErrorInfo::constraint(format!("an object already exists at {path}"))
                .with_code(ALREADY_EXISTS_CODE)
        }
        ObjectStorageError::NotFound { path } => {
            ErrorInfo::not_found(format!("no object exists at {path}"))
        }
        ObjectStorageError::Rejected { message, code } => {
            ErrorInfo::constraint(message).with_code(code)
        }
        ObjectStorageError::Decode { message } => {
            ErrorInfo::internal(format!("storage response could not be decoded: {message}"))
        }
        ObjectStorageError::InvalidRequest { message } => {
            ErrorInfo::internal(format!("request was not sent: {message}"))
        }
    }
}
