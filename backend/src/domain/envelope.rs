//! Uniform `{data, error}` result shape returned by every data-access call.

use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

use super::ErrorInfo;

/// Result envelope returned instead of raising.
///
/// Exactly one side is populated: `data` on success, `error` on failure. The
/// fields are private so the envelope can only be built through
/// [`Envelope::success`], [`Envelope::failure`], or a `Result` conversion.
///
/// # Examples
/// ```
/// use leadline::domain::{Envelope, ErrorInfo};
///
/// let ok: Envelope<u32> = Envelope::success(7);
/// assert_eq!(ok.data(), Some(&7));
/// assert!(ok.error().is_none());
///
/// let failed: Envelope<u32> = Envelope::failure(ErrorInfo::transport("offline"));
/// assert!(failed.data().is_none());
/// assert_eq!(failed.error().map(ErrorInfo::message), Some("offline"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an envelope carries the only report of a failed operation"]
pub struct Envelope<T> {
    data: Option<T>,
    error: Option<ErrorInfo>,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Wrap a failure.
    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Payload, present on success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Error detail, present on failure.
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Transform the payload while keeping any error untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Convert into a standard `Result` for `?`-style call sites.
    ///
    /// # Errors
    ///
    /// Returns the carried [`ErrorInfo`] when the envelope reports a failure.
    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err(ErrorInfo::internal("envelope carried neither data nor error")),
        }
    }

    /// Split into the raw `(data, error)` pair.
    pub fn into_parts(self) -> (Option<T>, Option<ErrorInfo>) {
        (self.data, self.error)
    }
}

impl<T> From<Result<T, ErrorInfo>> for Envelope<T> {
    fn from(value: Result<T, ErrorInfo>) -> Self {
        match value {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error),
        }
    }
}

// Both keys are always emitted so consumers never see a missing field.
impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("error", &self.error)?;
        state.end()
    }
}
