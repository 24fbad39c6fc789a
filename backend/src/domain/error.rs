//! Error payload carried in the `error` slot of an [`Envelope`].
//!
//! [`ErrorInfo`] is transport agnostic. Outbound adapters raise their own port
//! errors, and the data-access services reshape those into this type so every
//! caller branches on the same four categories.
//!
//! [`Envelope`]: crate::domain::Envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure category used to classify an [`ErrorInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or connectivity fault, including timeouts and 5xx responses.
    Transport,
    /// A single-record operation matched zero rows or objects.
    NotFound,
    /// The backend rejected a write, for example a size or type constraint.
    Constraint,
    /// Any fault raised inside the operation itself.
    Internal,
}

impl ErrorKind {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::Transport => "backend transport failed",
            Self::NotFound => "record not found",
            Self::Constraint => "backend rejected the request",
            Self::Internal => "unexpected internal failure",
        }
    }
}

/// Error detail returned in a failed [`Envelope`](crate::domain::Envelope).
///
/// ## Invariants
/// - `message` is never blank; blank input is replaced by a per-kind default.
///
/// # Examples
/// ```
/// use leadline::domain::{ErrorInfo, ErrorKind};
///
/// let err = ErrorInfo::not_found("lead 999 not found");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert!(err.code().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorInfo {
    /// Create a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            kind,
            message,
            code: None,
            details: None,
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message suitable for a user notification.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Backend-specific code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Supplementary structured detail.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a backend-specific code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach an optional backend-specific code.
    #[must_use]
    pub fn with_optional_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use leadline::domain::ErrorInfo;
    /// use serde_json::json;
    ///
    /// let err = ErrorInfo::constraint("value too long")
    ///     .with_details(json!({ "column": "city" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Convenience constructor for [`ErrorKind::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Convenience constructor for [`ErrorKind::Constraint`].
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Constraint, message)
    }

    /// Convenience constructor for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ErrorInfo {}

#[cfg(test)]
mod tests {
    //! Constructor and serialisation coverage for error payloads.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::transport(ErrorInfo::transport("down"), ErrorKind::Transport)]
    #[case::not_found(ErrorInfo::not_found("gone"), ErrorKind::NotFound)]
    #[case::constraint(ErrorInfo::constraint("too long"), ErrorKind::Constraint)]
    #[case::internal(ErrorInfo::internal("boom"), ErrorKind::Internal)]
    fn constructors_set_kind(#[case] error: ErrorInfo, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[rstest]
    fn blank_messages_fall_back_to_kind_default() {
        let err = ErrorInfo::transport("   ");
        assert_eq!(err.message(), "backend transport failed");
    }

    #[rstest]
    fn display_includes_code_when_present() {
        let err = ErrorInfo::constraint("value too long").with_code("22001");
        assert_eq!(err.to_string(), "value too long (22001)");
    }

    #[rstest]
    fn serialises_kind_in_snake_case_and_omits_empty_fields() {
        let err = ErrorInfo::not_found("lead 999 not found");
        let value = serde_json::to_value(&err).expect("error serialises");
        assert_eq!(
            value,
            json!({ "kind": "not_found", "message": "lead 999 not found" })
        );
    }
}
