//! Port for fire-and-forget user notifications.

/// User-facing message sink. Return values are never inspected.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Report a completed action.
    fn success(&self, text: &str);

    /// Report a failed action.
    fn error(&self, text: &str);
}
