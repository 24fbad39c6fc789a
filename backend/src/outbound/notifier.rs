//! `tracing`-backed user notifications.

use tracing::{info, warn};

use crate::domain::ports::Notifier;

/// Notifier that emits each message as a structured log event.
///
/// Success messages are logged at `info`, errors at `warn`, both under the
/// `notification` target so a subscriber can route them separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, text: &str) {
        info!(target: "notification", text, "success");
    }

    fn error(&self, text: &str) {
        warn!(target: "notification", text, "error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_never_fail() {
        let notifier: &dyn Notifier = &TracingNotifier;
        notifier.success("Lead updated");
        notifier.error("record store transport failed");
    }
}
