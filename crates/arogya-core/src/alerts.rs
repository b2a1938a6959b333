//! Bounded, newest-first alert log.

use arogya_types::{Alert, AlertId, AlertSeverity};
use chrono::{DateTime, Utc};

/// Maximum number of alerts retained. Older alerts are dropped.
pub const MAX_ALERTS: usize = 500;

/// In-memory alert log, newest first.
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: Vec<Alert>,
}

impl AlertLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { alerts: Vec::new() }
    }

    /// Prepend an alert, dropping the oldest entries past [`MAX_ALERTS`].
    pub fn push(&mut self, alert: Alert) {
        self.alerts.insert(0, alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    /// Build and prepend an alert, returning its id.
    pub fn raise(&mut self, severity: AlertSeverity, message: String, now: DateTime<Utc>) -> AlertId {
        let id = AlertId::new();
        self.push(Alert {
            id,
            severity,
            message,
            created_at: now,
        });
        id
    }

    /// All alerts, newest first.
    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    /// Number of alerts held.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut log = AlertLog::new();
        let now = Utc::now();
        log.raise(AlertSeverity::Info, String::from("first"), now);
        let second = log.raise(AlertSeverity::Critical, String::from("second"), now);

        assert_eq!(log.len(), 2);
        assert_eq!(log.all().first().unwrap().id, second);
        assert_eq!(log.all().last().unwrap().message, "first");
    }

    #[test]
    fn capped_at_max() {
        let mut log = AlertLog::new();
        let now = Utc::now();
        for i in 0..MAX_ALERTS.saturating_add(10) {
            log.raise(AlertSeverity::Warning, format!("alert {i}"), now);
        }
        assert_eq!(log.len(), MAX_ALERTS);
        assert_eq!(
            log.all().first().unwrap().message,
            format!("alert {}", MAX_ALERTS.saturating_add(9))
        );
        assert_eq!(log.all().last().unwrap().message, "alert 10");
    }
}
