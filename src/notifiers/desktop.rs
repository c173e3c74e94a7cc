use async_trait::async_trait;
use notify_rust::Notification;

use crate::notifiers::{Notifier, SeatAlert};
use crate::utils::error::{AppError, Result};

const TOAST_TITLE: &str = "VT Seat Alert";
const TOAST_TIMEOUT_MS: i32 = 8000;

/// Fire-and-forget desktop toast. Missing notification daemons are a
/// logged warning, never fatal.
pub struct DesktopNotifier;

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopNotifier {
    pub fn new() -> Self {
        DesktopNotifier
    }

    fn format_message(&self, alert: &SeatAlert) -> String {
        match &alert.title {
            Some(title) => format!(
                "CRN {} ({}) seat open: {} remaining",
                alert.crn, title, alert.seats
            ),
            None => format!("CRN {} seat open: {} remaining", alert.crn, alert.seats),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn notify(&self, alert: &SeatAlert) -> Result<()> {
        Notification::new()
            .summary(TOAST_TITLE)
            .body(&self.format_message(alert))
            .timeout(TOAST_TIMEOUT_MS)
            .show()
            .map(|_| ())
            .map_err(|e| AppError::notification("desktop", e))
    }
}
