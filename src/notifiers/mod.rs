pub mod desktop;
pub mod email;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

pub use desktop::DesktopNotifier;
pub use email::EmailNotifier;

/// Payload for a single newly-opened course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAlert {
    pub crn: String,
    pub seats: u32,
    pub title: Option<String>,
    /// Raw row text from the results page, for context in the email body.
    pub detail: String,
}

/// A notification channel. Failures are reported back as errors but the
/// poll loop only logs them; no channel can stop the watcher.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, alert: &SeatAlert) -> Result<()>;
}
