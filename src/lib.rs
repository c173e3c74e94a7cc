pub mod config;
pub mod notifiers;
pub mod poller;
pub mod scraper;
pub mod session;
pub mod tracker;
pub mod utils;

// Re-export commonly used types
pub use config::{EmailConfig, WatchConfig};
pub use notifiers::{Notifier, SeatAlert};
pub use scraper::{Observation, SeatScraper, SeatStatus};
pub use session::PageSource;
pub use utils::error::{AppError, Result};
