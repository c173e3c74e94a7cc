use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Notification error: {channel}: {message}")]
    Notification { channel: String, message: String },
}

impl AppError {
    pub fn notification(channel: impl Into<String>, message: impl ToString) -> Self {
        AppError::Notification {
            channel: channel.into(),
            message: message.to_string(),
        }
    }

    /// Fatal errors end the process; everything else is absorbed by the
    /// poll loop and only shows up in logs.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::SessionLost(_))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_notification_error_display() {
        let err = AppError::notification("email", "relay refused");
        assert_eq!(err.to_string(), "Notification error: email: relay refused");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::SessionLost("tab closed".into()).is_fatal());
        assert!(!AppError::notification("desktop", "no dbus").is_fatal());
        assert!(!AppError::Scraping("bad row".into()).is_fatal());
    }
}
