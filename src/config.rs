use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Watch list: which CRNs to poll and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub crns: Vec<String>,
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
    /// Alert every cycle a seat is open instead of only on the
    /// closed-to-open transition.
    #[serde(default)]
    pub notify_repeat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub to: Vec<String>,
    /// Implicit TLS from the first byte (SMTPS, usually port 465).
    #[serde(default)]
    pub use_ssl: bool,
    /// Plaintext connect upgraded via STARTTLS (usually port 587).
    /// Ignored when `use_ssl` is set.
    #[serde(default = "default_use_starttls")]
    pub use_starttls: bool,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_poll_seconds() -> u64 {
    60
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_starttls() -> bool {
    true
}

fn default_from_name() -> String {
    "VT Seat Watcher".to_string()
}

fn default_subject_prefix() -> String {
    "[VT Seat Alert]".to_string()
}

impl WatchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            // Allow overrides like SEATWATCH_POLL_SECONDS=30
            .add_source(
                Environment::with_prefix("SEATWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: WatchConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crns.is_empty() {
            return Err(ConfigError::Message("No CRNs configured to watch".into()));
        }

        for crn in &self.crns {
            if crn.is_empty() || crn.len() > 6 || !crn.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Message(format!(
                    "Malformed CRN '{}': expected 1-6 digits",
                    crn
                )));
            }
        }

        if self.poll_seconds == 0 {
            return Err(ConfigError::Message(
                "poll_seconds must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl EmailConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(
                Environment::with_prefix("SEATWATCH_EMAIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: EmailConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_server.is_empty() {
            return Err(ConfigError::Message("smtp_server must not be empty".into()));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::Message(
                "smtp_port must be greater than 0".into(),
            ));
        }

        if self.username.is_empty() || self.password.is_empty() {
            return Err(ConfigError::Message(
                "SMTP username and password are required".into(),
            ));
        }

        if self.to.is_empty() {
            return Err(ConfigError::Message(
                "At least one recipient address is required".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};
    use tempfile::NamedTempFile;

    // Env vars are process-global; tests that set or read them through
    // from_file serialize on this lock.
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn valid_watch_config() -> WatchConfig {
        WatchConfig {
            crns: vec!["93456".to_string(), "11111".to_string()],
            poll_seconds: 60,
            notify_repeat: false,
        }
    }

    fn valid_email_config() -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: "watcher@example.com".to_string(),
            password: "app-password".to_string(),
            to: vec!["me@example.com".to_string()],
            use_ssl: false,
            use_starttls: true,
            from_name: "VT Seat Watcher".to_string(),
            subject_prefix: "[VT Seat Alert]".to_string(),
        }
    }

    fn write_temp_json(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_watch_config_from_file() {
        let _guard = env_lock().lock().unwrap();
        let file = write_temp_json(r#"{"crns": ["93456", "11111"], "poll_seconds": 30}"#);
        let config = WatchConfig::from_file(file.path()).unwrap();

        assert_eq!(config.crns, vec!["93456", "11111"]);
        assert_eq!(config.poll_seconds, 30);
        assert!(!config.notify_repeat);
    }

    #[test]
    fn test_watch_config_default_interval() {
        let _guard = env_lock().lock().unwrap();
        let file = write_temp_json(r#"{"crns": ["93456"]}"#);
        let config = WatchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.poll_seconds, 60);
    }

    #[test]
    fn test_watch_config_env_override() {
        let _guard = env_lock().lock().unwrap();
        let file = write_temp_json(r#"{"crns": ["93456"], "poll_seconds": 60}"#);

        // The documented single-underscore form must win over the file.
        unsafe { std::env::set_var("SEATWATCH_POLL_SECONDS", "30") };
        let config = WatchConfig::from_file(file.path());
        unsafe { std::env::remove_var("SEATWATCH_POLL_SECONDS") };

        assert_eq!(config.unwrap().poll_seconds, 30);
    }

    #[test]
    fn test_watch_config_zero_interval_rejected() {
        let mut config = valid_watch_config();
        config.poll_seconds = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("poll_seconds must be greater than 0"));
    }

    #[test]
    fn test_watch_config_empty_crn_list_rejected() {
        let mut config = valid_watch_config();
        config.crns.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watch_config_malformed_crn_rejected() {
        for bad in ["", "12a45", "1234567", "CS-101"] {
            let mut config = valid_watch_config();
            config.crns = vec![bad.to_string()];

            let result = config.validate();
            assert!(result.is_err(), "CRN '{}' should be rejected", bad);
            assert!(result.unwrap_err().to_string().contains("Malformed CRN"));
        }
    }

    #[test]
    fn test_email_config_from_file_with_defaults() {
        let _guard = env_lock().lock().unwrap();
        let file = write_temp_json(
            r#"{
                "smtp_server": "smtp.gmail.com",
                "username": "watcher@example.com",
                "password": "app-password",
                "to": ["me@example.com"]
            }"#,
        );
        let config = EmailConfig::from_file(file.path()).unwrap();

        // Defaults must cohere: 587 is a STARTTLS port, not SMTPS.
        assert_eq!(config.smtp_port, 587);
        assert!(!config.use_ssl);
        assert!(config.use_starttls);
        assert_eq!(config.from_name, "VT Seat Watcher");
        assert_eq!(config.subject_prefix, "[VT Seat Alert]");
    }

    #[test]
    fn test_email_config_missing_field_rejected() {
        let _guard = env_lock().lock().unwrap();
        let file = write_temp_json(r#"{"smtp_server": "smtp.gmail.com"}"#);
        assert!(EmailConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_email_config_no_recipients_rejected() {
        let mut config = valid_email_config();
        config.to.clear();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("recipient"));
    }

    #[test]
    fn test_email_config_zero_port_rejected() {
        let mut config = valid_email_config();
        config.smtp_port = 0;
        assert!(config.validate().is_err());
    }
}
