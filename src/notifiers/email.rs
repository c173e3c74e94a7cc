use async_trait::async_trait;
use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use crate::config::EmailConfig;
use crate::notifiers::{Notifier, SeatAlert};
use crate::utils::error::{AppError, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// SMTP alert channel. One synchronous send per newly-opened course; a send
/// that fails or times out is logged by the caller and the loop moves on.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        EmailNotifier { config }
    }

    fn format_subject(&self, alert: &SeatAlert) -> String {
        format!("{} CRN {} seat open", self.config.subject_prefix, alert.crn)
    }

    fn format_body(&self, alert: &SeatAlert) -> String {
        let mut body = String::new();

        match &alert.title {
            Some(title) => body.push_str(&format!(
                "CRN {} ({}) now has {} open seat(s).\n",
                alert.crn, title, alert.seats
            )),
            None => body.push_str(&format!(
                "CRN {} now has {} open seat(s).\n",
                alert.crn, alert.seats
            )),
        }

        body.push_str(&format!(
            "Detected at {}.\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        if !alert.detail.is_empty() {
            body.push_str("\nResults row:\n");
            body.push_str(&alert.detail);
            body.push('\n');
        }

        body
    }

    /// `use_ssl` wraps the connection in TLS from the first byte (SMTPS);
    /// `use_starttls` connects plaintext and upgrades, which is what port
    /// 587 relays expect. Neither set means an unencrypted local relay.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let builder = if self.config.use_ssl {
            SmtpTransport::relay(&self.config.smtp_server)
                .map_err(|e| AppError::notification("email", e))?
        } else if self.config.use_starttls {
            SmtpTransport::starttls_relay(&self.config.smtp_server)
                .map_err(|e| AppError::notification("email", e))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_server)
        };

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SEND_TIMEOUT))
            .build())
    }

    fn build_message(&self, alert: &SeatAlert) -> Result<Message> {
        let from = format!("{} <{}>", self.config.from_name, self.config.username)
            .parse()
            .map_err(|e| AppError::notification("email", e))?;

        let mut builder = Message::builder().from(from);
        for recipient in &self.config.to {
            builder = builder.to(recipient
                .parse()
                .map_err(|e| AppError::notification("email", e))?);
        }

        builder
            .subject(self.format_subject(alert))
            .header(header::ContentType::TEXT_PLAIN)
            .body(self.format_body(alert))
            .map_err(|e| AppError::notification("email", e))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, alert: &SeatAlert) -> Result<()> {
        let message = self.build_message(alert)?;
        let mailer = self.build_transport()?;

        mailer
            .send(&message)
            .map(|_| ())
            .map_err(|e| AppError::notification("email", e))
    }
}
