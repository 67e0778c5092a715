pub mod templates;

use async_trait::async_trait;
use chrono::Duration;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::notify::{NotifyError, Notifier};

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    app_name: String,
    /// Absolute URL of the reset route; the token is appended as a path segment.
    link_base: String,
    token_ttl: Duration,
}

impl SystemMailer {
    pub fn new(
        config: &SmtpConfig,
        app_name: &str,
        link_base: String,
        token_ttl: Duration,
    ) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            app_name: app_name.to_string(),
            link_base,
            token_ttl,
        })
    }

    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/{token}", self.link_base)
    }

    async fn send(
        &self,
        to_name: &str,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), String> {
        let to = Mailbox::new(
            Some(to_name.to_string()),
            to_email
                .parse()
                .map_err(|e| format!("Invalid to address: {e}"))?,
        );

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SystemMailer {
    async fn send_reset(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        token: &str,
    ) -> Result<(), NotifyError> {
        let html = templates::render_password_reset(
            recipient_name,
            &self.app_name,
            &self.reset_url(token),
            self.token_ttl,
        )
        .map_err(|e| format!("Failed to render reset email: {e}"))?;
        self.send(recipient_name, recipient_email, "Reset your password", &html)
            .await
            .map_err(NotifyError::from)
    }
}
