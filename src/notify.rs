use async_trait::async_trait;

#[derive(Debug)]
pub struct NotifyError {
    pub message: String,
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NotifyError {}

impl From<String> for NotifyError {
    fn from(s: String) -> Self {
        NotifyError { message: s }
    }
}

impl From<&str> for NotifyError {
    fn from(s: &str) -> Self {
        NotifyError {
            message: s.to_string(),
        }
    }
}

/// Delivers the reset link to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_reset(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        token: &str,
    ) -> Result<(), NotifyError>;
}

/// Writes the reset link to the log instead of sending mail. Development only.
pub struct LogNotifier {
    link_base: String,
}

impl LogNotifier {
    pub fn new(link_base: String) -> Self {
        Self { link_base }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_reset(
        &self,
        _recipient_name: &str,
        recipient_email: &str,
        token: &str,
    ) -> Result<(), NotifyError> {
        tracing::warn!(
            "System SMTP not configured. Password reset link for {recipient_email}: {}/{token}",
            self.link_base
        );
        Ok(())
    }
}
