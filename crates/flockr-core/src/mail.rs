use tracing::info;

/// Outbound mail for the password-reset flow. Fire-and-forget: delivery
/// failures are the sender's to log, never the caller's to handle.
pub trait MailSender: Send + Sync {
    fn send_reset_email(&self, to: &str, code: &str);
}

/// Writes reset codes to the log instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl MailSender for LogMailer {
    fn send_reset_email(&self, to: &str, code: &str) {
        info!("Password reset code for {}: {}", to, code);
    }
}
