use lettre::{
    message::{header::ContentType, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Outbound SMTP mail. Signup OTPs go to the fixed approver mailbox for
/// out-of-band approval; password reset links go to the requester.
#[derive(Clone)]
pub struct MailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    approver: String,
}

impl MailService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::MailTransport(format!("SMTP setup failed: {}", e)))?
            .port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(MailService {
            transport: builder.build(),
            from: config.from_email.clone(),
            approver: config.approver_email.clone(),
        })
    }

    /// Notify the approver mailbox of a signup request. The code never goes
    /// to the requester.
    pub async fn send_signup_otp(
        &self,
        requester_email: &str,
        username: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<()> {
        let subject = format!("Signup approval code for {}", requester_email);
        let body = format!(
            "A new account was requested.\n\n\
             Username: {}\nEmail: {}\n\n\
             Approval code: {}\n\n\
             The code expires in {} minutes.\n",
            username, requester_email, code, ttl_minutes
        );
        let approver = self.approver.clone();
        self.send(&approver, &subject, body).await
    }

    pub async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<()> {
        let body = format!(
            "A password reset was requested for this address.\n\n\
             Use the link below to choose a new password:\n{}\n\n\
             If you did not request this, you can ignore this message.\n",
            reset_link
        );
        self.send(to, "Password Reset Request", body).await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::MailTransport(format!("Bad sender address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::MailTransport(format!("Bad recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::MailTransport(format!("Message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(classify_smtp_error)
    }
}

// Best-effort classification: surface a misconfigured SMTP login
// differently from a generic transport failure. The error stays an opaque
// string either way.
fn classify_smtp_error(err: lettre::transport::smtp::Error) -> AppError {
    let msg = err.to_string();
    let lowered = msg.to_lowercase();
    if lowered.contains("auth") || lowered.contains("credential") {
        AppError::MailAuthentication(msg)
    } else {
        AppError::MailTransport(msg)
    }
}
