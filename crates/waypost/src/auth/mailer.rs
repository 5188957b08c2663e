//! Outbound mail delivery over an SMTP relay.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use waypost_common::WaypostError;

/// Fire-and-forget message delivery to an address.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), WaypostError>;
}

/// SMTP relay mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: String,
    ) -> Result<Self, WaypostError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| WaypostError::Config(format!("smtp relay: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), WaypostError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| WaypostError::Config(format!("smtp from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|_| WaypostError::InvalidInput("Invalid email address".into()))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| WaypostError::Internal(format!("mail build: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| WaypostError::Upstream(format!("mail relay: {e}")))?;

        tracing::debug!(to = %to, "OTP mail dispatched");
        Ok(())
    }
}
