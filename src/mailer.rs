//! Email side channel: real SMTP transport or a log-only stand-in.
//!
//! The dispatcher is selected once at startup from configuration; the
//! fanout orchestrator only sees the [`SideChannel`] interface and never
//! needs to know which implementation is active. Delivery is best-effort:
//! the durable log, not the side channel, carries the delivery guarantee.

use std::future::Future;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::GatewayError;

/// One-shot message delivery over an asynchronous side channel.
pub trait SideChannel: Send + Sync {
    /// Sends a single message to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Delivery`] when the transport fails. The
    /// caller is expected to log and discard the outcome; it must never
    /// fail the primary domain write.
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Email dispatcher selected once at process start.
pub enum MailDispatcher {
    /// Real SMTP transport (STARTTLS relay).
    Smtp {
        /// Async SMTP transport over the tokio runtime.
        transport: AsyncSmtpTransport<Tokio1Executor>,
        /// Sender mailbox for all outgoing mail.
        from: Mailbox,
    },
    /// Log-only stand-in used when SMTP is not configured.
    Noop,
}

impl std::fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smtp { from, .. } => f
                .debug_struct("MailDispatcher::Smtp")
                .field("from", from)
                .finish_non_exhaustive(),
            Self::Noop => f.write_str("MailDispatcher::Noop"),
        }
    }
}

impl MailDispatcher {
    /// Builds a dispatcher from the optional SMTP configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] when SMTP is configured but the
    /// relay or sender mailbox cannot be constructed. A missing block is
    /// not an error: it selects the no-op dispatcher.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, GatewayError> {
        let Some(cfg) = smtp else {
            tracing::info!("smtp not configured; email side channel is log-only");
            return Ok(Self::Noop);
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .map_err(|e| GatewayError::Internal(format!("smtp relay {}: {e}", cfg.host)))?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        let from = cfg
            .from
            .parse::<Mailbox>()
            .map_err(|e| GatewayError::Internal(format!("smtp sender {}: {e}", cfg.from)))?;

        tracing::info!(host = %cfg.host, port = cfg.port, "smtp side channel configured");
        Ok(Self::Smtp { transport, from })
    }
}

impl SideChannel for MailDispatcher {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), GatewayError> {
        match self {
            Self::Noop => {
                tracing::info!(to, subject, "email (log-only): would send");
                Ok(())
            }
            Self::Smtp { transport, from } => {
                let to_mailbox = to
                    .parse::<Mailbox>()
                    .map_err(|e| GatewayError::Delivery(format!("recipient {to}: {e}")))?;
                let message = Message::builder()
                    .from(from.clone())
                    .to(to_mailbox)
                    .subject(subject)
                    .body(body.to_string())
                    .map_err(|e| GatewayError::Delivery(format!("message build: {e}")))?;
                transport
                    .send(message)
                    .await
                    .map(|_| ())
                    .map_err(|e| GatewayError::Delivery(format!("smtp send: {e}")))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_selects_noop() {
        let dispatcher = MailDispatcher::from_config(None);
        assert!(matches!(dispatcher, Ok(MailDispatcher::Noop)));
    }

    #[test]
    fn configured_smtp_builds_transport() {
        let cfg = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from: "Coachlink <no-reply@example.com>".to_string(),
        };
        let dispatcher = MailDispatcher::from_config(Some(&cfg));
        assert!(matches!(dispatcher, Ok(MailDispatcher::Smtp { .. })));
    }

    #[test]
    fn bad_sender_mailbox_is_rejected() {
        let cfg = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from: "not a mailbox".to_string(),
        };
        assert!(MailDispatcher::from_config(Some(&cfg)).is_err());
    }

    #[tokio::test]
    async fn noop_send_always_succeeds() {
        let dispatcher = MailDispatcher::Noop;
        let result = dispatcher.send("a@b.c", "hi", "body").await;
        assert!(result.is_ok());
    }
}
