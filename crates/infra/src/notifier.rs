//! Outbound notifications (contact request emails).
//!
//! Delivery is best-effort: callers log a failed send and carry on.
//! [`SmtpNotifier`] relays mail when `MAIL_SERVER` is configured; otherwise
//! [`LogNotifier`] records what would have been sent.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Email telling a jobseeker an employer wants to get in touch.
    pub fn contact_request(to: &str, company: Option<&str>, message: &str) -> Self {
        let company = company.unwrap_or("An employer");
        Self {
            to: to.to_string(),
            subject: "New contact request".to_string(),
            body: format!("{company} would like to contact you:\n\n{message}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        warn!(
            to = %notification.to,
            subject = %notification.subject,
            "mail not configured; notification logged, not delivered"
        );
        Ok(())
    }
}

/// Delivers notifications as plain-text email through an SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let sender = parse_mailbox(&config.sender)?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|e| NotifyError(format!("smtp relay {}: {e}", config.server)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        let builder = builder.port(config.port);
        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        Ok(Self { transport: builder.build(), sender })
    }

    fn message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.sender.clone())
            .to(parse_mailbox(&notification.to)?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| NotifyError(e.to_string()))
    }
}

impl core::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpNotifier").field("sender", &self.sender.to_string()).finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.message(notification)?;
        self.transport.send(message).await.map_err(|e| NotifyError(e.to_string()))?;
        info!(to = %notification.to, subject = %notification.subject, "notification delivered");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError(format!("invalid address {address:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_request_mentions_company_and_message() {
        let n = Notification::contact_request("sam@example.com", Some("Jane's Tech"), "We would like to offer you a job.");
        assert_eq!(n.to, "sam@example.com");
        assert!(n.body.starts_with("Jane's Tech"));
        assert!(n.body.contains("offer you a job"));

        let anon = Notification::contact_request("sam@example.com", None, "hi");
        assert!(anon.body.starts_with("An employer"));
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let n = Notification::contact_request("a@b.c", None, "hi");
        assert!(LogNotifier.send(&n).await.is_ok());
    }

    fn local_relay(port: u16) -> MailConfig {
        MailConfig {
            server: "127.0.0.1".to_string(),
            port,
            use_tls: false,
            username: None,
            password: None,
            sender: "Job Portal <noreply@example.com>".to_string(),
        }
    }

    #[test]
    fn smtp_message_carries_sender_recipient_and_subject() {
        let smtp = SmtpNotifier::new(&local_relay(1025)).unwrap();
        let n = Notification::contact_request("sam@example.com", Some("Acme"), "Coffee?");
        let raw = String::from_utf8(smtp.message(&n).unwrap().formatted()).unwrap();

        assert!(raw.lines().any(|l| l.starts_with("From: ") && l.contains("<noreply@example.com>")));
        assert!(raw.lines().any(|l| l.starts_with("To: ") && l.contains("sam@example.com")));
        assert!(raw.contains("Subject: New contact request"));
        assert!(raw.contains("Acme would like to contact you"));
    }

    #[test]
    fn smtp_rejects_bad_addresses() {
        let mut cfg = local_relay(1025);
        cfg.sender = "not an address".to_string();
        assert!(SmtpNotifier::new(&cfg).is_err());

        let smtp = SmtpNotifier::new(&local_relay(1025)).unwrap();
        let n = Notification::contact_request("nobody", None, "hi");
        assert!(smtp.message(&n).is_err());
    }

    #[tokio::test]
    async fn smtp_send_fails_when_relay_is_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let smtp = SmtpNotifier::new(&local_relay(port)).unwrap();
        let n = Notification::contact_request("sam@example.com", None, "hi");
        assert!(smtp.send(&n).await.is_err());
    }
}
