//! SMTP delivery of the rendered document.

use crate::config::SmtpSettings;
use casebook_domain::traits::MailDispatcher;
use casebook_domain::{RecipientAddress, RenderedDocument, RunId};
use casebook_extractor::RetryPolicy;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

/// Plain text body sent alongside the attachment
pub const MAIL_BODY: &str = "Please find the extracted use cases document attached.";

const INITIAL_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 8_000;

/// Errors raised while delivering mail
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Sender or recipient address rejected by the mail library
    #[error("Invalid address {address}: {reason}")]
    Address {
        /// The offending address
        address: String,
        /// Why it was rejected
        reason: String,
    },

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Message(String),

    /// The SMTP transport could not be configured
    #[error("Failed to configure SMTP transport: {0}")]
    Transport(String),

    /// Every send attempt failed
    #[error("Mail not delivered after {attempts} attempt(s): {reason}")]
    Delivery {
        /// Attempts made
        attempts: usize,
        /// Last transport error
        reason: String,
    },
}

/// Subject line for a run's mail
pub fn subject_for(run_id: &RunId) -> String {
    format!("Extracted Use Cases Document ({})", run_id.short())
}

/// Build the multipart message: a plain body plus the document attachment
pub fn build_message(
    from: &str,
    subject: &str,
    attachment: &RenderedDocument,
    recipients: &[RecipientAddress],
) -> Result<Message, DispatchError> {
    let mut builder = Message::builder().from(parse_mailbox(from)?).subject(subject);
    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient.as_str())?);
    }

    let content_type = ContentType::parse(&attachment.content_type)
        .map_err(|e| DispatchError::Message(e.to_string()))?;

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(MAIL_BODY.to_string()))
                .singlepart(
                    Attachment::new(attachment.file_name.clone())
                        .body(attachment.bytes.clone(), content_type),
                ),
        )
        .map_err(|e| DispatchError::Message(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address.parse().map_err(|e: lettre::address::AddressError| DispatchError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Sends mail over SMTP with STARTTLS and username/password auth
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    server: String,
    retry: RetryPolicy,
}

impl SmtpMailer {
    /// Create a mailer from SMTP settings
    ///
    /// No connection is made until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, DispatchError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(|e| DispatchError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout()))
            .build();

        Ok(Self {
            transport,
            from: settings.from.clone(),
            server: settings.server.clone(),
            retry: RetryPolicy::new(settings.max_retries, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS),
        })
    }
}

impl MailDispatcher for SmtpMailer {
    type Error = DispatchError;

    async fn send(
        &self,
        subject: &str,
        attachment: &RenderedDocument,
        recipients: &[RecipientAddress],
    ) -> Result<(), DispatchError> {
        let message = build_message(&self.from, subject, attachment, recipients)?;

        self.retry
            .retry("smtp send", || {
                let message = message.clone();
                async move { self.transport.send(message).await }
            })
            .await
            .map_err(|failure| DispatchError::Delivery {
                attempts: failure.attempts,
                reason: failure.error.to_string(),
            })?;

        info!(
            server = %self.server,
            recipients = recipients.len(),
            attachment = %attachment.file_name,
            "Mail sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> RenderedDocument {
        RenderedDocument::with_default_name(
            "docx",
            crate::render::DOCX_CONTENT_TYPE,
            b"PK fake docx".to_vec(),
        )
    }

    fn recipients() -> Vec<RecipientAddress> {
        ["a@x.com", "b@y.org"]
            .iter()
            .map(|a| RecipientAddress::parse(a).unwrap())
            .collect()
    }

    #[test]
    fn test_subject_includes_short_run_id() {
        let run_id = RunId::from_value(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(subject_for(&run_id), "Extracted Use Cases Document (01234567)");
    }

    #[test]
    fn test_build_message() {
        let message = build_message("bot@example.com", "Weekly", &document(), &recipients()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("a@x.com"));
        assert!(raw.contains("b@y.org"));
        assert!(raw.contains("Subject: Weekly"));
        assert!(raw.contains(MAIL_BODY));
        assert!(raw.contains("Extracted_Use_Cases.docx"));
        assert!(raw.contains("multipart/mixed"));
    }

    #[test]
    fn test_build_message_with_display_name() {
        let message = build_message(
            "Casebook <noreply@example.com>",
            "Weekly",
            &document(),
            &recipients(),
        );
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_bad_sender() {
        let result = build_message("not an address", "Weekly", &document(), &recipients());
        assert!(matches!(result, Err(DispatchError::Address { .. })));
    }

    #[test]
    fn test_build_message_bad_content_type() {
        let mut doc = document();
        doc.content_type = "nonsense".to_string();
        let result = build_message("bot@example.com", "Weekly", &doc, &recipients());
        assert!(matches!(result, Err(DispatchError::Message(_))));
    }

    #[test]
    fn test_build_message_accepts_every_validated_recipient() {
        let validation = casebook_gatekeeper::RecipientValidator::default_config().validate([
            "ok@example.com",
            "first.last+tag@mail.example.org",
            "o_k%1@sub-domain.io",
            "a..b@example.com",
            ".lead@example.com",
            "tail.@example.com",
            "x@ex..com",
            "x@-ex.com",
            "x@.ex.com",
        ]);
        assert_eq!(validation.accepted.len(), 3);

        let message = build_message("bot@example.com", "Weekly", &document(), &validation.accepted);
        assert!(message.is_ok());
    }

    fn settings(server: &str, port: u16) -> SmtpSettings {
        SmtpSettings {
            server: server.to_string(),
            port,
            username: "bot@example.com".to_string(),
            password: "secret".to_string(),
            from: "bot@example.com".to_string(),
            timeout_secs: 1,
            max_retries: 1,
        }
    }

    #[tokio::test]
    async fn test_new_builds_transport() {
        assert!(SmtpMailer::new(&settings("smtp.example.com", 587)).is_ok());
    }

    #[tokio::test]
    async fn test_send_exhausts_retries_against_closed_port() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mailer = SmtpMailer::new(&settings("127.0.0.1", port)).unwrap();

        let result = mailer.send("Weekly", &document(), &recipients()).await;

        match result {
            Err(DispatchError::Delivery { attempts, reason }) => {
                assert_eq!(attempts, 2);
                assert!(!reason.is_empty());
            }
            other => panic!("expected delivery failure, got {:?}", other),
        }
    }
}
