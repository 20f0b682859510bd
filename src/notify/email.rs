// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Digest, Notifier};
use crate::config::EmailSettings;

/// SMTP delivery with STARTTLS, authenticating as the sender.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(cfg: &EmailSettings) -> Result<Self> {
        let creds = Credentials::new(cfg.from.clone(), cfg.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_server)
            .with_context(|| format!("invalid SMTP_SERVER {:?}", cfg.smtp_server))?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build();

        let from = cfg
            .from
            .parse()
            .with_context(|| format!("invalid EMAIL_FROM {:?}", cfg.from))?;
        let to = cfg
            .to
            .parse()
            .with_context(|| format!("invalid EMAIL_TO {:?}", cfg.to))?;

        Ok(Self { mailer, from, to })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }

    fn build_message(&self, digest: &Digest) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                digest.text_body.clone(),
                digest.html_body.clone(),
            ))
            .context("build email")
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let msg = self.build_message(digest)?;
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(to = %self.to, subject = %digest.subject, "email sent");
        Ok(())
    }
}
