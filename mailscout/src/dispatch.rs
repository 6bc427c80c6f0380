//! Outbound delivery over SMTP.
//!
//! Unlike the verifier, this runs the whole transaction through `DATA`,
//! delivering directly to the recipient domain's preferred exchanger.
//! Each command gets its own timeout rather than one shared deadline; a
//! delivery legitimately takes longer than a probe.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use mailscout_common::{AddressError, Mailbox};
use mailscout_pipeline::{DispatchError, Dispatcher};
use mailscout_smtp::{ClientError, Reply, SmtpClient};
use mailscout_verify::{DnsError, MxResolver};

use crate::config::DispatchConfig;

/// Errors from one delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid recipient address: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Dns(#[from] DnsError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("server rejected {command}: {reply}")]
    Rejected { command: &'static str, reply: String },

    #[error("timed out waiting for reply to {0}")]
    CommandTimeout(&'static str),
}

/// Delivers messages straight to the recipient's mail exchanger.
pub struct SmtpDispatcher {
    ehlo_domain: String,
    command_timeout: Duration,
    mx_override: HashMap<String, String>,
    resolver: Arc<MxResolver>,
}

impl SmtpDispatcher {
    #[must_use]
    pub fn new(config: DispatchConfig, resolver: Arc<MxResolver>) -> Self {
        Self {
            ehlo_domain: config.ehlo_domain,
            command_timeout: Duration::from_secs(config.command_timeout_secs),
            mx_override: config.mx_override,
            resolver,
        }
    }

    async fn target_for(&self, domain: &str) -> Result<String, DeliveryError> {
        if let Some(target) = self.mx_override.get(domain) {
            return Ok(target.clone());
        }

        let exchangers = self.resolver.resolve(domain).await?;
        Ok(exchangers[0].address())
    }

    /// Runs one step of the transaction under the per-command timeout,
    /// requiring `expected` as the reply code.
    async fn step(
        &self,
        command: &'static str,
        expected: u16,
        fut: impl Future<Output = mailscout_smtp::Result<Reply>>,
    ) -> Result<Reply, DeliveryError> {
        let reply = tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| DeliveryError::CommandTimeout(command))??;

        if reply.code == expected {
            Ok(reply)
        } else {
            Err(DeliveryError::Rejected {
                command,
                reply: reply.first_line(),
            })
        }
    }

    async fn deliver(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let recipient = Mailbox::parse(to)?;
        let target = self.target_for(&recipient.domain).await?;

        debug!(to, target, "delivering message");

        let mut client = tokio::time::timeout(self.command_timeout, SmtpClient::connect(&target))
            .await
            .map_err(|_| DeliveryError::CommandTimeout("connect"))??;

        self.step("greeting", 220, client.read_greeting()).await?;
        self.step("EHLO", 250, client.ehlo(&self.ehlo_domain)).await?;
        self.step("MAIL FROM", 250, client.mail_from(from)).await?;
        self.step("RCPT TO", 250, client.rcpt_to(to)).await?;
        self.step("DATA", 354, client.data()).await?;

        let message = format_message(from, to, subject, body);
        self.step("message content", 250, client.send_data(&message))
            .await?;

        // The message is accepted at this point; a failed QUIT is not a
        // failed delivery.
        let _ = tokio::time::timeout(self.command_timeout, client.quit()).await;

        info!(to, "message accepted for delivery");
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    async fn dispatch(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DispatchError> {
        self.deliver(from, to, subject, body)
            .await
            .map_err(|err| DispatchError::new(err.to_string()))
    }
}

/// Assembles a minimal RFC 5322 message.
fn format_message(from: &str, to: &str, subject: &str, body: &str) -> String {
    format!(
        "From: <{from}>\r\nTo: <{to}>\r\nSubject: {subject}\r\nDate: {date}\r\n\r\n{body}",
        date = chrono::Utc::now().to_rfc2822(),
    )
}
