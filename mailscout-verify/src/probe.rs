//! The RCPT probe state machine.
//!
//! One probe walks a fixed dialogue against the domain's preferred mail
//! exchanger:
//!
//! ```text
//! connect → 220 → HELO → 250 → MAIL FROM → 250 → RCPT TO → verdict → QUIT
//! ```
//!
//! The dialogue stops after the `RCPT TO` reply and never issues `DATA`, so
//! the target mailbox receives nothing. Everything from connect through the
//! `RCPT` reply runs under one shared deadline; `QUIT` is sent afterwards on
//! a short grace timer and its outcome does not affect the verdict.

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use tracing::debug;

use mailscout_common::Mailbox;
use mailscout_smtp::{ClientError, SmtpClient};

use crate::{
    dns::{DnsConfig, DnsError, MxResolver},
    outcome::{VerificationOutcome, Verdict},
};

/// Grace period for the post-verdict QUIT.
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// Probe identity and timing. The HELO name and envelope sender are
/// explicit configuration so tests can pin them down.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifierConfig {
    /// Domain announced in `HELO` (default: `test.com`).
    #[serde(default = "default_helo_domain")]
    pub helo_domain: String,

    /// Envelope sender for `MAIL FROM` (default: `test@test.com`).
    #[serde(default = "default_probe_sender")]
    pub probe_sender: String,

    /// Shared deadline in seconds for connect through the RCPT reply
    /// (default: 5).
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,

    /// Per-domain exchanger override (`domain -> host:port`), bypassing
    /// DNS. Routes probes at a local server under test.
    #[serde(default)]
    pub mx_override: HashMap<String, String>,
}

fn default_helo_domain() -> String {
    "test.com".to_string()
}

fn default_probe_sender() -> String {
    "test@test.com".to_string()
}

const fn default_probe_timeout_secs() -> u64 {
    5
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            helo_domain: default_helo_domain(),
            probe_sender: default_probe_sender(),
            timeout_secs: default_probe_timeout_secs(),
            mx_override: HashMap::new(),
        }
    }
}

/// Probes candidate addresses for deliverability.
#[derive(Debug)]
pub struct Verifier {
    config: VerifierConfig,
    resolver: MxResolver,
}

impl Verifier {
    /// Creates a verifier with its own MX resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the system resolver configuration cannot be
    /// loaded.
    pub fn new(config: VerifierConfig, dns: &DnsConfig) -> Result<Self, DnsError> {
        Ok(Self {
            config,
            resolver: MxResolver::new(dns)?,
        })
    }

    /// Probes one address. Always returns exactly one outcome and never
    /// retries; the connection is closed on every path.
    pub async fn verify(&self, address: &str) -> VerificationOutcome {
        // Stage 1: syntax. No network traffic for malformed input.
        let mailbox = match Mailbox::parse(address) {
            Ok(mailbox) => mailbox,
            Err(err) => {
                return VerificationOutcome::new(
                    address,
                    Verdict::InvalidFormat,
                    Some(err.to_string()),
                );
            }
        };

        // Stage 2: find the preferred exchanger.
        let target = match self.exchanger_for(&mailbox.domain).await {
            Ok(target) => target,
            Err((verdict, detail)) => return VerificationOutcome::new(address, verdict, detail),
        };

        debug!(address, target, "probing exchanger");

        // Stages 3-7: the scripted dialogue under one shared deadline.
        let deadline = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(deadline, self.dialogue(&target, address)).await {
            Ok(Ok((mut client, verdict, detail))) => {
                // The verdict is already decided; QUIT is a courtesy.
                let _ = tokio::time::timeout(QUIT_GRACE, client.quit()).await;
                VerificationOutcome::new(address, verdict, detail)
            }
            Ok(Err(err)) => {
                VerificationOutcome::new(address, Verdict::TransportError, Some(err.to_string()))
            }
            Err(_elapsed) => VerificationOutcome::new(
                address,
                Verdict::Timeout,
                Some(format!("no verdict within {}s", self.config.timeout_secs)),
            ),
        }
    }

    /// Resolves the probe target for a domain, honouring overrides.
    /// Resolution failures are mapped straight to terminal verdicts.
    async fn exchanger_for(&self, domain: &str) -> Result<String, (Verdict, Option<String>)> {
        if let Some(target) = self.config.mx_override.get(domain) {
            return Ok(target.clone());
        }

        match self.resolver.resolve(domain).await {
            // resolve() sorts ascending by preference and guarantees a
            // non-empty list; only the preferred host is probed.
            Ok(exchangers) => Ok(exchangers[0].address()),
            Err(DnsError::NoMailExchanger(domain)) => Err((
                Verdict::NoMailExchanger,
                Some(format!("no MX records for {domain}")),
            )),
            Err(err @ DnsError::LookupFailed(_)) => {
                Err((Verdict::TransportError, Some(err.to_string())))
            }
        }
    }

    /// Runs the dialogue up to and including the RCPT reply.
    ///
    /// A complete reply with an unexpected code cannot later become the
    /// awaited one, so it ends the probe as a rejection immediately instead
    /// of idling out the deadline.
    async fn dialogue(
        &self,
        target: &str,
        address: &str,
    ) -> Result<(SmtpClient, Verdict, Option<String>), ClientError> {
        let mut client = SmtpClient::connect(target).await?;

        let greeting = client.read_greeting().await?;
        if greeting.code != 220 {
            return Ok((
                client,
                Verdict::RejectedByServer,
                Some(greeting.first_line()),
            ));
        }

        let reply = client.helo(&self.config.helo_domain).await?;
        if reply.code != 250 {
            return Ok((client, Verdict::RejectedByServer, Some(reply.first_line())));
        }

        let reply = client.mail_from(&self.config.probe_sender).await?;
        if reply.code != 250 {
            return Ok((client, Verdict::RejectedByServer, Some(reply.first_line())));
        }

        let reply = client.rcpt_to(address).await?;
        if reply.code == 250 {
            Ok((client, Verdict::Valid, None))
        } else {
            Ok((client, Verdict::RejectedByServer, Some(reply.first_line())))
        }
    }
}
