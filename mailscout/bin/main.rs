use std::{path::PathBuf, sync::Arc};

use clap::Parser;

use mailscout::{Config, FileRoster, SmtpDispatcher};
use mailscout_pipeline::{EventKind, Orchestrator, OutreachRequest};
use mailscout_verify::{MxResolver, VerificationPool, Verifier};

/// Discover likely employees of a company, derive and verify their work
/// email addresses, and send each verified recipient a message.
#[derive(Debug, Parser)]
#[command(name = "mailscout", version, about)]
struct Args {
    /// Company to reach out to.
    company: String,

    /// Company website, used to derive the address domain.
    #[arg(long)]
    website: Option<String>,

    /// Only contact employees with this role (case-insensitive).
    #[arg(long)]
    role: Option<String>,

    /// Envelope and header sender address.
    #[arg(long)]
    from: String,

    /// Message subject.
    #[arg(long)]
    subject: String,

    /// Message body.
    #[arg(long)]
    body: String,

    /// Employee roster file, one `Name | Role` per line.
    #[arg(long)]
    roster: PathBuf,

    /// Configuration file (default: MAILSCOUT_CONFIG, then
    /// ./mailscout.config.toml, then /etc/mailscout/mailscout.config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mailscout_common::logging::init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let verifier = Verifier::new(config.verifier.clone(), &config.dns)?;
    let pool = VerificationPool::new(Arc::new(verifier), config.pool.max_concurrent);

    let resolver = Arc::new(MxResolver::new(&config.dns)?);
    let dispatcher = SmtpDispatcher::new(config.dispatch.clone(), resolver);

    let orchestrator = Orchestrator::new(
        Arc::new(FileRoster::new(&args.roster)),
        Arc::new(pool),
        Arc::new(dispatcher),
    )
    .with_channel_capacity(config.pipeline.channel_capacity);

    let mut handle = orchestrator.spawn(OutreachRequest {
        company: args.company,
        website: args.website,
        role: args.role,
        from: args.from,
        subject: args.subject,
        body: args.body,
    });

    while let Some(event) = handle.events.recv().await {
        match event.kind {
            EventKind::Error => eprintln!("[{}] error: {}", event.stage, event.message),
            _ => println!("[{}] {}", event.stage, event.message),
        }
    }

    let result = handle.result().await;
    anyhow::ensure!(result.succeeded, "{}", result.summary);

    Ok(())
}
