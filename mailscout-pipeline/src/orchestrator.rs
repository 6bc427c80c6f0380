//! The staged pipeline state machine.
//!
//! One run walks `Discovery → DomainResolution → Generation → Verification
//! → Dispatch`, narrating every boundary and sub-step as a [`StageEvent`]
//! on a bounded channel. The producer suspends when the channel is full,
//! so a slow consumer applies backpressure instead of losing events.
//! Exactly one terminal event ends the stream; the channel closes with it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{
    compose::compose,
    error::PipelineError,
    event::{EventPayload, Stage, StageEvent},
    resolve::resolve_domain,
    result::{FailedDispatch, RunResult},
    traits::{AddressVerifier, Dispatcher, EmployeeDirectory},
};

/// Default bound on the event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Inputs for one outreach run.
#[derive(Debug, Clone)]
pub struct OutreachRequest {
    pub company: String,
    /// Company website; resolved to the address domain.
    pub website: Option<String>,
    /// Optional role filter passed to the directory.
    pub role: Option<String>,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// A running pipeline in push mode: events as they happen, result when
/// the run ends.
pub struct RunHandle {
    pub events: mpsc::Receiver<StageEvent>,
    result: tokio::task::JoinHandle<RunResult>,
}

impl RunHandle {
    /// Waits for the run to finish.
    pub async fn result(self) -> RunResult {
        self.result.await.unwrap_or_else(|err| {
            error!(%err, "pipeline task failed");
            RunResult::halted(format!("pipeline task failed: {err}"), Vec::new())
        })
    }
}

/// Sequences one outreach run over its collaborators.
///
/// All per-run data lives inside a single invocation; nothing outlives
/// the run.
#[derive(Clone)]
pub struct Orchestrator {
    directory: Arc<dyn EmployeeDirectory>,
    verifier: Arc<dyn AddressVerifier>,
    dispatcher: Arc<dyn Dispatcher>,
    channel_capacity: usize,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        verifier: Arc<dyn AddressVerifier>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            directory,
            verifier,
            dispatcher,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Overrides the event channel bound.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Push mode: starts the run on its own task and hands back the live
    /// event stream plus a result handle.
    #[must_use]
    pub fn spawn(&self, request: OutreachRequest) -> RunHandle {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let orchestrator = self.clone();

        let result = tokio::spawn(async move { orchestrator.run(request, &tx).await });

        RunHandle { events: rx, result }
    }

    /// Pull mode: runs the pipeline to completion, discarding the event
    /// narration, and returns only the terminal result. Stage logic is
    /// identical to push mode.
    pub async fn run_collected(&self, request: OutreachRequest) -> RunResult {
        let mut handle = self.spawn(request);
        while handle.events.recv().await.is_some() {}
        handle.result().await
    }

    /// Runs the pipeline, emitting events on `tx` as stages progress.
    pub async fn run(&self, request: OutreachRequest, tx: &mpsc::Sender<StageEvent>) -> RunResult {
        info!(company = %request.company, "starting outreach run");

        // Discovery
        let employees = match self
            .directory
            .discover(&request.company, request.role.as_deref())
            .await
        {
            Ok(employees) => employees,
            Err(err) => {
                return fail(
                    tx,
                    &PipelineError::input(
                        Stage::Discovery,
                        format!("employee discovery failed: {err}"),
                    ),
                    Vec::new(),
                )
                .await;
            }
        };

        if employees.is_empty() {
            return fail(
                tx,
                &PipelineError::empty(
                    Stage::Discovery,
                    format!("no employees found for {}", request.company),
                ),
                Vec::new(),
            )
            .await;
        }

        emit(
            tx,
            StageEvent::progress(
                Stage::Discovery,
                format!("Found {} potential employee(s)", employees.len()),
            )
            .with_payload(EventPayload::EmployeesFound {
                count: employees.len(),
            }),
        )
        .await;

        // DomainResolution
        let Some(website) = request.website.as_deref() else {
            return fail(
                tx,
                &PipelineError::input(
                    Stage::DomainResolution,
                    "company website is required to determine the email domain",
                ),
                Vec::new(),
            )
            .await;
        };

        let Some(domain) = resolve_domain(website) else {
            return fail(
                tx,
                &PipelineError::input(
                    Stage::DomainResolution,
                    format!("could not determine a valid domain from: {website}"),
                ),
                Vec::new(),
            )
            .await;
        };

        emit(
            tx,
            StageEvent::progress(
                Stage::DomainResolution,
                format!("Using company domain: {domain}"),
            )
            .with_payload(EventPayload::DomainResolved {
                domain: domain.clone(),
            }),
        )
        .await;

        // Generation
        let candidates: Vec<String> = compose(&employees, &domain).into_iter().collect();
        if candidates.is_empty() {
            return fail(
                tx,
                &PipelineError::empty(
                    Stage::Generation,
                    "failed to generate any email permutations",
                ),
                Vec::new(),
            )
            .await;
        }

        emit(
            tx,
            StageEvent::progress(
                Stage::Generation,
                format!("Generated {} possible email addresses", candidates.len()),
            )
            .with_payload(EventPayload::CandidatesGenerated {
                count: candidates.len(),
            }),
        )
        .await;

        // Verification
        emit(
            tx,
            StageEvent::progress(
                Stage::Verification,
                format!("Verifying {} candidate address(es)", candidates.len()),
            ),
        )
        .await;

        let outcomes = self.verifier.verify_all(&candidates).await;
        let verified: Vec<String> = outcomes
            .iter()
            .filter(|outcome| outcome.verdict.is_valid())
            .map(|outcome| outcome.address.clone())
            .collect();

        if verified.is_empty() {
            // The terminal result still carries the (empty) verified list.
            return fail(
                tx,
                &PipelineError::empty(
                    Stage::Verification,
                    "no valid email addresses were found after verification",
                ),
                verified,
            )
            .await;
        }

        emit(
            tx,
            StageEvent::progress(
                Stage::Verification,
                format!("Verified {} email address(es)", verified.len()),
            )
            .with_payload(EventPayload::Verified {
                addresses: verified.clone(),
            }),
        )
        .await;

        // Dispatch: sequential so progress events map 1:1 to real send
        // attempts in observable order.
        emit(
            tx,
            StageEvent::progress(
                Stage::Dispatch,
                format!("Sending to {} recipient(s)", verified.len()),
            ),
        )
        .await;

        let mut sent = Vec::new();
        let mut failed = Vec::new();

        for address in &verified {
            emit(
                tx,
                StageEvent::progress(Stage::Dispatch, format!("sending to {address}"))
                    .with_payload(EventPayload::DispatchAttempt {
                        address: address.clone(),
                    }),
            )
            .await;

            match self
                .dispatcher
                .dispatch(&request.from, address, &request.subject, &request.body)
                .await
            {
                Ok(()) => {
                    sent.push(address.clone());
                    emit(
                        tx,
                        StageEvent::progress(Stage::Dispatch, format!("sent to {address}"))
                            .with_payload(EventPayload::DispatchOutcome {
                                address: address.clone(),
                                error: None,
                            }),
                    )
                    .await;
                }
                Err(err) => {
                    warn!(address = %address, error = %err, "dispatch failed");
                    failed.push(FailedDispatch {
                        address: address.clone(),
                        reason: err.to_string(),
                    });
                    emit(
                        tx,
                        StageEvent::progress(
                            Stage::Dispatch,
                            format!("failed to send to {address}: {err}"),
                        )
                        .with_payload(EventPayload::DispatchOutcome {
                            address: address.clone(),
                            error: Some(err.to_string()),
                        }),
                    )
                    .await;
                }
            }
        }

        // Complete: reached whenever dispatch finishes, regardless of
        // individual send failures.
        let summary = format!(
            "Process complete. Sent {} of {} emails.",
            sent.len(),
            verified.len()
        );
        info!(sent = sent.len(), total = verified.len(), "outreach run complete");

        let result = RunResult {
            succeeded: true,
            summary: summary.clone(),
            sent,
            failed,
            verified,
        };

        emit(
            tx,
            StageEvent::complete(Stage::Dispatch, summary, result.clone()),
        )
        .await;

        result
    }
}

/// Sends one event, suspending while the channel is full. A dropped
/// consumer does not abort the run; the result is still produced.
async fn emit(tx: &mpsc::Sender<StageEvent>, event: StageEvent) {
    if tx.send(event).await.is_err() {
        warn!("event consumer dropped; continuing without narration");
    }
}

/// Emits the single terminal error event and builds the halted result.
async fn fail(
    tx: &mpsc::Sender<StageEvent>,
    err: &PipelineError,
    verified: Vec<String>,
) -> RunResult {
    error!(stage = %err.stage(), message = err.message(), "pipeline halted");
    emit(tx, StageEvent::error(err.stage(), err.message())).await;
    RunResult::halted(err.message(), verified)
}
