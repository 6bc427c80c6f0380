//! Concurrent fan-out over a candidate set.

use std::{collections::HashMap, sync::Arc};

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::{
    outcome::{VerificationOutcome, Verdict},
    probe::Verifier,
};

/// Default cap on in-flight probes.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Runs the verifier over many addresses at once.
///
/// Fan-out is bounded: at most `max_concurrent` probes are in flight, new
/// ones spawned as others finish. Results land in slots indexed by input
/// position, so the returned list is keyed 1:1 with the input — no address
/// dropped, none duplicated. A failed or panicked probe only affects its own
/// slot.
#[derive(Debug, Clone)]
pub struct VerificationPool {
    verifier: Arc<Verifier>,
    max_concurrent: usize,
}

impl VerificationPool {
    #[must_use]
    pub fn new(verifier: Arc<Verifier>, max_concurrent: usize) -> Self {
        Self {
            verifier,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// One outcome per input address, in input order.
    pub async fn verify_all(&self, addresses: &[String]) -> Vec<VerificationOutcome> {
        if addresses.is_empty() {
            return Vec::new();
        }

        info!(
            candidates = addresses.len(),
            max_concurrent = self.max_concurrent,
            "verifying candidate addresses"
        );

        let mut slots: Vec<Option<VerificationOutcome>> = vec![None; addresses.len()];
        let mut join_set: JoinSet<(usize, VerificationOutcome)> = JoinSet::new();
        let mut task_index: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut pending = addresses.iter().cloned().enumerate();

        // Initial window, then refill as probes complete.
        for _ in 0..self.max_concurrent.min(addresses.len()) {
            if let Some((index, address)) = pending.next() {
                let handle = self.spawn_probe(&mut join_set, index, address);
                task_index.insert(handle, index);
            }
        }

        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((id, (index, outcome))) => {
                    task_index.remove(&id);
                    slots[index] = Some(outcome);
                }
                Err(join_err) => {
                    // Isolation: a panicked probe fails only its own slot.
                    if let Some(index) = task_index.remove(&join_err.id()) {
                        warn!(address = %addresses[index], error = %join_err, "probe task failed");
                        slots[index] = Some(VerificationOutcome::new(
                            addresses[index].clone(),
                            Verdict::TransportError,
                            Some(join_err.to_string()),
                        ));
                    }
                }
            }

            if let Some((index, address)) = pending.next() {
                let handle = self.spawn_probe(&mut join_set, index, address);
                task_index.insert(handle, index);
            }
        }

        slots
            .into_iter()
            .zip(addresses)
            .map(|(slot, address)| {
                slot.unwrap_or_else(|| {
                    VerificationOutcome::new(
                        address.clone(),
                        Verdict::TransportError,
                        Some("probe task never reported".to_string()),
                    )
                })
            })
            .collect()
    }

    fn spawn_probe(
        &self,
        join_set: &mut JoinSet<(usize, VerificationOutcome)>,
        index: usize,
        address: String,
    ) -> tokio::task::Id {
        let verifier = Arc::clone(&self.verifier);
        join_set
            .spawn(async move {
                let outcome = verifier.verify(&address).await;
                (index, outcome)
            })
            .id()
    }
}
