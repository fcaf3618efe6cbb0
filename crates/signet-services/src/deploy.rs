//! Batch signature deployment with bounded retries and per-item isolation.
//!
//! Items are processed strictly sequentially; the fixed inter-item delay acts
//! as a simple global rate limiter against the remote API's quota. A failing
//! item never aborts the batch and never affects other items' attempt counts.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;

use signet_core::{
    DeliveryError, DeliveryResult, DeliveryTransport, DeployReport, DeploymentOutcome,
};

/// Retry and pacing policy for a deployment batch.
///
/// A policy value, not a hardcoded algorithm: swap the numbers without
/// touching the deployer's control flow. The delays are constant, no jitter
/// or exponential growth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPolicy {
    /// Delivery attempts per item before it counts as failed.
    pub max_attempts: u32,
    /// Pause between attempts for the same item (never after the last).
    pub retry_delay: Duration,
    /// Pause between items, a fixed guard against remote throttling.
    pub inter_item_delay: Duration,
}

impl Default for DeployPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            inter_item_delay: Duration::from_millis(100),
        }
    }
}

impl DeployPolicy {
    /// Zero-delay variant for tests and dry environments.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::ZERO,
            inter_item_delay: Duration::ZERO,
        }
    }
}

/// Emitted once per item, after it resolves (success or exhausted retries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub email: String,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub attempts_used: u32,
}

/// Deploy signature bodies to their recipients, one item at a time in the
/// given order.
///
/// Each item gets up to `policy.max_attempts` delivery attempts with
/// `policy.retry_delay` between them; the first success short-circuits.
/// After an item resolves, a [`ProgressEvent`] is sent on `progress` (when
/// provided) and the batch pauses `policy.inter_item_delay` before the next
/// item. Counters accumulate exactly once per item.
///
/// There is no cancellation primitive: a running batch finishes or the task
/// is dropped wholesale.
pub async fn deploy_batch(
    transport: &dyn DeliveryTransport,
    items: &[(String, String)],
    policy: &DeployPolicy,
    progress: Option<&UnboundedSender<ProgressEvent>>,
) -> DeployReport {
    let max_attempts = policy.max_attempts.max(1);
    tracing::info!(items = items.len(), max_attempts, "Starting deployment batch");

    let mut outcomes = Vec::with_capacity(items.len());
    for (index, (email, body)) in items.iter().enumerate() {
        let mut attempts_used = 0;
        let mut succeeded = false;
        let mut last_error: Option<DeliveryError> = None;

        for attempt in 1..=max_attempts {
            attempts_used = attempt;
            match deliver_once(transport, email, body).await {
                Ok(()) => {
                    succeeded = true;
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        email = %email,
                        attempt,
                        error = %err,
                        "Signature delivery attempt failed"
                    );
                    last_error = Some(err);
                    if attempt < max_attempts {
                        sleep(policy.retry_delay).await;
                    }
                }
            }
        }

        let outcome = DeploymentOutcome {
            recipient_email: email.clone(),
            succeeded,
            error_message: if succeeded {
                None
            } else {
                last_error.map(|err| err.to_string())
            },
            attempts_used,
        };

        if let Some(sender) = progress {
            // A dropped receiver only means nobody is watching anymore.
            let _ = sender.send(ProgressEvent {
                email: outcome.recipient_email.clone(),
                succeeded: outcome.succeeded,
                error_message: outcome.error_message.clone(),
                attempts_used: outcome.attempts_used,
            });
        }
        outcomes.push(outcome);

        if index + 1 < items.len() {
            sleep(policy.inter_item_delay).await;
        }
    }

    let report = DeployReport { outcomes };
    tracing::info!(
        succeeded = report.success_count(),
        failed = report.failed_count(),
        "Deployment batch finished"
    );
    report
}

/// One delivery attempt: resolve the user's first sendAs alias and patch its
/// signature. An identity without aliases has nowhere to deliver to.
async fn deliver_once(
    transport: &dyn DeliveryTransport,
    email: &str,
    body: &str,
) -> DeliveryResult<()> {
    let aliases = transport.list_aliases(email).await?;
    let Some(primary) = aliases.first() else {
        return Err(DeliveryError::NoSendConfiguration);
    };
    let alias_email = if primary.send_as_email.is_empty() {
        email
    } else {
        primary.send_as_email.as_str()
    };
    transport.set_signature(email, alias_email, body).await
}

/// Read back the currently stored signature for preview. Single best-effort
/// attempt, no retry; `Ok(None)` means no signature is set.
pub async fn fetch_current(
    transport: &dyn DeliveryTransport,
    email: &str,
) -> DeliveryResult<Option<String>> {
    transport.get_signature(email).await
}
