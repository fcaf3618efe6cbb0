use serde::{Deserialize, Serialize};

/// Final outcome for one matched item, produced by the deployer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub recipient_email: String,
    pub succeeded: bool,
    /// Final error after retries were exhausted; `None` on success.
    pub error_message: Option<String>,
    pub attempts_used: u32,
}

/// Aggregated result of one deployment batch, one outcome per item in batch
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployReport {
    pub outcomes: Vec<DeploymentOutcome>,
}

impl DeployReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    /// One entry per failed item, in batch order, carrying its final error.
    pub fn errors(&self) -> impl Iterator<Item = &DeploymentOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}
