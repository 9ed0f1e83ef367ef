use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subscriber::{Audience, RecipientId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub recipient: RecipientId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
}

/// Summary of one finished broadcast job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub job_id: Uuid,
    pub audience: Audience,
    pub recipients: usize,
    pub chunks: usize,
    pub batches: usize,
    pub failures: Vec<DeliveryFailure>,
    pub evicted: usize,
}

impl BroadcastReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn delivered(&self) -> usize {
        self.recipients.saturating_sub(self.failures.len())
    }
}
