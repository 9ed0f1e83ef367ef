use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    application::services::{
        chunking::{MAX_CHUNK_SIZE, split_chunks},
        messenger::MessengerClient,
        pacing::Pacer,
    },
    domain::{
        errors::BroadcastError,
        models::{
            Audience, BroadcastReport, DeliveryFailure, DeliveryOutcome, OutgoingMessage,
            RecipientId,
        },
        repositories::{BroadcastFailureRepository, SubscriberRepository},
    },
};

pub const BATCH_SIZE: usize = 50;
pub const PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub max_chunk_size: usize,
    pub batch_size: usize,
    pub pause: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_chunk_size: MAX_CHUNK_SIZE,
            batch_size: BATCH_SIZE,
            pause: PAUSE,
        }
    }
}

/// Fans one text out to every subscriber of an audience.
///
/// Recipients are processed sequentially in batches with a fixed pause after
/// each batch. A recipient whose delivery fails on any chunk is evicted from
/// the subscriber store and its remaining chunks are skipped. Only one job
/// runs at a time per dispatcher.
pub struct BroadcastDispatcher {
    subscriber_repo: Arc<dyn SubscriberRepository>,
    failure_repo: Arc<dyn BroadcastFailureRepository>,
    messenger: Arc<dyn MessengerClient>,
    pacer: Arc<dyn Pacer>,
    settings: DispatchSettings,
    in_flight: Arc<AtomicBool>,
}

impl BroadcastDispatcher {
    pub fn new(
        subscriber_repo: Arc<dyn SubscriberRepository>,
        failure_repo: Arc<dyn BroadcastFailureRepository>,
        messenger: Arc<dyn MessengerClient>,
        pacer: Arc<dyn Pacer>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            subscriber_repo,
            failure_repo,
            messenger,
            pacer,
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Admits and runs a job to completion.
    pub async fn dispatch(
        self: &Arc<Self>,
        text: &str,
        audience: Audience,
    ) -> Result<BroadcastReport, BroadcastError> {
        let run = self.begin(text, audience).await?;
        Ok(run.execute().await)
    }

    /// Admits a job without running it: validates the text, takes the
    /// single-flight slot and snapshots the recipients.
    ///
    /// The slot is held by the returned run and freed when it is dropped.
    pub async fn begin(
        self: &Arc<Self>,
        text: &str,
        audience: Audience,
    ) -> Result<BroadcastRun, BroadcastError> {
        if text.trim().is_empty() {
            return Err(BroadcastError::EmptyPayload);
        }

        let guard = InFlightGuard::acquire(&self.in_flight)?;

        let recipients = self
            .subscriber_repo
            .list_ids(audience)
            .await
            .map_err(BroadcastError::Store)?;

        let chunks = split_chunks(text, self.settings.max_chunk_size)
            .into_iter()
            .map(str::to_owned)
            .collect();

        Ok(BroadcastRun {
            dispatcher: Arc::clone(self),
            job_id: Uuid::new_v4(),
            audience,
            recipients,
            chunks,
            _guard: guard,
        })
    }

    async fn deliver(&self, recipient: RecipientId, chunks: &[String]) -> DeliveryOutcome {
        for (index, chunk) in chunks.iter().enumerate() {
            let message = OutgoingMessage::text(chunk.as_str());
            if let Err(err) = self.messenger.send(recipient, &message).await {
                debug!(%recipient, chunk = index, "chunk delivery failed, skipping the rest");
                return DeliveryOutcome::Failed {
                    reason: format!("{err:#}"),
                };
            }
        }
        DeliveryOutcome::Delivered
    }

    async fn evict(&self, recipient: RecipientId) -> bool {
        match self.subscriber_repo.remove(recipient).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%recipient, error = %err, "failed to evict unreachable subscriber");
                false
            }
        }
    }

    async fn persist_failures(&self, job_id: Uuid, failures: &[DeliveryFailure]) {
        if let Err(err) = self.failure_repo.record(job_id, failures).await {
            warn!(%job_id, error = %err, "failed to persist broadcast failures");
        }
    }
}

/// An admitted broadcast job. Holds the single-flight slot until dropped.
pub struct BroadcastRun {
    dispatcher: Arc<BroadcastDispatcher>,
    job_id: Uuid,
    audience: Audience,
    recipients: Vec<RecipientId>,
    chunks: Vec<String>,
    _guard: InFlightGuard,
}

impl BroadcastRun {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn recipients(&self) -> &[RecipientId] {
        &self.recipients
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub async fn execute(self) -> BroadcastReport {
        let dispatcher = &self.dispatcher;
        let settings = dispatcher.settings;
        let mut failures = Vec::new();
        let mut evicted = 0;
        let mut batches = 0;

        info!(
            job_id = %self.job_id,
            audience = self.audience.as_str(),
            recipients = self.recipients.len(),
            chunks = self.chunks.len(),
            "broadcast started"
        );

        for batch in self.recipients.chunks(settings.batch_size.max(1)) {
            batches += 1;
            for &recipient in batch {
                if let DeliveryOutcome::Failed { reason } =
                    dispatcher.deliver(recipient, &self.chunks).await
                {
                    warn!(job_id = %self.job_id, %recipient, error = %reason, "delivery failed");
                    failures.push(DeliveryFailure { recipient, reason });
                    if dispatcher.evict(recipient).await {
                        evicted += 1;
                    }
                }
            }
            dispatcher.pacer.pause(settings.pause).await;
        }

        if !failures.is_empty() {
            dispatcher.persist_failures(self.job_id, &failures).await;
        }

        info!(
            job_id = %self.job_id,
            batches,
            failed = failures.len(),
            evicted,
            "broadcast finished"
        );

        BroadcastReport {
            job_id: self.job_id,
            audience: self.audience,
            recipients: self.recipients.len(),
            chunks: self.chunks.len(),
            batches,
            failures,
            evicted,
        }
    }
}

struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, BroadcastError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BroadcastError::BroadcastInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
