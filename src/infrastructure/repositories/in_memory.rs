use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{Audience, DeliveryFailure, Language, RecipientId, Subscriber},
    repositories::{BroadcastFailureRepository, SubscriberRepository},
};

/// Subscribers kept in insertion order.
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_subscribers(ids: impl IntoIterator<Item = RecipientId>) -> Self {
        let repo = Self::new();
        {
            let mut subscribers = repo.subscribers.write().await;
            subscribers.extend(ids.into_iter().map(Subscriber::new));
        }
        repo
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn insert(&self, user_id: RecipientId) -> anyhow::Result<bool> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.iter().any(|s| s.user_id == user_id) {
            return Ok(false);
        }
        subscribers.push(Subscriber::new(user_id));
        Ok(true)
    }

    async fn get(&self, user_id: RecipientId) -> anyhow::Result<Option<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn set_language(&self, user_id: RecipientId, language: Language) -> anyhow::Result<()> {
        let mut subscribers = self.subscribers.write().await;
        if let Some(subscriber) = subscribers.iter_mut().find(|s| s.user_id == user_id) {
            subscriber.language = Some(language);
        }
        Ok(())
    }

    async fn set_marketing_consent(
        &self,
        user_id: RecipientId,
        consent: bool,
    ) -> anyhow::Result<()> {
        let mut subscribers = self.subscribers.write().await;
        if let Some(subscriber) = subscribers.iter_mut().find(|s| s.user_id == user_id) {
            subscriber.marketing_consent = consent;
        }
        Ok(())
    }

    async fn remove(&self, user_id: RecipientId) -> anyhow::Result<()> {
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|s| s.user_id != user_id);
        Ok(())
    }

    async fn list_ids(&self, audience: Audience) -> anyhow::Result<Vec<RecipientId>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers
            .iter()
            .filter(|s| match audience {
                Audience::All => true,
                Audience::MarketingConsented => s.marketing_consent,
            })
            .map(|s| s.user_id)
            .collect())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryBroadcastFailureRepository {
    failures: Arc<RwLock<HashMap<Uuid, Vec<DeliveryFailure>>>>,
}

impl InMemoryBroadcastFailureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_by_job(&self, job_id: Uuid) -> Vec<DeliveryFailure> {
        let failures = self.failures.read().await;
        failures.get(&job_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl BroadcastFailureRepository for InMemoryBroadcastFailureRepository {
    async fn record(&self, job_id: Uuid, failures: &[DeliveryFailure]) -> anyhow::Result<()> {
        let mut stored = self.failures.write().await;
        stored
            .entry(job_id)
            .or_default()
            .extend_from_slice(failures);
        Ok(())
    }
}
