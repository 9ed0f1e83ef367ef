use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{Audience, DeliveryFailure, Language, RecipientId, Subscriber};

#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Adds the user with default settings. Returns `false` if already present.
    async fn insert(&self, user_id: RecipientId) -> anyhow::Result<bool>;
    async fn get(&self, user_id: RecipientId) -> anyhow::Result<Option<Subscriber>>;
    async fn set_language(&self, user_id: RecipientId, language: Language) -> anyhow::Result<()>;
    async fn set_marketing_consent(&self, user_id: RecipientId, consent: bool)
    -> anyhow::Result<()>;
    /// Removing an unknown id is not an error.
    async fn remove(&self, user_id: RecipientId) -> anyhow::Result<()>;
    /// Ids in subscription order.
    async fn list_ids(&self, audience: Audience) -> anyhow::Result<Vec<RecipientId>>;
    async fn count(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait BroadcastFailureRepository: Send + Sync {
    async fn record(&self, job_id: Uuid, failures: &[DeliveryFailure]) -> anyhow::Result<()>;
}
