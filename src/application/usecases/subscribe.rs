use std::sync::Arc;

use crate::domain::{
    models::{RecipientId, Subscriber},
    repositories::SubscriberRepository,
};

pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed(Subscriber),
}

pub struct SubscribeUseCase {
    repo: Arc<dyn SubscriberRepository>,
}

impl SubscribeUseCase {
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: RecipientId) -> anyhow::Result<SubscribeOutcome> {
        if let Some(existing) = self.repo.get(user_id).await? {
            return Ok(SubscribeOutcome::AlreadySubscribed(existing));
        }

        if !self.repo.insert(user_id).await? {
            // Lost a race with a concurrent subscribe for the same user.
            if let Some(existing) = self.repo.get(user_id).await? {
                return Ok(SubscribeOutcome::AlreadySubscribed(existing));
            }
        }

        Ok(SubscribeOutcome::Subscribed)
    }
}
