use std::sync::Arc;

use crate::domain::{
    models::{Language, RecipientId},
    repositories::SubscriberRepository,
};

pub struct UnsubscribeUseCase {
    repo: Arc<dyn SubscriberRepository>,
}

impl UnsubscribeUseCase {
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    /// Removes the subscriber and returns the language to answer in.
    pub async fn execute(&self, user_id: RecipientId) -> anyhow::Result<Language> {
        let language = self
            .repo
            .get(user_id)
            .await?
            .map(|s| s.language_or_default())
            .unwrap_or_default();

        self.repo.remove(user_id).await?;

        Ok(language)
    }
}
