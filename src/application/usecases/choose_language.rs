use std::sync::Arc;

use crate::domain::{
    models::{Language, RecipientId},
    repositories::SubscriberRepository,
};

pub struct ChooseLanguageUseCase {
    repo: Arc<dyn SubscriberRepository>,
}

impl ChooseLanguageUseCase {
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: RecipientId, language: Language) -> anyhow::Result<()> {
        self.repo.set_language(user_id, language).await
    }
}
