use std::sync::Arc;

use crate::{
    application::services::keyboards::parse_marketing_callback,
    domain::{
        errors::DomainError,
        models::{Language, RecipientId},
        repositories::SubscriberRepository,
    },
};

pub struct MarketingConsentRequest {
    pub sender: RecipientId,
    pub callback_data: String,
}

pub struct MarketingConsentResponse {
    pub consent: bool,
    pub language: Language,
}

pub struct MarketingConsentUseCase {
    repo: Arc<dyn SubscriberRepository>,
}

impl MarketingConsentUseCase {
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        request: MarketingConsentRequest,
    ) -> Result<MarketingConsentResponse, DomainError> {
        let (consent, owner) = parse_marketing_callback(&request.callback_data).ok_or_else(|| {
            DomainError::Validation(format!("unexpected callback data: {}", request.callback_data))
        })?;

        if owner != request.sender {
            return Err(DomainError::Forbidden(format!(
                "user {} cannot change consent of {}",
                request.sender, owner
            )));
        }

        let subscriber = self
            .repo
            .get(owner)
            .await?
            .ok_or_else(|| DomainError::Validation(format!("user {owner} is not subscribed")))?;

        self.repo.set_marketing_consent(owner, consent).await?;

        Ok(MarketingConsentResponse {
            consent,
            language: subscriber.language_or_default(),
        })
    }
}
