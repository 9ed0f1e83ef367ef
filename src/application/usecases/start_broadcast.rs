use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    application::handlers::broadcast_dispatcher::{BroadcastDispatcher, BroadcastRun},
    domain::{
        errors::DomainError,
        models::{Audience, RecipientId},
    },
};

pub struct StartBroadcastRequest {
    pub sender: RecipientId,
    pub text: String,
    pub audience: Audience,
}

pub struct StartBroadcastUseCase {
    dispatcher: Arc<BroadcastDispatcher>,
    admins: HashSet<RecipientId>,
}

impl StartBroadcastUseCase {
    pub fn new(dispatcher: Arc<BroadcastDispatcher>, admins: HashSet<RecipientId>) -> Self {
        Self { dispatcher, admins }
    }

    pub fn is_admin(&self, user_id: RecipientId) -> bool {
        self.admins.contains(&user_id)
    }

    /// Admits a broadcast job. Running it is left to the caller.
    pub async fn execute(&self, request: StartBroadcastRequest) -> Result<BroadcastRun, DomainError> {
        if !self.is_admin(request.sender) {
            return Err(DomainError::Forbidden(format!(
                "user {} is not an administrator",
                request.sender
            )));
        }

        let run = self.dispatcher.begin(&request.text, request.audience).await?;
        Ok(run)
    }
}
