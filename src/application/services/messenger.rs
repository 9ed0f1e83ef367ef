use async_trait::async_trait;

use crate::domain::models::{OutgoingMessage, RecipientId};

/// Point-to-point delivery to a single chat.
///
/// Every call is best effort: a blocked bot, a deactivated account, a rate
/// limit or a network error all come back as an opaque `Err`.
#[async_trait]
pub trait MessengerClient: Send + Sync {
    async fn send(&self, recipient: RecipientId, message: &OutgoingMessage) -> anyhow::Result<()>;

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> anyhow::Result<()>;
}
