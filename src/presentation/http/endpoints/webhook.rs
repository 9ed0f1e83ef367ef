use std::sync::Arc;

use poem::{Error as PoemError, Result as PoemResult, http::StatusCode};
use poem_openapi::{OpenApi, param::Header, payload::Json, payload::PlainText};
use tracing::{debug, error, warn};

use crate::{
    infrastructure::messaging::telegram::TelegramUpdate,
    presentation::http::endpoints::root::{ApiState, EndpointsTags},
};

#[derive(Clone)]
pub struct WebhookEndpoints {
    state: Arc<ApiState>,
}

impl WebhookEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl WebhookEndpoints {
    /// Receives updates pushed by Telegram.
    ///
    /// Handling errors are logged and still answered with 200 so Telegram
    /// does not redeliver the same update forever.
    #[oai(path = "/telegram/webhook", method = "post", tag = EndpointsTags::Telegram)]
    pub async fn telegram_webhook(
        &self,
        #[oai(name = "X-Telegram-Bot-Api-Secret-Token")] secret: Header<Option<String>>,
        update: Json<serde_json::Value>,
    ) -> PoemResult<PlainText<&'static str>> {
        if let Some(expected) = &self.state.webhook_secret {
            if secret.0.as_deref() != Some(expected.as_str()) {
                warn!("webhook call with invalid secret token");
                return Err(PoemError::from_string(
                    "invalid secret token",
                    StatusCode::UNAUTHORIZED,
                ));
            }
        }

        let update: TelegramUpdate = match serde_json::from_value(update.0) {
            Ok(update) => update,
            Err(err) => {
                warn!(error = %err, "malformed telegram update");
                return Ok(PlainText("ignored"));
            }
        };

        let Some(event) = update.into_event() else {
            debug!("ignoring unsupported update");
            return Ok(PlainText("ignored"));
        };

        if let Err(err) = self.state.update_handler.handle(event).await {
            error!(error = %format!("{err:#}"), "failed to handle update");
        }

        Ok(PlainText("OK"))
    }
}
