use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    application::services::messenger::MessengerClient,
    domain::models::{InboundEvent, Keyboard, OutgoingMessage, RecipientId},
};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Long-poll requests stay open for `timeout` seconds, so the HTTP timeout
/// has to exceed the longest poll.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> anyhow::Result<Arc<Self>> {
        let http = Client::builder()
            .user_agent("broadcast-bot/telegram")
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build telegram client")?;

        Ok(Arc::new(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }))
    }

    fn build_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P, T>(&self, method: &str, payload: &P) -> anyhow::Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.build_url(method))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?;

        let payload: TelegramResponse<T> = response
            .json()
            .await
            .with_context(|| format!("telegram {method} returned malformed body"))?;

        if !payload.ok {
            anyhow::bail!(
                "telegram api returned error {}: {}",
                payload.error_code.unwrap_or_default(),
                payload
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }

        payload
            .result
            .ok_or_else(|| anyhow::anyhow!("telegram {method} returned no result"))
    }

    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> anyhow::Result<Vec<TelegramUpdate>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> anyhow::Result<()> {
        let request = SetWebhookRequest {
            url,
            secret_token: secret,
            allowed_updates: &["message", "callback_query"],
        };
        let _: bool = self.call("setWebhook", &request).await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> anyhow::Result<()> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({ "drop_pending_updates": false }))
            .await?;
        Ok(())
    }

    fn map_keyboard(keyboard: &Keyboard) -> TelegramReplyMarkup {
        match keyboard {
            Keyboard::Reply(rows) => TelegramReplyMarkup::Reply {
                keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|text| TelegramKeyboardButton { text: text.clone() })
                            .collect()
                    })
                    .collect(),
                resize_keyboard: true,
            },
            Keyboard::Inline(rows) => TelegramReplyMarkup::Inline {
                inline_keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|button| TelegramInlineButton {
                                text: button.text.clone(),
                                callback_data: button.callback_data.clone(),
                            })
                            .collect()
                    })
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl MessengerClient for TelegramClient {
    async fn send(&self, recipient: RecipientId, message: &OutgoingMessage) -> anyhow::Result<()> {
        debug!(%recipient, len = message.text.len(), "sending telegram message");
        let request = SendMessageRequest {
            chat_id: recipient.0,
            text: &message.text,
            reply_markup: message.keyboard.as_ref().map(Self::map_keyboard),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> anyhow::Result<()> {
        let request = AnswerCallbackRequest {
            callback_query_id: callback_id,
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    description: Option<String>,
    error_code: Option<i64>,
    result: Option<T>,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<TelegramReplyMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TelegramReplyMarkup {
    Reply {
        keyboard: Vec<Vec<TelegramKeyboardButton>>,
        resize_keyboard: bool,
    },
    Inline {
        inline_keyboard: Vec<Vec<TelegramInlineButton>>,
    },
}

#[derive(Debug, Serialize)]
struct TelegramKeyboardButton {
    text: String,
}

#[derive(Debug, Serialize)]
struct TelegramInlineButton {
    text: String,
    callback_data: String,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    message: Option<TelegramMessage>,
    callback_query: Option<TelegramCallbackQuery>,
}

impl TelegramUpdate {
    /// Maps the update to an event, dropping kinds the bot does not handle.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(message) = self.message {
            let sender = message.from?;
            let text = message.text?;
            return Some(InboundEvent::Text {
                sender: RecipientId(sender.id),
                text,
            });
        }
        if let Some(callback) = self.callback_query {
            return Some(InboundEvent::Callback {
                callback_id: callback.id,
                sender: RecipientId(callback.from.id),
                data: callback.data.unwrap_or_default(),
            });
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    from: Option<TelegramUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramCallbackQuery {
    id: String,
    from: TelegramUser,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
}
