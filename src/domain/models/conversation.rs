use serde::{Deserialize, Serialize};

use super::subscriber::RecipientId;

/// An inbound update the bot knows how to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text {
        sender: RecipientId,
        text: String,
    },
    Callback {
        callback_id: String,
        sender: RecipientId,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyboard {
    /// Persistent reply keyboard, one inner vec per row.
    Reply(Vec<Vec<String>>),
    Inline(Vec<Vec<InlineButton>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
