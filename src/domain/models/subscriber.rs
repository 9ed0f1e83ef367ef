use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::language::Language;

/// Telegram-assigned identifier of a user (equal to their private chat id).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecipientId(pub i64);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: RecipientId,
    pub language: Option<Language>,
    pub marketing_consent: bool,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(user_id: RecipientId) -> Self {
        Self {
            user_id,
            language: None,
            marketing_consent: false,
            subscribed_at: Utc::now(),
        }
    }

    pub fn language_or_default(&self) -> Language {
        self.language.unwrap_or_default()
    }
}

/// Which subscribers a broadcast is addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    All,
    MarketingConsented,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::MarketingConsented => "marketing_consented",
        }
    }
}
