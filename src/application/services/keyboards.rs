use crate::domain::models::{InlineButton, Keyboard, Language, RecipientId};

pub const MARKETING_YES: &str = "marketing_yes";
pub const MARKETING_NO: &str = "marketing_no";

/// Shown to users who are not subscribed.
pub fn before_subscription(language: Language) -> Keyboard {
    Keyboard::Reply(vec![vec![language.texts().subscribe_button.to_string()]])
}

/// Shown to subscribers.
pub fn after_subscription(language: Language) -> Keyboard {
    Keyboard::Reply(vec![vec![language.texts().unsubscribe_button.to_string()]])
}

pub fn languages() -> Keyboard {
    Keyboard::Reply(
        Language::ALL
            .chunks(2)
            .map(|row| row.iter().map(|lang| lang.label().to_string()).collect())
            .collect(),
    )
}

pub fn marketing_consent(language: Language, user_id: RecipientId) -> Keyboard {
    let texts = language.texts();
    Keyboard::Inline(vec![vec![
        InlineButton {
            text: texts.marketing_accept.to_string(),
            callback_data: format!("{MARKETING_YES}:{user_id}"),
        },
        InlineButton {
            text: texts.marketing_decline.to_string(),
            callback_data: format!("{MARKETING_NO}:{user_id}"),
        },
    ]])
}

/// Parses `marketing_yes:<uid>` / `marketing_no:<uid>` callback data.
pub fn parse_marketing_callback(data: &str) -> Option<(bool, RecipientId)> {
    let (action, uid) = data.split_once(':')?;
    let consent = match action {
        MARKETING_YES => true,
        MARKETING_NO => false,
        _ => return None,
    };
    let uid = uid.trim().parse::<i64>().ok()?;
    Some((consent, RecipientId(uid)))
}
