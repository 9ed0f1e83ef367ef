use crate::domain::models::Audience;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Broadcast { audience: Audience, text: String },
    Stats,
}

/// Parses a leading `/command` (optionally `/command@botname`) and returns
/// the command with its argument text trimmed.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;
    let (token, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let name = token.split('@').next().unwrap_or(token);
    let args = args.trim();

    match name {
        "start" => Some(BotCommand::Start),
        "broadcast" => Some(BotCommand::Broadcast {
            audience: Audience::All,
            text: args.to_string(),
        }),
        "promo" => Some(BotCommand::Broadcast {
            audience: Audience::MarketingConsented,
            text: args.to_string(),
        }),
        "stats" => Some(BotCommand::Stats),
        _ => None,
    }
}
