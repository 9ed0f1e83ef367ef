use std::collections::HashSet;
use std::env::var;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use thiserror::Error;

use crate::{
    application::handlers::broadcast_dispatcher::DispatchSettings,
    domain::models::RecipientId,
    infrastructure::messaging::telegram::DEFAULT_API_URL,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env param {0}")]
    Missing(&'static str),
    #[error("invalid value for env param {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    Polling,
    Webhook,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub secret: Option<String>,
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub database_url: String,
    pub admin_ids: HashSet<RecipientId>,
    pub mode: BotMode,
    pub webhook: Option<WebhookConfig>,
    pub dispatch: DispatchSettings,
}

impl Config {
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let mode = match get("BOT_MODE").as_deref().unwrap_or("polling") {
            "polling" => BotMode::Polling,
            "webhook" => BotMode::Webhook,
            other => {
                return Err(ConfigError::Invalid {
                    name: "BOT_MODE",
                    reason: format!("expected polling or webhook, got {other}"),
                });
            }
        };

        let webhook = match mode {
            BotMode::Polling => None,
            BotMode::Webhook => Some(WebhookConfig {
                url: get("WEBHOOK_URL").ok_or(ConfigError::Missing("WEBHOOK_URL"))?,
                secret: get("WEBHOOK_SECRET"),
                scheme: get("SCHEME").unwrap_or_else(|| "https".to_string()),
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or("PORT", get("PORT"), 8080)?,
            }),
        };

        let defaults = DispatchSettings::default();
        let dispatch = DispatchSettings {
            max_chunk_size: positive(
                "BROADCAST_CHUNK_SIZE",
                get("BROADCAST_CHUNK_SIZE"),
                defaults.max_chunk_size,
            )?,
            batch_size: positive(
                "BROADCAST_BATCH_SIZE",
                get("BROADCAST_BATCH_SIZE"),
                defaults.batch_size,
            )?,
            pause: Duration::from_millis(parse_or(
                "BROADCAST_PAUSE_MS",
                get("BROADCAST_PAUSE_MS"),
                defaults.pause.as_millis() as u64,
            )?),
        };

        Ok(Config {
            bot_token,
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://subscribers.db".to_string()),
            admin_ids: parse_admin_ids(get("ADMIN_IDS").as_deref().unwrap_or(""))?,
            mode,
            webhook,
            dispatch,
        })
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive(
    name: &'static str,
    value: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    let parsed = parse_or(name, value, default)?;
    if parsed == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<RecipientId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map(RecipientId)
                .map_err(|err| ConfigError::Invalid {
                    name: "ADMIN_IDS",
                    reason: format!("{id}: {err}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_follow_broadcast_contract() {
        let config = Config::from_lookup(lookup(&[("BOT_TOKEN", "t")])).unwrap();
        assert_eq!(config.mode, BotMode::Polling);
        assert_eq!(config.dispatch.max_chunk_size, 4000);
        assert_eq!(config.dispatch.batch_size, 50);
        assert_eq!(config.dispatch.pause, Duration::from_secs(1));
        assert!(config.admin_ids.is_empty());
        assert!(config.webhook.is_none());
    }

    #[test]
    fn parses_admin_ids_list() {
        let config =
            Config::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("ADMIN_IDS", " 1, 22 ,,-3")])).unwrap();
        let expected: HashSet<_> = [1, 22, -3].into_iter().map(RecipientId).collect();
        assert_eq!(config.admin_ids, expected);
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BOT_TOKEN")));
    }

    #[test]
    fn webhook_mode_requires_url() {
        let err = Config::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("BOT_MODE", "webhook")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEBHOOK_URL")));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = Config::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("BROADCAST_BATCH_SIZE", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "BROADCAST_BATCH_SIZE",
                ..
            }
        ));
    }
}
