use std::sync::Arc;

use anyhow::Context;
use poem::{Server, listener::TcpListener};
use tokio::{main, sync::watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use broadcast_bot::{
    application::{
        handlers::{broadcast_dispatcher::BroadcastDispatcher, update_handler::UpdateHandler},
        services::pacing::TokioPacer,
    },
    config::{BotMode, Config},
    infrastructure::{
        messaging::{
            polling::{PollingConfig, PollingWorker},
            telegram::TelegramClient,
        },
        repositories::sqlite::{
            self, SqliteBroadcastFailureRepository, SqliteSubscriberRepository,
        },
    },
    presentation::http::endpoints::root::{ApiState, routes},
};

#[main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "broadcast_bot=info".into()),
        )
        .init();

    let config = Config::try_parse()?;

    let pool = sqlite::connect(&config.database_url).await?;
    let subscriber_repo = SqliteSubscriberRepository::new(pool.clone());
    let failure_repo = SqliteBroadcastFailureRepository::new(pool);
    let telegram = TelegramClient::new(&config.bot_token, &config.telegram_api_url)?;

    let dispatcher = Arc::new(BroadcastDispatcher::new(
        subscriber_repo.clone(),
        failure_repo,
        telegram.clone(),
        Arc::new(TokioPacer),
        config.dispatch,
    ));
    let handler = Arc::new(UpdateHandler::new(
        subscriber_repo,
        telegram.clone(),
        dispatcher,
        config.admin_ids.clone(),
    ));

    info!(
        mode = ?config.mode,
        admins = config.admin_ids.len(),
        "starting bot"
    );

    match config.mode {
        BotMode::Polling => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let mut worker = PollingWorker::new(telegram, PollingConfig::default())
                .spawn(handler.clone(), shutdown_rx);

            tokio::select! {
                result = &mut worker => {
                    result?;
                    error!("polling worker exited without a shutdown signal");
                }
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    let _ = shutdown_tx.send(true);
                    worker.await?;
                }
            }
        }
        BotMode::Webhook => {
            let webhook = config
                .webhook
                .context("webhook mode requires webhook settings")?;
            telegram
                .set_webhook(&webhook.url, webhook.secret.as_deref())
                .await?;

            let state = Arc::new(ApiState {
                update_handler: handler.clone(),
                webhook_secret: webhook.secret.clone(),
            });
            let server_url = format!("{}://{}:{}", webhook.scheme, webhook.host, webhook.port);
            info!(%server_url, "starting webhook server");

            Server::new(TcpListener::bind(format!("{}:{}", webhook.host, webhook.port)))
                .run_with_graceful_shutdown(
                    routes(state, &server_url),
                    async {
                        let _ = tokio::signal::ctrl_c().await;
                    },
                    None,
                )
                .await?;
        }
    }

    info!("waiting for a running broadcast to finish");
    handler.join_broadcast().await;

    Ok(())
}
