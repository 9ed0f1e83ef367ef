use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    application::handlers::update_handler::UpdateHandler,
    infrastructure::messaging::telegram::TelegramClient,
};

#[derive(Clone)]
pub struct PollingConfig {
    pub timeout_secs: u64,
    pub retry_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Long-polls `getUpdates` and feeds every update to the handler in order.
pub struct PollingWorker {
    client: Arc<TelegramClient>,
    config: PollingConfig,
}

impl PollingWorker {
    pub fn new(client: Arc<TelegramClient>, config: PollingConfig) -> Self {
        Self { client, config }
    }

    pub fn spawn(
        self,
        handler: Arc<UpdateHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(handler, shutdown))
    }

    async fn run(self, handler: Arc<UpdateHandler>, mut shutdown: watch::Receiver<bool>) {
        if !self.clear_webhook(&mut shutdown).await {
            info!("polling worker shutting down");
            return;
        }
        info!("polling for updates");

        let mut offset = None;
        loop {
            let updates = tokio::select! {
                _ = shutdown.changed() => {
                    info!("polling worker shutting down");
                    return;
                }
                result = self.client.get_updates(offset, self.config.timeout_secs) => result,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "failed to fetch updates");
                    if !self.back_off(&mut shutdown).await {
                        info!("polling worker shutting down");
                        return;
                    }
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                let Some(event) = update.into_event() else {
                    continue;
                };
                if let Err(err) = handler.handle(event).await {
                    error!(error = %format!("{err:#}"), "failed to handle update");
                }
            }
        }
    }

    /// Removes a registered webhook, retrying until it succeeds. Returns
    /// `false` when shutdown is requested first.
    async fn clear_webhook(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        loop {
            let result = tokio::select! {
                _ = shutdown.changed() => return false,
                result = self.client.delete_webhook() => result,
            };
            match result {
                Ok(()) => return true,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "failed to delete webhook");
                    if !self.back_off(shutdown).await {
                        return false;
                    }
                }
            }
        }
    }

    /// Sleeps for the retry delay. Returns `false` when shutdown is requested.
    async fn back_off(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = shutdown.changed() => false,
            _ = tokio::time::sleep(self.config.retry_delay) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tokio::time::timeout;

    use super::*;
    use crate::{
        application::{
            handlers::broadcast_dispatcher::{BroadcastDispatcher, DispatchSettings},
            services::pacing::TokioPacer,
        },
        infrastructure::repositories::in_memory::{
            InMemoryBroadcastFailureRepository, InMemorySubscriberRepository,
        },
    };

    fn unreachable_worker() -> (PollingWorker, Arc<UpdateHandler>) {
        let client = TelegramClient::new("t", "http://127.0.0.1:1").unwrap();
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(
            subscribers.clone(),
            Arc::new(InMemoryBroadcastFailureRepository::new()),
            client.clone(),
            Arc::new(TokioPacer),
            DispatchSettings::default(),
        ));
        let handler = Arc::new(UpdateHandler::new(
            subscribers,
            client.clone(),
            dispatcher,
            HashSet::new(),
        ));
        let config = PollingConfig {
            timeout_secs: 1,
            retry_delay: Duration::from_millis(20),
        };
        (PollingWorker::new(client, config), handler)
    }

    #[tokio::test]
    async fn keeps_retrying_while_telegram_is_unreachable() {
        let (worker, handler) = unreachable_worker();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handle = worker.spawn(handler, shutdown_rx);

        assert!(
            timeout(Duration::from_millis(500), &mut handle).await.is_err(),
            "worker exited without a shutdown signal"
        );

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(2), handle)
            .await
            .expect("worker ignored the shutdown signal")
            .unwrap();
    }
}
