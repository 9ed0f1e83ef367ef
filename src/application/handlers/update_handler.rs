use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    application::{
        handlers::broadcast_dispatcher::{BroadcastDispatcher, BroadcastRun},
        services::{
            commands::{BotCommand, parse_command},
            keyboards,
            messenger::MessengerClient,
        },
        usecases::{
            choose_language::ChooseLanguageUseCase,
            marketing_consent::{MarketingConsentRequest, MarketingConsentUseCase},
            start_broadcast::{StartBroadcastRequest, StartBroadcastUseCase},
            subscribe::{SubscribeOutcome, SubscribeUseCase},
            unsubscribe::UnsubscribeUseCase,
        },
    },
    domain::{
        errors::{BroadcastError, DomainError},
        models::{
            Audience, BroadcastReport, InboundEvent, Language, OutgoingMessage, RecipientId,
            language::{CHOOSE_LANGUAGE_PROMPT, subscribe_button_language, unsubscribe_button_language},
        },
        repositories::SubscriberRepository,
    },
};

const ADMIN_ONLY: &str = "⛔ This command is available to administrators only.";
const BROADCAST_USAGE: &str = "Usage: /broadcast <text> or /promo <text>";
const BROADCAST_BUSY: &str = "⏳ Another broadcast is still running, try again later.";
const BROADCAST_UNAVAILABLE: &str =
    "⚠️ Could not read the subscriber list, the broadcast was not started.";

/// Routes inbound updates to the subscription use cases and the admin
/// broadcast trigger.
pub struct UpdateHandler {
    messenger: Arc<dyn MessengerClient>,
    subscriber_repo: Arc<dyn SubscriberRepository>,
    subscribe: SubscribeUseCase,
    unsubscribe: UnsubscribeUseCase,
    choose_language: ChooseLanguageUseCase,
    marketing_consent: MarketingConsentUseCase,
    start_broadcast: StartBroadcastUseCase,
    running_broadcast: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateHandler {
    pub fn new(
        subscriber_repo: Arc<dyn SubscriberRepository>,
        messenger: Arc<dyn MessengerClient>,
        dispatcher: Arc<BroadcastDispatcher>,
        admins: HashSet<RecipientId>,
    ) -> Self {
        Self {
            messenger,
            subscribe: SubscribeUseCase::new(subscriber_repo.clone()),
            unsubscribe: UnsubscribeUseCase::new(subscriber_repo.clone()),
            choose_language: ChooseLanguageUseCase::new(subscriber_repo.clone()),
            marketing_consent: MarketingConsentUseCase::new(subscriber_repo.clone()),
            start_broadcast: StartBroadcastUseCase::new(dispatcher, admins),
            subscriber_repo,
            running_broadcast: Mutex::new(None),
        }
    }

    pub async fn handle(&self, event: InboundEvent) -> anyhow::Result<()> {
        match event {
            InboundEvent::Text { sender, text } => self.handle_text(sender, &text).await,
            InboundEvent::Callback {
                callback_id,
                sender,
                data,
            } => self.handle_callback(&callback_id, sender, data).await,
        }
    }

    /// Waits for the broadcast started by this handler, if one is running.
    pub async fn join_broadcast(&self) {
        let handle = match self.running_broadcast.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!(error = %err, "broadcast task panicked");
            }
        }
    }

    async fn handle_text(&self, sender: RecipientId, text: &str) -> anyhow::Result<()> {
        if let Some(command) = parse_command(text) {
            return match command {
                BotCommand::Start => self.handle_start(sender).await,
                BotCommand::Broadcast { audience, text } => {
                    self.handle_broadcast(sender, text, audience).await
                }
                BotCommand::Stats => self.handle_stats(sender).await,
            };
        }

        if subscribe_button_language(text).is_some() {
            return self.handle_subscribe(sender).await;
        }
        if let Some(language) = Language::from_label(text) {
            return self.handle_language(sender, language).await;
        }
        if unsubscribe_button_language(text).is_some() {
            return self.handle_unsubscribe(sender).await;
        }

        debug!(%sender, "ignoring unrecognised text");
        Ok(())
    }

    async fn handle_start(&self, sender: RecipientId) -> anyhow::Result<()> {
        let message = match self.subscriber_repo.get(sender).await? {
            Some(subscriber) => {
                let language = subscriber.language_or_default();
                OutgoingMessage::text(language.texts().already_subscribed)
                    .with_keyboard(keyboards::after_subscription(language))
            }
            None => {
                let language = Language::default();
                OutgoingMessage::text(language.texts().welcome)
                    .with_keyboard(keyboards::before_subscription(language))
            }
        };
        self.reply(sender, message).await
    }

    async fn handle_subscribe(&self, sender: RecipientId) -> anyhow::Result<()> {
        match self.subscribe.execute(sender).await? {
            SubscribeOutcome::AlreadySubscribed(subscriber) => {
                let language = subscriber.language_or_default();
                self.reply(
                    sender,
                    OutgoingMessage::text(language.texts().already_subscribed)
                        .with_keyboard(keyboards::after_subscription(language)),
                )
                .await
            }
            SubscribeOutcome::Subscribed => {
                info!(%sender, "new subscriber");
                self.reply(
                    sender,
                    OutgoingMessage::text(CHOOSE_LANGUAGE_PROMPT)
                        .with_keyboard(keyboards::languages()),
                )
                .await
            }
        }
    }

    async fn handle_language(&self, sender: RecipientId, language: Language) -> anyhow::Result<()> {
        self.choose_language.execute(sender, language).await?;

        let texts = language.texts();
        self.reply(
            sender,
            OutgoingMessage::text(texts.greeting)
                .with_keyboard(keyboards::after_subscription(language)),
        )
        .await?;
        self.reply(
            sender,
            OutgoingMessage::text(texts.marketing_prompt)
                .with_keyboard(keyboards::marketing_consent(language, sender)),
        )
        .await
    }

    async fn handle_unsubscribe(&self, sender: RecipientId) -> anyhow::Result<()> {
        let language = self.unsubscribe.execute(sender).await?;
        info!(%sender, "subscriber left");
        self.reply(
            sender,
            OutgoingMessage::text(language.texts().unsubscribed)
                .with_keyboard(keyboards::before_subscription(language)),
        )
        .await
    }

    async fn handle_callback(
        &self,
        callback_id: &str,
        sender: RecipientId,
        data: String,
    ) -> anyhow::Result<()> {
        let request = MarketingConsentRequest {
            sender,
            callback_data: data,
        };
        let result = self.marketing_consent.execute(request).await;

        if let Err(err) = self.messenger.answer_callback(callback_id, None).await {
            warn!(%sender, error = %format!("{err:#}"), "failed to answer callback query");
        }

        match result {
            Ok(response) => {
                let texts = response.language.texts();
                let text = if response.consent {
                    texts.marketing_enabled
                } else {
                    texts.marketing_disabled
                };
                self.reply(sender, OutgoingMessage::text(text)).await
            }
            Err(DomainError::Validation(reason) | DomainError::Forbidden(reason)) => {
                warn!(%sender, %reason, "rejected callback");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn handle_stats(&self, sender: RecipientId) -> anyhow::Result<()> {
        if !self.start_broadcast.is_admin(sender) {
            return self.reply(sender, OutgoingMessage::text(ADMIN_ONLY)).await;
        }
        let count = self.subscriber_repo.count().await?;
        self.reply(sender, OutgoingMessage::text(format!("👥 Subscribers: {count}")))
            .await
    }

    async fn handle_broadcast(
        &self,
        sender: RecipientId,
        text: String,
        audience: Audience,
    ) -> anyhow::Result<()> {
        let request = StartBroadcastRequest {
            sender,
            text,
            audience,
        };
        let run = match self.start_broadcast.execute(request).await {
            Ok(run) => run,
            Err(DomainError::Forbidden(reason)) => {
                warn!(%sender, %reason, "broadcast refused");
                return self.reply(sender, OutgoingMessage::text(ADMIN_ONLY)).await;
            }
            Err(DomainError::Broadcast(BroadcastError::EmptyPayload)) => {
                return self.reply(sender, OutgoingMessage::text(BROADCAST_USAGE)).await;
            }
            Err(DomainError::Broadcast(BroadcastError::BroadcastInProgress)) => {
                return self.reply(sender, OutgoingMessage::text(BROADCAST_BUSY)).await;
            }
            Err(DomainError::Broadcast(BroadcastError::Store(err))) => {
                error!(%sender, error = %format!("{err:#}"), "failed to list broadcast recipients");
                return self
                    .reply(sender, OutgoingMessage::text(BROADCAST_UNAVAILABLE))
                    .await;
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            %sender,
            job_id = %run.job_id(),
            recipients = run.recipients().len(),
            "broadcast admitted"
        );
        self.spawn_broadcast(sender, run);
        Ok(())
    }

    fn spawn_broadcast(&self, admin: RecipientId, run: BroadcastRun) {
        let messenger = self.messenger.clone();
        let handle = tokio::spawn(async move {
            let report = run.execute().await;
            let summary = OutgoingMessage::text(summarize(&report));
            if let Err(err) = messenger.send(admin, &summary).await {
                error!(%admin, job_id = %report.job_id, error = %err, "failed to send broadcast summary");
            }
        });

        let mut slot = match self.running_broadcast.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(handle);
    }

    async fn reply(&self, to: RecipientId, message: OutgoingMessage) -> anyhow::Result<()> {
        self.messenger
            .send(to, &message)
            .await
            .with_context(|| format!("failed to reply to {to}"))
    }
}

fn summarize(report: &BroadcastReport) -> String {
    format!(
        "📣 Broadcast finished\nRecipients: {}\nChunks: {}\nFailed: {}\nRemoved: {}",
        report.recipients,
        report.chunks,
        report.failed(),
        report.evicted
    )
}
