#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

use broadcast_bot::{
    application::{
        handlers::broadcast_dispatcher::{BroadcastDispatcher, DispatchSettings},
        services::{messenger::MessengerClient, pacing::Pacer},
    },
    domain::{
        models::{Audience, DeliveryFailure, Language, OutgoingMessage, RecipientId, Subscriber},
        repositories::{BroadcastFailureRepository, SubscriberRepository},
    },
};

pub fn ids(range: std::ops::RangeInclusive<i64>) -> Vec<RecipientId> {
    range.map(RecipientId).collect()
}

/// Holds sends until the test releases them.
pub struct Gate {
    pub entered: Notify,
    pub release: Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    pub fn open(&self) {
        self.release.add_permits(10_000);
    }
}

/// Records every call; fails a recipient's n-th send when scripted to.
#[derive(Default)]
pub struct ScriptedMessenger {
    sent: Mutex<Vec<(RecipientId, OutgoingMessage)>>,
    answered: Mutex<Vec<String>>,
    fail_on: HashMap<RecipientId, usize>,
    fail_answers: bool,
    gate: Option<Arc<Gate>>,
}

impl ScriptedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `nth` (zero based) send addressed to `recipient`.
    pub fn failing(mut self, recipient: RecipientId, nth: usize) -> Self {
        self.fail_on.insert(recipient, nth);
        self
    }

    /// Records callback answers but reports each of them as failed.
    pub fn failing_answers(mut self) -> Self {
        self.fail_answers = true;
        self
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn sent(&self) -> Vec<(RecipientId, OutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: RecipientId) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn texts_to(&self, recipient: RecipientId) -> Vec<String> {
        self.sent_to(recipient)
            .into_iter()
            .map(|message| message.text)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessengerClient for ScriptedMessenger {
    async fn send(&self, recipient: RecipientId, message: &OutgoingMessage) -> anyhow::Result<()> {
        let attempt = {
            let mut sent = self.sent.lock().unwrap();
            let attempt = sent.iter().filter(|(to, _)| *to == recipient).count();
            sent.push((recipient, message.clone()));
            attempt
        };

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.acquire().await.unwrap().forget();
        }

        if self.fail_on.get(&recipient) == Some(&attempt) {
            anyhow::bail!("Forbidden: bot was blocked by the user {recipient}");
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, _text: Option<&str>) -> anyhow::Result<()> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        if self.fail_answers {
            anyhow::bail!("Bad Request: query is too old and response timeout expired");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Delegates to an inner store, failing removals or listings when told to.
pub struct FaultySubscribers<R> {
    inner: R,
    fail_remove: bool,
    fail_list: bool,
}

impl<R> FaultySubscribers<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            fail_remove: false,
            fail_list: false,
        }
    }

    pub fn unremovable(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub fn unlistable(mut self) -> Self {
        self.fail_list = true;
        self
    }
}

#[async_trait]
impl<R: SubscriberRepository> SubscriberRepository for FaultySubscribers<R> {
    async fn insert(&self, user_id: RecipientId) -> anyhow::Result<bool> {
        self.inner.insert(user_id).await
    }

    async fn get(&self, user_id: RecipientId) -> anyhow::Result<Option<Subscriber>> {
        self.inner.get(user_id).await
    }

    async fn set_language(&self, user_id: RecipientId, language: Language) -> anyhow::Result<()> {
        self.inner.set_language(user_id, language).await
    }

    async fn set_marketing_consent(
        &self,
        user_id: RecipientId,
        consent: bool,
    ) -> anyhow::Result<()> {
        self.inner.set_marketing_consent(user_id, consent).await
    }

    async fn remove(&self, user_id: RecipientId) -> anyhow::Result<()> {
        if self.fail_remove {
            anyhow::bail!("database is locked");
        }
        self.inner.remove(user_id).await
    }

    async fn list_ids(&self, audience: Audience) -> anyhow::Result<Vec<RecipientId>> {
        if self.fail_list {
            anyhow::bail!("database is locked");
        }
        self.inner.list_ids(audience).await
    }

    async fn count(&self) -> anyhow::Result<u64> {
        self.inner.count().await
    }
}

pub struct BrokenFailureLog;

#[async_trait]
impl BroadcastFailureRepository for BrokenFailureLog {
    async fn record(&self, _job_id: Uuid, _failures: &[DeliveryFailure]) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

pub fn settings() -> DispatchSettings {
    DispatchSettings::default()
}

pub fn dispatcher(
    subscribers: Arc<dyn SubscriberRepository>,
    failures: Arc<dyn BroadcastFailureRepository>,
    messenger: Arc<dyn MessengerClient>,
    pacer: Arc<dyn Pacer>,
    settings: DispatchSettings,
) -> Arc<BroadcastDispatcher> {
    Arc::new(BroadcastDispatcher::new(
        subscribers,
        failures,
        messenger,
        pacer,
        settings,
    ))
}
