mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use broadcast_bot::{
    domain::{
        models::{Audience, DeliveryFailure, Language, RecipientId},
        repositories::{BroadcastFailureRepository, SubscriberRepository},
    },
    infrastructure::repositories::sqlite::{
        SqliteBroadcastFailureRepository, SqlitePool, SqliteSubscriberRepository, connect,
    },
};

use common::{RecordingPacer, ScriptedMessenger, dispatcher, settings};

async fn pool() -> SqlitePool {
    connect("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn insert_is_idempotent_and_keeps_insertion_order() {
    let repo = SqliteSubscriberRepository::new(pool().await);

    for id in [30, 10, 20] {
        assert!(repo.insert(RecipientId(id)).await.unwrap());
    }
    assert!(!repo.insert(RecipientId(10)).await.unwrap());

    assert_eq!(
        repo.list_ids(Audience::All).await.unwrap(),
        vec![RecipientId(30), RecipientId(10), RecipientId(20)]
    );
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn stores_language_and_consent() {
    let repo = SqliteSubscriberRepository::new(pool().await);
    let user = RecipientId(5);
    repo.insert(user).await.unwrap();

    let fresh = repo.get(user).await.unwrap().unwrap();
    assert_eq!(fresh.language, None);
    assert!(!fresh.marketing_consent);

    repo.set_language(user, Language::Kazakh).await.unwrap();
    repo.set_marketing_consent(user, true).await.unwrap();

    let stored = repo.get(user).await.unwrap().unwrap();
    assert_eq!(stored.user_id, user);
    assert_eq!(stored.language, Some(Language::Kazakh));
    assert!(stored.marketing_consent);
}

#[tokio::test]
async fn updates_for_unknown_users_are_noops() {
    let repo = SqliteSubscriberRepository::new(pool().await);

    repo.set_language(RecipientId(1), Language::German)
        .await
        .unwrap();
    repo.set_marketing_consent(RecipientId(1), true)
        .await
        .unwrap();

    assert!(repo.get(RecipientId(1)).await.unwrap().is_none());
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let repo = SqliteSubscriberRepository::new(pool().await);
    repo.insert(RecipientId(1)).await.unwrap();
    repo.insert(RecipientId(2)).await.unwrap();

    repo.remove(RecipientId(1)).await.unwrap();
    repo.remove(RecipientId(1)).await.unwrap();
    repo.remove(RecipientId(99)).await.unwrap();

    assert_eq!(
        repo.list_ids(Audience::All).await.unwrap(),
        vec![RecipientId(2)]
    );
}

#[tokio::test]
async fn marketing_audience_filters_by_consent() {
    let repo = SqliteSubscriberRepository::new(pool().await);
    for id in 1..=4 {
        repo.insert(RecipientId(id)).await.unwrap();
    }
    repo.set_marketing_consent(RecipientId(3), true)
        .await
        .unwrap();
    repo.set_marketing_consent(RecipientId(1), true)
        .await
        .unwrap();
    repo.set_marketing_consent(RecipientId(1), false)
        .await
        .unwrap();

    assert_eq!(
        repo.list_ids(Audience::MarketingConsented).await.unwrap(),
        vec![RecipientId(3)]
    );
    assert_eq!(repo.list_ids(Audience::All).await.unwrap().len(), 4);
}

#[tokio::test]
async fn failure_log_groups_entries_by_job() {
    let log = SqliteBroadcastFailureRepository::new(pool().await);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let failures = vec![
        DeliveryFailure {
            recipient: RecipientId(4),
            reason: "Forbidden: bot was blocked by the user".to_string(),
        },
        DeliveryFailure {
            recipient: RecipientId(8),
            reason: "Bad Request: chat not found".to_string(),
        },
    ];

    log.record(first, &failures).await.unwrap();
    log.record(second, &failures[1..]).await.unwrap();

    assert_eq!(log.list_by_job(first).await.unwrap(), failures);
    assert_eq!(log.list_by_job(second).await.unwrap(), failures[1..].to_vec());
    assert!(log.list_by_job(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn broadcast_evicts_unreachable_subscribers_from_the_database() {
    let pool = pool().await;
    let subscribers = SqliteSubscriberRepository::new(pool.clone());
    let failure_log = SqliteBroadcastFailureRepository::new(pool);
    for id in 1..=3 {
        subscribers.insert(RecipientId(id)).await.unwrap();
    }
    let messenger = Arc::new(ScriptedMessenger::new().failing(RecipientId(2), 0));
    let dispatcher = dispatcher(
        subscribers.clone(),
        failure_log.clone(),
        messenger,
        Arc::new(RecordingPacer::default()),
        settings(),
    );

    let report = dispatcher.dispatch("hello", Audience::All).await.unwrap();

    assert_eq!(report.evicted, 1);
    assert_eq!(
        subscribers.list_ids(Audience::All).await.unwrap(),
        vec![RecipientId(1), RecipientId(3)]
    );
    assert_eq!(
        failure_log.list_by_job(report.job_id).await.unwrap(),
        report.failures
    );
}
