use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

use crate::domain::{
    models::{Audience, DeliveryFailure, Language, RecipientId, Subscriber},
    repositories::{BroadcastFailureRepository, SubscriberRepository},
};

pub type SqlitePool = Pool<Sqlite>;

/// Opens (creating if needed) the database and applies pending migrations.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {database_url}"))?
        .create_if_missing(true);

    // Every connection to an in-memory database is a separate database.
    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .context("failed to open sqlite database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

#[derive(Clone)]
pub struct SqliteSubscriberRepository {
    pool: SqlitePool,
}

impl SqliteSubscriberRepository {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl SubscriberRepository for SqliteSubscriberRepository {
    async fn insert(&self, user_id: RecipientId) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subscribers (user_id, language, marketing_consent, subscribed_at)
            VALUES (?, NULL, 0, ?)
            "#,
        )
        .bind(user_id.0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, user_id: RecipientId) -> anyhow::Result<Option<Subscriber>> {
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"SELECT user_id, language, marketing_consent, subscribed_at FROM subscribers WHERE user_id = ?"#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;
        record.map(Subscriber::try_from).transpose()
    }

    async fn set_language(&self, user_id: RecipientId, language: Language) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE subscribers SET language = ? WHERE user_id = ?"#)
            .bind(language.code())
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_marketing_consent(
        &self,
        user_id: RecipientId,
        consent: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE subscribers SET marketing_consent = ? WHERE user_id = ?"#)
            .bind(consent)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, user_id: RecipientId) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM subscribers WHERE user_id = ?"#)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_ids(&self, audience: Audience) -> anyhow::Result<Vec<RecipientId>> {
        let query = match audience {
            Audience::All => r#"SELECT user_id FROM subscribers ORDER BY id"#,
            Audience::MarketingConsented => {
                r#"SELECT user_id FROM subscribers WHERE marketing_consent = 1 ORDER BY id"#
            }
        };
        let ids = sqlx::query_scalar::<_, i64>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(RecipientId).collect())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM subscribers"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[derive(Clone)]
pub struct SqliteBroadcastFailureRepository {
    pool: SqlitePool,
}

impl SqliteBroadcastFailureRepository {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self { pool })
    }

    pub async fn list_by_job(&self, job_id: Uuid) -> anyhow::Result<Vec<DeliveryFailure>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"SELECT recipient_id, error FROM broadcast_failures WHERE job_id = ? ORDER BY id"#,
        )
        .bind(job_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(recipient, reason)| DeliveryFailure {
                recipient: RecipientId(recipient),
                reason,
            })
            .collect())
    }
}

#[async_trait]
impl BroadcastFailureRepository for SqliteBroadcastFailureRepository {
    async fn record(&self, job_id: Uuid, failures: &[DeliveryFailure]) -> anyhow::Result<()> {
        let recorded_at = Utc::now();
        let job_id = job_id.to_string();
        let mut tx = self.pool.begin().await?;
        for failure in failures {
            sqlx::query(
                r#"
                INSERT INTO broadcast_failures (job_id, recipient_id, error, recorded_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&job_id)
            .bind(failure.recipient.0)
            .bind(&failure.reason)
            .bind(recorded_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct SubscriberRecord {
    user_id: i64,
    language: Option<String>,
    marketing_consent: bool,
    subscribed_at: DateTime<Utc>,
}

impl TryFrom<SubscriberRecord> for Subscriber {
    type Error = anyhow::Error;

    fn try_from(value: SubscriberRecord) -> Result<Self, Self::Error> {
        let language = value
            .language
            .map(|code| {
                Language::from_code(&code).ok_or_else(|| anyhow::anyhow!("unknown language {code}"))
            })
            .transpose()?;
        Ok(Self {
            user_id: RecipientId(value.user_id),
            language,
            marketing_consent: value.marketing_consent,
            subscribed_at: value.subscribed_at,
        })
    }
}
