use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A prayer notification already delivered on a civil date.
/// Backs the in-memory ledger so a restart does not repeat today's sends.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SentNotification {
    pub id: String,
    pub civil_date: String,
    pub user_id: i64,
    pub prayer: String,
    pub sent_at: String,
}

impl SentNotification {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        civil_date: NaiveDate,
        user_id: i64,
        prayer: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let civil_date = civil_date.format("%Y-%m-%d").to_string();
        let sent_at = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT OR IGNORE INTO sent_notifications (id, civil_date, user_id, prayer, sent_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&civil_date)
        .bind(user_id)
        .bind(prayer)
        .bind(&sent_at)
        .execute(pool)
        .await?;

        Ok(SentNotification {
            id,
            civil_date,
            user_id,
            prayer: prayer.to_string(),
            sent_at,
        })
    }

    pub async fn find_by_date(
        pool: &sqlx::SqlitePool,
        civil_date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SentNotification>(
            "SELECT id, civil_date, user_id, prayer, sent_at FROM sent_notifications WHERE civil_date = ? ORDER BY user_id, prayer"
        )
        .bind(civil_date.format("%Y-%m-%d").to_string())
        .fetch_all(pool)
        .await
    }

    /// Drops every row older than `civil_date`, returning how many went.
    pub async fn purge_before(
        pool: &sqlx::SqlitePool,
        civil_date: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sent_notifications WHERE civil_date < ?")
            .bind(civil_date.format("%Y-%m-%d").to_string())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
