use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A latitude/longitude pair shared by the user through Telegram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: i64,
    pub name: String,
    pub reminder_enabled: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

const SUBSCRIBER_COLUMNS: &str =
    "user_id, name, reminder_enabled, latitude, longitude, created_at";

impl Subscriber {
    /// Both halves of the stored location, if the user has shared one.
    pub fn location(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    /// Registers a subscriber, or refreshes the display name of an existing one.
    /// Reminder flag and location survive a repeated `/start`.
    pub async fn add(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO subscribers (user_id, name, reminder_enabled, created_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(user_id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Deletes the subscriber. Returns whether a row existed; a missing id is not an error.
    pub async fn remove(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscribers WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY created_at ASC, user_id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn list_reminder_enabled(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE reminder_enabled = 1 ORDER BY user_id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscribers")
            .fetch_one(pool)
            .await
    }

    /// Current reminder flag; unknown users read as disabled.
    pub async fn reminder_flag(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let flag = sqlx::query_scalar::<_, bool>(
            "SELECT reminder_enabled FROM subscribers WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(flag.unwrap_or(false))
    }

    pub async fn set_reminder_flag(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        enabled: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE subscribers SET reminder_enabled = ? WHERE user_id = ?")
            .bind(enabled)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Writes the negation of the stored flag and returns the new value.
    /// `None` when the user is not subscribed.
    pub async fn toggle_reminder(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<bool>, sqlx::Error> {
        let Some(subscriber) = Self::find_by_id(pool, user_id).await? else {
            return Ok(None);
        };

        let enabled = !subscriber.reminder_enabled;
        Self::set_reminder_flag(pool, user_id, enabled).await?;
        Ok(Some(enabled))
    }

    pub async fn set_location(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE subscribers SET latitude = ?, longitude = ? WHERE user_id = ?")
            .bind(latitude)
            .bind(longitude)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn stored_location(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Coordinates>, sqlx::Error> {
        Ok(Self::find_by_id(pool, user_id)
            .await?
            .and_then(|subscriber| subscriber.location()))
    }
}
