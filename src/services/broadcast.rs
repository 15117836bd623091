use crate::database::{connection::DatabaseManager, models::Subscriber};
use crate::services::messenger::{deliver, Messenger, PassSummary};

/// Sends `text` to each recipient in turn. One failure never stops the rest.
pub async fn send_to_each(
    messenger: &dyn Messenger,
    recipients: &[Subscriber],
    text: &str,
) -> PassSummary {
    let mut summary = PassSummary::default();
    for subscriber in recipients {
        summary.record(deliver(messenger, subscriber.user_id, text).await);
    }
    summary
}

/// Sends `text` to every subscriber, regardless of reminder preference.
pub async fn broadcast_to_all(
    db: &DatabaseManager,
    messenger: &dyn Messenger,
    text: &str,
) -> Result<PassSummary, sqlx::Error> {
    let subscribers = Subscriber::list_all(&db.pool).await?;
    Ok(send_to_each(messenger, &subscribers, text).await)
}
