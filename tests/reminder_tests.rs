#![allow(clippy::unwrap_used)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use sadqa_bot::database::{connection::DatabaseManager, models::*};
use sadqa_bot::messages;
use sadqa_bot::services::content::DevotionalContent;
use sadqa_bot::services::messenger::Messenger;
use sadqa_bot::services::prayer_times::{
    DailyTimings, FixedTable, PrayerEvent, PrayerMode, PrayerTimeSource,
};
use sadqa_bot::services::reminder::{Notifier, PrayerMessages};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Records every send; sends to `failing` error out until `recover` is called.
#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(i64, String)>>,
    failing: Mutex<Option<i64>>,
}

impl RecordingMessenger {
    fn failing_for(user_id: i64) -> Self {
        Self { sent: Mutex::new(Vec::new()), failing: Mutex::new(Some(user_id)) }
    }

    fn recover(&self) {
        *self.failing.lock().unwrap() = None;
    }

    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn sent_to(&self, user_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<()> {
        if *self.failing.lock().unwrap() == Some(recipient) {
            return Err(anyhow!("Forbidden: bot was blocked by the user"));
        }
        self.sent.lock().unwrap().push((recipient, text.to_string()));
        Ok(())
    }
}

/// Fajr at 05:12 for every location, counting lookups.
#[derive(Default)]
struct StubSource {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl PrayerTimeSource for StubSource {
    async fn timings(&self, _location: Coordinates, _date: NaiveDate) -> Result<DailyTimings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("prayer time service unavailable"));
        }
        Ok(DailyTimings::new(BTreeMap::from([
            (PrayerEvent::Fajr, NaiveTime::from_hms_opt(5, 12, 0).unwrap()),
            (PrayerEvent::Dhuhr, NaiveTime::from_hms_opt(12, 3, 0).unwrap()),
        ])))
    }
}

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

fn civil(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

fn content() -> DevotionalContent {
    DevotionalContent::new(
        vec!["﴿ألا بذكر الله تطمئن القلوب﴾".to_string()],
        vec!["اللهم اغفر لي".to_string()],
    )
}

fn location_notifier(
    db: &DatabaseManager,
    messenger: Arc<RecordingMessenger>,
    source: Arc<StubSource>,
) -> Notifier {
    Notifier::new(
        db.clone(),
        messenger,
        PrayerMode::LocationAware(source),
        content(),
        12,
    )
}

fn fixed_notifier(db: &DatabaseManager, messenger: Arc<RecordingMessenger>) -> Notifier {
    Notifier::new(
        db.clone(),
        messenger,
        PrayerMode::FixedTable(FixedTable::default()),
        content(),
        12,
    )
}

async fn subscribe_with_location(db: &DatabaseManager, user_id: i64) -> Result<()> {
    Subscriber::add(&db.pool, user_id, "Subscriber").await?;
    Subscriber::set_location(&db.pool, user_id, 21.4225, 39.8262).await?;
    Ok(())
}

#[tokio::test]
async fn test_location_pass_sends_once_per_day() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = location_notifier(&db, messenger.clone(), Arc::new(StubSource::default()));

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.delivered, 1);
    let sent = messenger.sent_to(1001);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Fajr"));

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.attempted(), 0);
    assert_eq!(messenger.sent().len(), 1);

    let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert_eq!(notifier.sent_on(day, 1001).await, vec![PrayerEvent::Fajr]);
    assert_eq!(SentNotification::find_by_date(&db.pool, day).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_location_pass_next_day_allowed() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = location_notifier(&db, messenger.clone(), Arc::new(StubSource::default()));

    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    notifier.run_prayer_pass(civil(2024, 5, 11, 5, 12)).await?;
    assert_eq!(messenger.sent_to(1001).len(), 2);

    let previous = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert!(SentNotification::find_by_date(&db.pool, previous).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_location_pass_only_matches_exact_minute() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = location_notifier(&db, messenger.clone(), Arc::new(StubSource::default()));

    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 11)).await?;
    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 13)).await?;
    notifier.run_prayer_pass(civil(2024, 5, 10, 12, 3)).await?;

    let sent = messenger.sent_to(1001);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Dhuhr"));

    Ok(())
}

#[tokio::test]
async fn test_location_pass_skips_without_location_or_flag() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1001, "No location").await?;
    subscribe_with_location(&db, 1002).await?;
    Subscriber::set_reminder_flag(&db.pool, 1002, false).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = location_notifier(&db, messenger.clone(), Arc::new(StubSource::default()));

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.attempted(), 0);
    assert!(messenger.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_location_pass_skips_on_source_failure() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let source = Arc::new(StubSource { fail: true, ..Default::default() });
    let notifier = location_notifier(&db, messenger.clone(), source.clone());

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.attempted(), 0);
    assert!(messenger.sent().is_empty());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_location_pass_caches_daily_timings() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;
    subscribe_with_location(&db, 1002).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let source = Arc::new(StubSource::default());
    let notifier = location_notifier(&db, messenger.clone(), source.clone());

    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 11)).await?;
    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(messenger.sent().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_failed_delivery_is_retried_within_the_minute() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;
    subscribe_with_location(&db, 1002).await?;

    let messenger = Arc::new(RecordingMessenger::failing_for(1001));
    let notifier = location_notifier(&db, messenger.clone(), Arc::new(StubSource::default()));

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(messenger.sent_to(1002).len(), 1);

    let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert!(notifier.sent_on(day, 1001).await.is_empty());
    assert_eq!(notifier.sent_on(day, 1002).await, vec![PrayerEvent::Fajr]);

    // Another pass within the same minute reaches 1001 only
    messenger.recover();
    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(messenger.sent_to(1001).len(), 1);
    assert_eq!(messenger.sent_to(1002).len(), 1);
    assert_eq!(notifier.sent_on(day, 1001).await, vec![PrayerEvent::Fajr]);

    Ok(())
}

#[tokio::test]
async fn test_restored_ledger_prevents_resend() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    subscribe_with_location(&db, 1001).await?;
    let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let first = Arc::new(RecordingMessenger::default());
    let notifier = location_notifier(&db, first.clone(), Arc::new(StubSource::default()));
    notifier.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert_eq!(first.sent().len(), 1);

    // A fresh notifier stands in for a restarted process
    let second = Arc::new(RecordingMessenger::default());
    let restarted = location_notifier(&db, second.clone(), Arc::new(StubSource::default()));
    assert_eq!(restarted.restore_ledger(day).await?, 1);

    restarted.run_prayer_pass(civil(2024, 5, 10, 5, 12)).await?;
    assert!(second.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_fixed_table_pass_at_prayer_hour() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;
    Subscriber::add(&db.pool, 2, "B").await?;
    Subscriber::add(&db.pool, 3, "C").await?;
    Subscriber::set_reminder_flag(&db.pool, 3, false).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = fixed_notifier(&db, messenger.clone());

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 5, 0)).await?;
    assert_eq!(summary.delivered, 2);
    assert_eq!(messenger.sent_to(1), vec![messages::prayer_call(PrayerEvent::Fajr)]);
    assert_eq!(messenger.sent_to(2), vec![messages::prayer_call(PrayerEvent::Fajr)]);
    assert!(messenger.sent_to(3).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_fixed_table_pass_outside_prayer_hours() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = fixed_notifier(&db, messenger.clone());

    for hour in [0, 4, 6, 13, 21, 23] {
        let summary = notifier.run_prayer_pass(civil(2024, 5, 10, hour, 0)).await?;
        assert_eq!(summary.attempted(), 0, "sent at hour {hour}");
    }
    assert!(messenger.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_devotional_pass_sends_pair_to_everyone() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;
    Subscriber::add(&db.pool, 2, "B").await?;
    // Devotional messages ignore the reminder flag
    Subscriber::set_reminder_flag(&db.pool, 2, false).await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = fixed_notifier(&db, messenger.clone());

    let summary = notifier.run_devotional_pass().await?;
    assert_eq!(summary.delivered, 4);
    for user_id in [1, 2] {
        assert_eq!(
            messenger.sent_to(user_id),
            vec!["﴿ألا بذكر الله تطمئن القلوب﴾".to_string(), "اللهم اغفر لي".to_string()]
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_devotional_pass_with_empty_content() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = Notifier::new(
        db.clone(),
        messenger.clone(),
        PrayerMode::FixedTable(FixedTable::default()),
        DevotionalContent::new(Vec::new(), vec!["اللهم اغفر لي".to_string()]),
        12,
    );

    assert_eq!(notifier.run_devotional_pass().await?.attempted(), 0);
    assert!(messenger.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_friday_blessing_fires_once() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = fixed_notifier(&db, messenger.clone());

    // 2024-05-10 is a Friday, 2024-05-09 a Thursday
    assert_eq!(notifier.run_friday_pass(civil(2024, 5, 9, 12, 0)).await?.attempted(), 0);
    assert_eq!(notifier.run_friday_pass(civil(2024, 5, 10, 11, 0)).await?.attempted(), 0);
    assert_eq!(notifier.run_friday_pass(civil(2024, 5, 10, 12, 0)).await?.delivered, 1);
    assert_eq!(notifier.run_friday_pass(civil(2024, 5, 10, 12, 0)).await?.attempted(), 0);
    assert_eq!(notifier.run_friday_pass(civil(2024, 5, 17, 12, 0)).await?.delivered, 1);

    assert_eq!(
        messenger.sent_to(1),
        vec![messages::FRIDAY_BLESSING.to_string(), messages::FRIDAY_BLESSING.to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn test_one_failure_does_not_stop_a_pass() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;
    Subscriber::add(&db.pool, 2, "B").await?;
    Subscriber::add(&db.pool, 3, "C").await?;

    let messenger = Arc::new(RecordingMessenger::failing_for(2));
    let notifier = fixed_notifier(&db, messenger.clone());

    let summary = notifier.run_prayer_pass(civil(2024, 5, 10, 12, 0)).await?;
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(messenger.sent_to(1).len(), 1);
    assert_eq!(messenger.sent_to(3).len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_generated_message_without_canned_text() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    Subscriber::add(&db.pool, 1, "A").await?;

    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = fixed_notifier(&db, messenger.clone()).with_messages(PrayerMessages::empty());

    notifier.run_prayer_pass(civil(2024, 5, 10, 18, 0)).await?;
    let sent = messenger.sent_to(1);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Maghrib"));
    assert!(sent[0].contains("6:00 PM"));

    Ok(())
}
