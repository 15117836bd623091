use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::{connection::DatabaseManager, models::*};
use crate::messages;
use crate::services::broadcast::send_to_each;
use crate::services::content::DevotionalContent;
use crate::services::ledger::NotificationLedger;
use crate::services::messenger::{deliver, Delivery, Messenger, PassSummary};
use crate::services::prayer_times::{
    DailyTimings, FixedTable, PrayerEvent, PrayerMode, PrayerTimeSource, TimingsCache,
};
use crate::services::timezone::CivilClock;
use crate::utils::logging::{log_database_error, log_pass_summary};

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Text sent for each prayer. Prayers without a canned text get a generated one.
#[derive(Debug, Clone)]
pub struct PrayerMessages {
    canned: HashMap<PrayerEvent, String>,
}

impl PrayerMessages {
    pub fn empty() -> Self {
        Self { canned: HashMap::new() }
    }

    pub fn with(mut self, event: PrayerEvent, text: impl Into<String>) -> Self {
        self.canned.insert(event, text.into());
        self
    }

    pub fn render(&self, event: PrayerEvent, time: NaiveTime) -> String {
        self.canned
            .get(&event)
            .cloned()
            .unwrap_or_else(|| messages::generic_prayer_call(event, time))
    }
}

impl Default for PrayerMessages {
    fn default() -> Self {
        PrayerEvent::ALL
            .into_iter()
            .fold(Self::empty(), |acc, event| acc.with(event, messages::prayer_call(event)))
    }
}

/// Fires at most once per civil date, on one weekday at one hour.
#[derive(Debug, Clone)]
pub struct WeeklyGate {
    weekday: Weekday,
    hour: u32,
    last_fired: Option<NaiveDate>,
}

impl WeeklyGate {
    pub fn new(weekday: Weekday, hour: u32) -> Self {
        Self { weekday, hour, last_fired: None }
    }

    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        now.weekday() == self.weekday
            && now.hour() == self.hour
            && self.last_fired != Some(now.date_naive())
    }

    pub fn mark_fired(&mut self, date: NaiveDate) {
        self.last_fired = Some(date);
    }
}

/// Decides and sends every scheduled message.
///
/// Each `run_*` method is one independent evaluation pass at a given civil
/// time; the only state carried between passes is the notification ledger,
/// the per-day timings cache and the Friday gate.
pub struct Notifier {
    db: DatabaseManager,
    messenger: Arc<dyn Messenger>,
    mode: PrayerMode,
    messages: PrayerMessages,
    content: DevotionalContent,
    ledger: Mutex<NotificationLedger>,
    timings: Mutex<TimingsCache>,
    friday: Mutex<WeeklyGate>,
    rng: Mutex<StdRng>,
}

impl Notifier {
    pub fn new(
        db: DatabaseManager,
        messenger: Arc<dyn Messenger>,
        mode: PrayerMode,
        content: DevotionalContent,
        friday_hour: u32,
    ) -> Self {
        Self {
            db,
            messenger,
            mode,
            messages: PrayerMessages::default(),
            content,
            ledger: Mutex::new(NotificationLedger::new()),
            timings: Mutex::new(TimingsCache::default()),
            friday: Mutex::new(WeeklyGate::new(Weekday::Fri, friday_hour)),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_messages(mut self, messages: PrayerMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn mode(&self) -> &PrayerMode {
        &self.mode
    }

    /// Loads today's persisted sends into the ledger and drops older rows.
    pub async fn restore_ledger(&self, today: NaiveDate) -> Result<usize, sqlx::Error> {
        let purged = SentNotification::purge_before(&self.db.pool, today).await?;
        let rows = SentNotification::find_by_date(&self.db.pool, today).await?;
        let entries = rows.into_iter().filter_map(|row| {
            row.prayer
                .parse::<PrayerEvent>()
                .ok()
                .map(|event| (row.user_id, event))
        });

        let mut ledger = self.ledger.lock().await;
        *ledger = NotificationLedger::restore(today, entries);
        tracing::info!(
            "Restored {} prayer notifications for {} ({} older rows purged)",
            ledger.len(),
            today,
            purged
        );
        Ok(ledger.len())
    }

    pub async fn sent_on(&self, day: NaiveDate, user_id: i64) -> Vec<PrayerEvent> {
        self.ledger.lock().await.sent_on(day, user_id)
    }

    /// Prayer reminders for the configured mode.
    pub async fn run_prayer_pass(&self, now: DateTime<FixedOffset>) -> Result<PassSummary, sqlx::Error> {
        match &self.mode {
            PrayerMode::FixedTable(table) => self.run_fixed_table_pass(table, now).await,
            PrayerMode::LocationAware(source) => self.run_location_pass(source.as_ref(), now).await,
        }
    }

    /// Every reminder-enabled subscriber is told about each prayer whose
    /// table hour equals the current civil hour.
    pub async fn run_fixed_table_pass(
        &self,
        table: &FixedTable,
        now: DateTime<FixedOffset>,
    ) -> Result<PassSummary, sqlx::Error> {
        let events = table.events_at_hour(now.hour());
        if events.is_empty() {
            return Ok(PassSummary::default());
        }

        let Some(time) = NaiveTime::from_hms_opt(now.hour(), 0, 0) else {
            return Ok(PassSummary::default());
        };

        let subscribers = Subscriber::list_reminder_enabled(&self.db.pool).await?;
        let mut summary = PassSummary::default();
        for event in events {
            let text = self.messages.render(event, time);
            summary.merge(send_to_each(self.messenger.as_ref(), &subscribers, &text).await);
        }
        Ok(summary)
    }

    /// Per-subscriber prayer times, matched to the minute and de-duplicated
    /// through the ledger. Subscribers without a location, or whose times
    /// cannot be fetched, are skipped.
    pub async fn run_location_pass(
        &self,
        source: &dyn PrayerTimeSource,
        now: DateTime<FixedOffset>,
    ) -> Result<PassSummary, sqlx::Error> {
        let today = now.date_naive();
        let clock = now.time();
        let subscribers = Subscriber::list_reminder_enabled(&self.db.pool).await?;

        // Held for the whole pass so overlapping passes serialize
        let mut ledger = self.ledger.lock().await;
        if ledger.roll_to(today) {
            if let Err(e) = SentNotification::purge_before(&self.db.pool, today).await {
                log_database_error("purge", "sent_notifications", &e.to_string(), None);
            }
        }

        let mut summary = PassSummary::default();
        for subscriber in subscribers {
            let Some(location) = subscriber.location() else {
                continue;
            };
            let Some(timings) = self.timings_for(source, location, today).await else {
                continue;
            };

            for (event, time) in timings.due_at(clock) {
                if ledger.contains(today, subscriber.user_id, event) {
                    tracing::debug!("{} already sent to {} today", event, subscriber.user_id);
                    continue;
                }

                let text = self.messages.render(event, time);
                let delivery = deliver(self.messenger.as_ref(), subscriber.user_id, &text).await;
                summary.record(delivery);

                if delivery == Delivery::Delivered && ledger.record(today, subscriber.user_id, event) {
                    if let Err(e) =
                        SentNotification::create(&self.db.pool, today, subscriber.user_id, event.as_str()).await
                    {
                        log_database_error(
                            "insert",
                            "sent_notifications",
                            &e.to_string(),
                            Some(format!("user {} {}", subscriber.user_id, event).as_str()),
                        );
                    }
                }
            }
        }
        Ok(summary)
    }

    async fn timings_for(
        &self,
        source: &dyn PrayerTimeSource,
        location: Coordinates,
        today: NaiveDate,
    ) -> Option<DailyTimings> {
        if let Some(cached) = self.timings.lock().await.get(today, location) {
            return Some(cached);
        }

        match source.timings(location, today).await {
            Ok(timings) => {
                self.timings.lock().await.insert(today, location, timings.clone());
                Some(timings)
            }
            Err(e) => {
                tracing::debug!(
                    "Skipping location ({}, {}): {}",
                    location.latitude,
                    location.longitude,
                    e
                );
                None
            }
        }
    }

    /// A random verse and a random supplication to every subscriber.
    pub async fn run_devotional_pass(&self) -> Result<PassSummary, sqlx::Error> {
        if self.content.verses.is_empty() || self.content.supplications.is_empty() {
            tracing::warn!("Devotional content is empty, skipping broadcast");
            return Ok(PassSummary::default());
        }

        let subscribers = Subscriber::list_all(&self.db.pool).await?;
        let mut summary = PassSummary::default();
        for subscriber in subscribers {
            let pair = {
                let mut rng = self.rng.lock().await;
                self.content
                    .pick_pair(&mut *rng)
                    .map(|(verse, dua)| (verse.to_string(), dua.to_string()))
            };
            let Some((verse, dua)) = pair else {
                continue;
            };

            summary.record(deliver(self.messenger.as_ref(), subscriber.user_id, &verse).await);
            summary.record(deliver(self.messenger.as_ref(), subscriber.user_id, &dua).await);
        }
        Ok(summary)
    }

    /// The Friday blessing, once per Friday at the configured hour.
    pub async fn run_friday_pass(&self, now: DateTime<FixedOffset>) -> Result<PassSummary, sqlx::Error> {
        let mut gate = self.friday.lock().await;
        if !gate.is_due(now) {
            return Ok(PassSummary::default());
        }

        let subscribers = Subscriber::list_all(&self.db.pool).await?;
        gate.mark_fired(now.date_naive());
        drop(gate);

        Ok(send_to_each(self.messenger.as_ref(), &subscribers, messages::FRIDAY_BLESSING).await)
    }
}

/// Cron cadence for each pass.
#[derive(Debug, Clone)]
pub struct Schedules {
    pub prayer: String,
    pub devotional: String,
    pub friday: String,
}

impl Schedules {
    /// Hourly prayer checks for the fixed table, every minute when times come per location.
    pub fn for_mode(mode: &PrayerMode) -> Self {
        let prayer = match mode {
            PrayerMode::FixedTable(_) => "0 0 * * * *",
            PrayerMode::LocationAware(_) => "0 * * * * *",
        };
        Self {
            prayer: prayer.to_string(),
            devotional: "0 0 */3 * * *".to_string(),
            friday: "0 0 * * * *".to_string(),
        }
    }
}

pub struct ReminderService {
    notifier: Arc<Notifier>,
    clock: CivilClock,
    schedules: Schedules,
    scheduler: JobScheduler,
}

impl ReminderService {
    pub async fn new(notifier: Arc<Notifier>, clock: CivilClock) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;
        let schedules = Schedules::for_mode(notifier.mode());

        Ok(Self {
            notifier,
            clock,
            schedules,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        let today = self.clock.today();
        if let Err(e) = self.notifier.restore_ledger(today).await {
            log_database_error("restore", "sent_notifications", &e.to_string(), None);
        }

        let notifier = self.notifier.clone();
        let clock = self.clock;
        let prayer_job = Job::new_async(self.schedules.prayer.as_str(), move |_uuid, _l| {
            let notifier = notifier.clone();
            Box::pin(async move {
                match notifier.run_prayer_pass(clock.now()).await {
                    Ok(summary) => log_pass_summary("prayer", &summary),
                    Err(e) => tracing::error!("Prayer reminder pass failed: {}", e),
                }
            })
        })?;

        let notifier = self.notifier.clone();
        let devotional_job = Job::new_async(self.schedules.devotional.as_str(), move |_uuid, _l| {
            let notifier = notifier.clone();
            Box::pin(async move {
                match notifier.run_devotional_pass().await {
                    Ok(summary) => log_pass_summary("devotional", &summary),
                    Err(e) => tracing::error!("Devotional pass failed: {}", e),
                }
            })
        })?;

        let notifier = self.notifier.clone();
        let friday_job = Job::new_async(self.schedules.friday.as_str(), move |_uuid, _l| {
            let notifier = notifier.clone();
            Box::pin(async move {
                match notifier.run_friday_pass(clock.now()).await {
                    Ok(summary) => log_pass_summary("friday", &summary),
                    Err(e) => tracing::error!("Friday blessing pass failed: {}", e),
                }
            })
        })?;

        self.scheduler.add(prayer_job).await?;
        self.scheduler.add(devotional_job).await?;
        self.scheduler.add(friday_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Reminder service started - {} mode, prayer check '{}', devotional '{}', friday '{}'",
            self.notifier.mode().name(),
            self.schedules.prayer,
            self.schedules.devotional,
            self.schedules.friday
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
