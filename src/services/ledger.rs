use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::services::prayer_times::PrayerEvent;

/// Which prayer notifications went out on the current civil day.
///
/// Only one day is ever held: recording or querying a later day discards
/// everything from the earlier one. A (day, subscriber, prayer) triple is
/// recorded at most once.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    day: Option<NaiveDate>,
    sent: HashMap<i64, HashSet<PrayerEvent>>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the ledger for `day` from persisted rows.
    pub fn restore(day: NaiveDate, entries: impl IntoIterator<Item = (i64, PrayerEvent)>) -> Self {
        let mut ledger = Self::new();
        for (user_id, event) in entries {
            ledger.record(day, user_id, event);
        }
        ledger
    }

    pub fn current_day(&self) -> Option<NaiveDate> {
        self.day
    }

    /// Moves the ledger to `day` if it is newer. Returns true when prior entries were dropped.
    pub fn roll_to(&mut self, day: NaiveDate) -> bool {
        match self.day {
            Some(current) if current >= day => false,
            Some(_) => {
                self.day = Some(day);
                self.sent.clear();
                true
            }
            None => {
                self.day = Some(day);
                false
            }
        }
    }

    pub fn contains(&self, day: NaiveDate, user_id: i64, event: PrayerEvent) -> bool {
        self.day == Some(day)
            && self
                .sent
                .get(&user_id)
                .is_some_and(|events| events.contains(&event))
    }

    /// Records a send. Returns false when the triple was already present,
    /// or when `day` is older than the ledger's day.
    pub fn record(&mut self, day: NaiveDate, user_id: i64, event: PrayerEvent) -> bool {
        self.roll_to(day);
        if self.day != Some(day) {
            return false;
        }
        self.sent.entry(user_id).or_default().insert(event)
    }

    /// Prayers recorded for a subscriber on `day`, in daily order.
    pub fn sent_on(&self, day: NaiveDate, user_id: i64) -> Vec<PrayerEvent> {
        if self.day != Some(day) {
            return Vec::new();
        }
        let mut events: Vec<PrayerEvent> = self
            .sent
            .get(&user_id)
            .map(|events| events.iter().copied().collect())
            .unwrap_or_default();
        events.sort();
        events
    }

    /// Number of recorded triples.
    pub fn len(&self) -> usize {
        self.sent.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
