use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::database::models::Coordinates;

/// The five daily prayers, in the order they fall during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, Deserialize)]
pub enum PrayerEvent {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerEvent {
    pub const ALL: [PrayerEvent; 5] = [
        PrayerEvent::Fajr,
        PrayerEvent::Dhuhr,
        PrayerEvent::Asr,
        PrayerEvent::Maghrib,
        PrayerEvent::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerEvent::Fajr => "Fajr",
            PrayerEvent::Dhuhr => "Dhuhr",
            PrayerEvent::Asr => "Asr",
            PrayerEvent::Maghrib => "Maghrib",
            PrayerEvent::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            PrayerEvent::Fajr => "الفجر",
            PrayerEvent::Dhuhr => "الظهر",
            PrayerEvent::Asr => "العصر",
            PrayerEvent::Maghrib => "المغرب",
            PrayerEvent::Isha => "العشاء",
        }
    }
}

impl fmt::Display for PrayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        PrayerEvent::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown prayer '{}'", s))
    }
}

/// Clock time of each prayer for one day at one place.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTimings {
    times: BTreeMap<PrayerEvent, NaiveTime>,
}

impl DailyTimings {
    pub fn new(times: BTreeMap<PrayerEvent, NaiveTime>) -> Self {
        Self { times }
    }

    pub fn get(&self, event: PrayerEvent) -> Option<NaiveTime> {
        self.times.get(&event).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerEvent, NaiveTime)> + '_ {
        self.times.iter().map(|(event, time)| (*event, *time))
    }

    /// Prayers whose hour and minute equal those of `now`.
    pub fn due_at(&self, now: NaiveTime) -> Vec<(PrayerEvent, NaiveTime)> {
        self.iter()
            .filter(|(_, time)| time.hour() == now.hour() && time.minute() == now.minute())
            .collect()
    }
}

/// Static hour-of-day per prayer, used when reminders do not depend on location.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTable {
    hours: BTreeMap<PrayerEvent, u32>,
}

impl FixedTable {
    pub fn new(hours: BTreeMap<PrayerEvent, u32>) -> Self {
        Self { hours }
    }

    pub fn hours(&self) -> impl Iterator<Item = (PrayerEvent, u32)> + '_ {
        self.hours.iter().map(|(event, hour)| (*event, *hour))
    }

    pub fn events_at_hour(&self, hour: u32) -> Vec<PrayerEvent> {
        self.hours()
            .filter(|(_, h)| *h == hour)
            .map(|(event, _)| event)
            .collect()
    }
}

impl Default for FixedTable {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (PrayerEvent::Fajr, 5),
            (PrayerEvent::Dhuhr, 12),
            (PrayerEvent::Asr, 15),
            (PrayerEvent::Maghrib, 18),
            (PrayerEvent::Isha, 20),
        ]))
    }
}

/// Computes a day's prayer times for a location.
#[async_trait]
pub trait PrayerTimeSource: Send + Sync {
    async fn timings(&self, location: Coordinates, date: NaiveDate) -> Result<DailyTimings>;
}

/// How today's prayer times are resolved. Exactly one mode is active.
#[derive(Clone)]
pub enum PrayerMode {
    /// Same static hours for everyone.
    FixedTable(FixedTable),
    /// Per-subscriber times computed from the stored location.
    LocationAware(Arc<dyn PrayerTimeSource>),
}

impl PrayerMode {
    pub fn name(&self) -> &'static str {
        match self {
            PrayerMode::FixedTable(_) => "fixed",
            PrayerMode::LocationAware(_) => "location",
        }
    }
}

/// Prayer times from the Aladhan HTTP API.
pub struct AladhanClient {
    http: reqwest::Client,
    base_url: String,
    method: u8,
}

#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    code: u16,
    data: Option<TimingsData>,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>, method: u8) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            method,
        }
    }

    fn timings_url(&self, date: NaiveDate) -> String {
        format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y"))
    }
}

#[async_trait]
impl PrayerTimeSource for AladhanClient {
    async fn timings(&self, location: Coordinates, date: NaiveDate) -> Result<DailyTimings> {
        let response = self
            .http
            .get(self.timings_url(date))
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("method", self.method.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Prayer time lookup failed with HTTP {}", status));
        }

        let envelope: TimingsEnvelope = response.json().await?;
        if envelope.code != 200 {
            return Err(anyhow!("Prayer time lookup returned code {}", envelope.code));
        }

        let data = envelope
            .data
            .ok_or_else(|| anyhow!("Prayer time lookup returned no data"))?;
        parse_timings(&data.timings)
    }
}

/// Reads the five prayers out of a name -> "HH:MM" map.
/// Extra entries (Sunrise, Imsak, ...) are ignored, a trailing zone tag like `" (EET)"` is dropped.
pub fn parse_timings(raw: &HashMap<String, String>) -> Result<DailyTimings> {
    let mut times = BTreeMap::new();
    for event in PrayerEvent::ALL {
        let value = raw
            .get(event.as_str())
            .ok_or_else(|| anyhow!("Missing time for {}", event))?;
        let clock = value.split_whitespace().next().unwrap_or_default();
        let time = NaiveTime::parse_from_str(clock, "%H:%M")
            .with_context(|| format!("Invalid time '{}' for {}", value, event))?;
        times.insert(event, time);
    }
    Ok(DailyTimings::new(times))
}

/// Today's timings per location, so frequent passes do not refetch them.
/// Entries from any other day are dropped on first access of a new day.
#[derive(Debug, Default)]
pub struct TimingsCache {
    day: Option<NaiveDate>,
    entries: HashMap<(u64, u64), DailyTimings>,
}

impl TimingsCache {
    fn key(location: Coordinates) -> (u64, u64) {
        (location.latitude.to_bits(), location.longitude.to_bits())
    }

    fn roll_to(&mut self, day: NaiveDate) {
        if self.day != Some(day) {
            self.day = Some(day);
            self.entries.clear();
        }
    }

    pub fn get(&mut self, day: NaiveDate, location: Coordinates) -> Option<DailyTimings> {
        self.roll_to(day);
        self.entries.get(&Self::key(location)).cloned()
    }

    pub fn insert(&mut self, day: NaiveDate, location: Coordinates, timings: DailyTimings) {
        self.roll_to(day);
        self.entries.insert(Self::key(location), timings);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
