//! Subscriber menu actions.

use crate::database::{connection::DatabaseManager, models::*};
use crate::messages;
use crate::services::prayer_times::PrayerMode;
use crate::services::timezone::CivilClock;
use crate::utils::datetime::{format_clock_12h, format_hour_12h};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    PrayerTimes,
    ShareLocation,
    ToggleReminder,
    Unsubscribe,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        MenuAction::PrayerTimes,
        MenuAction::ShareLocation,
        MenuAction::ToggleReminder,
        MenuAction::Unsubscribe,
    ];

    pub fn callback_data(&self) -> &'static str {
        match self {
            MenuAction::PrayerTimes => "menu:prayer_times",
            MenuAction::ShareLocation => "menu:share_location",
            MenuAction::ToggleReminder => "menu:toggle_reminder",
            MenuAction::Unsubscribe => "menu:unsubscribe",
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.callback_data() == data)
    }
}

/// Today's prayer times as shown to one subscriber.
pub async fn prayer_times_text(
    mode: &PrayerMode,
    clock: &CivilClock,
    location: Option<Coordinates>,
) -> String {
    let header = messages::prayer_times_header(clock.offset_hours());
    let lines: Vec<String> = match mode {
        PrayerMode::FixedTable(table) => table
            .hours()
            .map(|(event, hour)| format!("• {} ({}): {}", event.arabic_name(), event, format_hour_12h(hour)))
            .collect(),
        PrayerMode::LocationAware(source) => {
            let Some(location) = location else {
                return messages::LOCATION_MISSING.to_string();
            };
            match source.timings(location, clock.today()).await {
                Ok(timings) => timings
                    .iter()
                    .map(|(event, time)| format!("• {} ({}): {}", event.arabic_name(), event, format_clock_12h(time)))
                    .collect(),
                Err(e) => {
                    tracing::warn!("Prayer times lookup failed: {}", e);
                    return messages::PRAYER_ERROR.to_string();
                }
            }
        }
    };
    format!("{}\n\n{}", header, lines.join("\n"))
}

/// Flips the reminder flag and returns the confirmation to show.
pub async fn toggle_reminder_text(db: &DatabaseManager, user_id: i64) -> Result<String, sqlx::Error> {
    let text = match Subscriber::toggle_reminder(&db.pool, user_id).await? {
        Some(true) => messages::REMINDER_ENABLED,
        Some(false) => messages::REMINDER_DISABLED,
        None => messages::NOT_SUBSCRIBED,
    };
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prayer_times::FixedTable;

    #[test]
    fn test_callback_data_round_trip() {
        for action in MenuAction::ALL {
            assert_eq!(MenuAction::from_callback(action.callback_data()), Some(action));
        }
        assert_eq!(MenuAction::from_callback("admin:count"), None);
    }

    #[tokio::test]
    async fn test_fixed_table_listing() {
        let clock = CivilClock::from_hours(3).unwrap();
        let text = prayer_times_text(&PrayerMode::FixedTable(FixedTable::default()), &clock, None).await;
        assert!(text.contains("UTC+3"));
        assert!(text.contains("Fajr): 5 AM"));
        assert!(text.contains("Isha): 8 PM"));
    }
}
