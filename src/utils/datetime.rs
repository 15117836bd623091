use chrono::{NaiveTime, Timelike};

/// "5:12 AM", "12:00 PM", "8:05 PM"
pub fn format_clock_12h(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    format!("{}:{:02} {}", hour, time.minute(), if is_pm { "PM" } else { "AM" })
}

/// Whole hour of the fixed table, e.g. "5 AM" or "12 PM".
pub fn format_hour_12h(hour: u32) -> String {
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", display, if hour % 24 < 12 { "AM" } else { "PM" })
}
