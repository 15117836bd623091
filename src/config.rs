use anyhow::{anyhow, Result};
use std::env;

/// Which prayer time strategy the bot runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrayerModeSetting {
    Fixed,
    Location,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub owner_id: i64,
    pub database_url: String,
    pub http_port: u16,
    pub verses_path: String,
    pub supplications_path: String,
    pub prayer_mode: PrayerModeSetting,
    pub prayer_api_url: String,
    pub prayer_method: u8,
    pub utc_offset_hours: i32,
    pub friday_blessing_hour: u32,
}

fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let owner_id = env::var("OWNER_ID")
            .map_err(|_| anyhow!("OWNER_ID must be set"))?
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("Invalid OWNER_ID"))?;

        let database_url = var_or("DATABASE_URL", "sqlite:./data/sadqa.db");

        let http_port = var_or("HTTP_PORT", "3000")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let verses_path = var_or("VERSES_PATH", "content/verses.txt");
        let supplications_path = var_or("SUPPLICATIONS_PATH", "content/supplications.txt");

        let prayer_mode = match var_or("PRAYER_MODE", "fixed").trim().to_lowercase().as_str() {
            "fixed" => PrayerModeSetting::Fixed,
            "location" => PrayerModeSetting::Location,
            other => return Err(anyhow!("Invalid PRAYER_MODE '{}', expected 'fixed' or 'location'", other)),
        };

        let prayer_api_url = var_or("PRAYER_API_URL", "https://api.aladhan.com/v1");

        let prayer_method = var_or("PRAYER_METHOD", "5")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid PRAYER_METHOD"))?;

        let utc_offset_hours: i32 = var_or("UTC_OFFSET_HOURS", "3")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid UTC_OFFSET_HOURS"))?;
        if !(-12..=14).contains(&utc_offset_hours) {
            return Err(anyhow!("Invalid UTC_OFFSET_HOURS"));
        }

        let friday_blessing_hour: u32 = var_or("FRIDAY_BLESSING_HOUR", "12")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid FRIDAY_BLESSING_HOUR"))?;
        if friday_blessing_hour > 23 {
            return Err(anyhow!("Invalid FRIDAY_BLESSING_HOUR"));
        }

        Ok(Config {
            telegram_bot_token: token,
            owner_id,
            database_url,
            http_port,
            verses_path,
            supplications_path,
            prayer_mode,
            prayer_api_url,
            prayer_method,
            utc_offset_hours,
            friday_blessing_hour,
        })
    }
}
