use anyhow::{anyhow, Result};

/// Telegram messages are capped at 4096 characters; lists are cut below that.
pub const MAX_LIST_CHARS: usize = 4000;

/// Parses an admin-supplied Telegram user id.
pub fn parse_user_id(input: &str) -> Result<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(anyhow!("User ID cannot be empty"));
    }

    let id: i64 = input
        .parse()
        .map_err(|_| anyhow!("User ID must be a whole number"))?;

    validate_telegram_user_id(id)?;
    Ok(id)
}

pub fn validate_telegram_user_id(user_id: i64) -> Result<()> {
    if user_id <= 0 {
        return Err(anyhow!("User ID must be positive"));
    }

    // Telegram user ids fit in 52 bits
    if user_id > (1i64 << 52) {
        return Err(anyhow!("User ID out of valid range"));
    }

    Ok(())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(anyhow!("Coordinates must be finite numbers"));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(anyhow!("Latitude must be between -90 and 90"));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!("Longitude must be between -180 and 180"));
    }

    Ok(())
}

pub fn validate_broadcast_text(text: &str) -> Result<()> {
    let text = text.trim();

    if text.is_empty() {
        return Err(anyhow!("Broadcast text cannot be empty"));
    }

    if text.chars().count() > 4096 {
        return Err(anyhow!("Broadcast text cannot be longer than 4096 characters"));
    }

    Ok(())
}

/// Cuts `text` to at most `max_chars` characters without splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("مرحبا", 3), "مرح");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}
