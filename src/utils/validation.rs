use anyhow::{anyhow, Result};

use crate::constants::{names, ROUND_CHOICES};

/// Trims and checks a display name submitted during match setup.
pub fn validate_display_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Display name cannot be empty"));
    }

    let length = name.chars().count();
    if length < names::MIN_LENGTH || length > names::MAX_LENGTH {
        return Err(anyhow!(
            "Display name must be between {} and {} characters",
            names::MIN_LENGTH,
            names::MAX_LENGTH
        ));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Display name cannot contain line breaks"));
    }

    if name.starts_with('/') {
        return Err(anyhow!("Display name cannot look like a command"));
    }

    Ok(name.to_string())
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Supergroups go down to roughly -10^12; anything beyond is garbage
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}

pub fn validate_session_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(anyhow!("Session token cannot be empty"));
    }

    if token.len() < 6 || token.len() > 16 {
        return Err(anyhow!("Session token must be 6-16 characters long"));
    }

    // Tokens are lowercase hex slices of a uuid
    if !token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
        return Err(anyhow!("Session token can only contain lowercase hex digits"));
    }

    Ok(())
}

pub fn validate_round_count(rounds: usize, max_rounds: usize) -> Result<()> {
    if !ROUND_CHOICES.contains(&rounds) {
        return Err(anyhow!("Round count must be one of {:?}", ROUND_CHOICES));
    }

    if rounds > max_rounds {
        return Err(anyhow!("Round count cannot exceed {}", max_rounds));
    }

    Ok(())
}

/// Trims a command argument naming a region or country.
pub fn validate_region_argument(arg: &str) -> Result<String> {
    let arg = arg.trim();
    if arg.chars().count() > 64 {
        return Err(anyhow!("Argument is too long"));
    }
    if arg.contains('\n') {
        return Err(anyhow!("Argument cannot contain line breaks"));
    }
    Ok(arg.to_string())
}
