use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use teloxide::types::UserId;

use crate::coop::CoopSettings;

/// Connection details for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactsApiConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub bot_username: Option<String>,
    pub countries_path: String,
    pub facts_cache_path: String,
    pub http_port: u16,
    pub admin_ids: Vec<UserId>,
    pub bot_move_delay: Duration,
    pub round_pause: Duration,
    pub sprint_duration: Duration,
    pub max_rounds: usize,
    pub fact_refresh_cron: String,
    pub fact_max_age_hours: i64,
    pub facts_api: Option<FactsApiConfig>,
}

/// Reads a variable, treating unset and blank the same.
fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn string_or(name: &str, default: &str) -> String {
    non_empty(name).unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match non_empty(name) {
        Some(raw) => raw.trim().parse().map_err(|_| anyhow!("Invalid {}", name)),
        None => Ok(default),
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<UserId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map(UserId)
                .map_err(|_| anyhow!("Invalid ADMIN_IDS entry: {}", part))
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let bot_username = non_empty("BOT_USERNAME")
            .map(|name| name.trim().trim_start_matches('@').to_string());

        let http_port = parse_or("HTTP_PORT", 3000u16)?;
        let admin_ids = match non_empty("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => Vec::new(),
        };

        let max_rounds = parse_or("MAX_ROUNDS", 10usize)?;
        if max_rounds == 0 {
            return Err(anyhow!("MAX_ROUNDS must be at least 1"));
        }

        let fact_max_age_hours = parse_or("FACT_MAX_AGE_HOURS", 168i64)?;
        if fact_max_age_hours < 0 {
            return Err(anyhow!("FACT_MAX_AGE_HOURS must not be negative"));
        }

        let facts_api = match (non_empty("FACTS_API_URL"), non_empty("FACTS_API_KEY")) {
            (Some(url), Some(api_key)) => Some(FactsApiConfig {
                url,
                api_key,
                model: string_or("FACTS_MODEL", "gpt-4o-mini"),
            }),
            (Some(_), None) => return Err(anyhow!("FACTS_API_KEY must be set when FACTS_API_URL is")),
            _ => None,
        };

        Ok(Config {
            telegram_bot_token: token,
            bot_username,
            countries_path: string_or("COUNTRIES_PATH", "./data/countries.json"),
            facts_cache_path: string_or("FACTS_CACHE_PATH", "./data/facts.json"),
            http_port,
            admin_ids,
            bot_move_delay: Duration::from_millis(parse_or("BOT_MOVE_DELAY_MS", 1500u64)?),
            round_pause: Duration::from_millis(parse_or("ROUND_PAUSE_MS", 2000u64)?),
            sprint_duration: Duration::from_secs(parse_or("SPRINT_SECONDS", 60u64)?),
            max_rounds,
            fact_refresh_cron: string_or("FACT_REFRESH_CRON", "0 0 4 * * *"),
            fact_max_age_hours,
            facts_api,
        })
    }

    pub fn coop_settings(&self) -> CoopSettings {
        CoopSettings {
            bot_move_delay: self.bot_move_delay,
            round_pause: self.round_pause,
            max_rounds: self.max_rounds,
            bot_username: self.bot_username.clone(),
        }
    }

    pub fn fact_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.fact_max_age_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(
            parse_admin_ids("42, 7,,").unwrap(),
            vec![UserId(42), UserId(7)]
        );
        assert!(parse_admin_ids("42,abc").is_err());
    }
}
