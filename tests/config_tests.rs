use capitals_quiz_bot::config::Config;
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use teloxide::types::UserId;

// Config tests share process environment and must not interleave
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const OPTIONAL_VARS: [&str; 14] = [
    "BOT_USERNAME",
    "COUNTRIES_PATH",
    "FACTS_CACHE_PATH",
    "HTTP_PORT",
    "ADMIN_IDS",
    "BOT_MOVE_DELAY_MS",
    "ROUND_PAUSE_MS",
    "SPRINT_SECONDS",
    "MAX_ROUNDS",
    "FACT_REFRESH_CRON",
    "FACT_MAX_AGE_HOURS",
    "FACTS_API_URL",
    "FACTS_API_KEY",
    "FACTS_MODEL",
];

fn clear_env() {
    env::remove_var("TELEGRAM_BOT_TOKEN");
    for var in OPTIONAL_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("BOT_USERNAME", "@capitals_bot");
    env::set_var("COUNTRIES_PATH", "/srv/countries.json");
    env::set_var("FACTS_CACHE_PATH", "/srv/facts.json");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("ADMIN_IDS", "11, 22");
    env::set_var("BOT_MOVE_DELAY_MS", "10");
    env::set_var("ROUND_PAUSE_MS", "20");
    env::set_var("SPRINT_SECONDS", "30");
    env::set_var("MAX_ROUNDS", "5");
    env::set_var("FACT_REFRESH_CRON", "0 30 3 * * *");
    env::set_var("FACT_MAX_AGE_HOURS", "24");
    env::set_var("FACTS_API_URL", "https://llm.example/v1/chat/completions");
    env::set_var("FACTS_API_KEY", "secret");
    env::set_var("FACTS_MODEL", "tiny");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.bot_username.as_deref(), Some("capitals_bot"));
    assert_eq!(config.countries_path, "/srv/countries.json");
    assert_eq!(config.facts_cache_path, "/srv/facts.json");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.admin_ids, vec![UserId(11), UserId(22)]);
    assert_eq!(config.bot_move_delay, Duration::from_millis(10));
    assert_eq!(config.round_pause, Duration::from_millis(20));
    assert_eq!(config.sprint_duration, Duration::from_secs(30));
    assert_eq!(config.max_rounds, 5);
    assert_eq!(config.fact_refresh_cron, "0 30 3 * * *");
    assert_eq!(config.fact_max_age(), chrono::Duration::hours(24));
    let api = config.facts_api.clone().unwrap();
    assert_eq!(api.model, "tiny");

    let settings = config.coop_settings();
    assert_eq!(settings.max_rounds, 5);
    assert_eq!(settings.bot_username.as_deref(), Some("capitals_bot"));

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.bot_username, None);
    assert_eq!(config.countries_path, "./data/countries.json");
    assert_eq!(config.facts_cache_path, "./data/facts.json");
    assert_eq!(config.http_port, 3000);
    assert!(config.admin_ids.is_empty());
    assert_eq!(config.bot_move_delay, Duration::from_millis(1500));
    assert_eq!(config.round_pause, Duration::from_millis(2000));
    assert_eq!(config.sprint_duration, Duration::from_secs(60));
    assert_eq!(config.max_rounds, 10);
    assert_eq!(config.fact_refresh_cron, "0 0 4 * * *");
    assert_eq!(config.fact_max_age_hours, 168);
    assert!(config.facts_api.is_none());

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_invalid_numbers() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    env::set_var("HTTP_PORT", "invalid_port");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid HTTP_PORT"));
    env::remove_var("HTTP_PORT");

    env::set_var("BOT_MOVE_DELAY_MS", "-5");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid BOT_MOVE_DELAY_MS"));
    env::remove_var("BOT_MOVE_DELAY_MS");

    env::set_var("MAX_ROUNDS", "0");
    assert!(Config::from_env().is_err());
    env::remove_var("MAX_ROUNDS");

    env::set_var("ADMIN_IDS", "12,admin");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("ADMIN_IDS"));

    clear_env();
}

#[test]
fn test_config_empty_and_whitespace_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "");
    assert!(Config::from_env().is_err());

    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("COUNTRIES_PATH", "");
    env::set_var("HTTP_PORT", "  3001  ");
    let config = Config::from_env().unwrap();
    assert_eq!(config.countries_path, "./data/countries.json");
    assert_eq!(config.http_port, 3001);

    clear_env();
}

#[test]
fn test_facts_api_needs_key() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("FACTS_API_URL", "https://llm.example/v1/chat/completions");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("FACTS_API_KEY"));

    clear_env();
}
