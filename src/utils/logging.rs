use tracing::{debug, error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        None => info!(
            "CMD_START: {} by {}({}) in chat {}",
            command, user, user_id, chat_id
        ),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_SUCCESS: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        None => info!(
            "CMD_SUCCESS: {} by {}({}) in chat {}",
            command, user, user_id, chat_id
        ),
    }
}

/// Logs a rejected action; these are user mistakes, not faults
pub fn log_command_rejected(command: &str, user: &str, user_id: u64, chat_id: i64, reason: &str) {
    warn!(
        "CMD_REJECTED: {} by {}({}) in chat {} - {}",
        command, user, user_id, chat_id, reason
    );
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user: &str, user_id: u64, chat_id: i64, error: &str) {
    error!(
        "CMD_ERROR: {} by {}({}) in chat {} - {}",
        command, user, user_id, chat_id, error
    );
}

/// Logs validation errors with consistent format
pub fn log_validation_error(source: &str, field: &str, value: &str, error: &str, user_id: u64) {
    warn!(
        "VALIDATION_ERROR: {} - {} field '{}' invalid: {} - user {}",
        source, field, value, error, user_id
    );
}

/// Logs cooperative session lifecycle events
pub fn log_session_event(session_id: &str, chat_id: i64, event: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("SESSION: {} in chat {} {} - {}", session_id, chat_id, event, d),
        None => debug!("SESSION: {} in chat {} {}", session_id, chat_id, event),
    }
}

/// Logs a failed outbound send/edit; delivery failures never stop a game
pub fn log_delivery_error(operation: &str, chat_id: i64, error: &str) {
    error!("DELIVERY_ERROR: {} to chat {} failed: {}", operation, chat_id, error);
}

/// Logs scheduled actions that fired after their session was gone
pub fn log_stale_schedule(action: &str, details: &str) {
    debug!("SCHEDULE_STALE: {} - {}", action, details);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
