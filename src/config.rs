// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::session::SessionSettings;

/// Tickets older than this can no longer be redeemed.
pub const DEFAULT_TICKET_TTL_SECS: u64 = 5 * 60;

/// Maximum number of tickets kept in the pending-sessions slot.
pub const DEFAULT_TICKET_RETENTION: usize = 20;

/// Number of questions in one quiz attempt.
pub const DEFAULT_QUESTIONS_PER_QUIZ: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub ticket_ttl_secs: u64,
    pub ticket_retention: usize,
    pub questions_per_quiz: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quizgate.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            database_url,
            rust_log,
            bind_addr,
            ticket_ttl_secs: parse_var("TICKET_TTL_SECS", DEFAULT_TICKET_TTL_SECS),
            ticket_retention: parse_var("TICKET_RETENTION", DEFAULT_TICKET_RETENTION),
            questions_per_quiz: parse_var("QUESTIONS_PER_QUIZ", DEFAULT_QUESTIONS_PER_QUIZ),
        }
    }

    /// Settings consumed by the session-ticket core.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            ticket_ttl: Duration::from_secs(self.ticket_ttl_secs),
            retention: self.ticket_retention,
            questions_per_quiz: self.questions_per_quiz,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            rust_log: "info".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            ticket_ttl_secs: DEFAULT_TICKET_TTL_SECS,
            ticket_retention: DEFAULT_TICKET_RETENTION,
            questions_per_quiz: DEFAULT_QUESTIONS_PER_QUIZ,
        }
    }
}

/// Reads a numeric variable, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_settings() {
        let settings = Config::default().session_settings();
        assert_eq!(settings.ticket_ttl, Duration::from_secs(300));
        assert_eq!(settings.retention, 20);
        assert_eq!(settings.questions_per_quiz, 10);
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        // SAFETY: only this test touches this variable name.
        unsafe { env::set_var("QUIZGATE_TEST_BAD_NUMBER", "ten") };
        assert_eq!(parse_var("QUIZGATE_TEST_BAD_NUMBER", 7u64), 7);
        unsafe { env::remove_var("QUIZGATE_TEST_BAD_NUMBER") };
        assert_eq!(parse_var("QUIZGATE_TEST_BAD_NUMBER", 7u64), 7);
    }
}
