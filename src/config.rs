use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifierKind {
    Desktop,
    Log,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub source_url: String,
    pub listen_addr: SocketAddr,
    pub refresh_interval: Duration,
    pub prefetch_weeks: usize,
    pub export_dir: PathBuf,
    pub notifier: NotifierKind,
    pub fetch_timeout: Duration,
}

/// Upper bound for `SKEMA_PREFETCH_WEEKS`: one year ahead.
pub const MAX_PREFETCH_WEEKS: usize = 52;

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `new_from_env` reads the process
    /// environment (after `.env` has been loaded).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://skema.db?mode=rwc".to_string());
        let source_url = lookup("SKEMA_SOURCE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8787".to_string());
        let listen_addr = parse_var(
            &lookup,
            "SKEMA_LISTEN_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3000)),
        )?;
        let refresh_secs: u64 = parse_var(&lookup, "SKEMA_REFRESH_SECS", 300)?;
        let prefetch_weeks: usize = parse_var(&lookup, "SKEMA_PREFETCH_WEEKS", 2)?;
        let export_dir = lookup("SKEMA_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let notifier = match lookup("SKEMA_NOTIFIER").as_deref() {
            Some("log") => NotifierKind::Log,
            Some("desktop") | None => NotifierKind::Desktop,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SKEMA_NOTIFIER must be 'desktop' or 'log', got '{}'",
                    other
                )));
            }
        };
        let fetch_timeout_secs: u64 = parse_var(&lookup, "SKEMA_FETCH_TIMEOUT_SECS", 30)?;

        if refresh_secs == 0 {
            return Err(AppError::Config("SKEMA_REFRESH_SECS must be positive".to_string()));
        }
        if prefetch_weeks > MAX_PREFETCH_WEEKS {
            return Err(AppError::Config(format!(
                "SKEMA_PREFETCH_WEEKS must be at most {}, got {}",
                MAX_PREFETCH_WEEKS, prefetch_weeks
            )));
        }

        Ok(Self {
            database_url,
            source_url,
            listen_addr,
            refresh_interval: Duration::from_secs(refresh_secs),
            prefetch_weeks,
            export_dir,
            notifier,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}
