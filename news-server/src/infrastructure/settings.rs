use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use super::logging::LogFormat;

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    #[serde(skip)]
    pub database_url: String,
    pub service_name: String,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    #[serde(skip)]
    pub log_format: LogFormat,
    pub post_table_name: String,
    pub default_post_limit: u32,
    pub max_post_limit: u32,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub run_migrations: bool,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub http_shutdown_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL")
            .or_else(|_| get_required("POSTGRES_DSN"))
            .context("DATABASE_URL (or POSTGRES_DSN) is required")?;

        let service_name = std::env::var("SERVICE_NAME").unwrap_or_else(|_| "news-svc".to_string());
        let http_addr = lookup_env(&["HTTP_ADDR", "HTTP_LISTEN"])
            .map(|(_, raw)| normalize_listen_addr(&raw))
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origins =
            parse_cors_origins(std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let log_format =
            LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()))?;

        let post_table_name =
            std::env::var("POST_TABLE_NAME").unwrap_or_else(|_| "post".to_string());
        validate_table_name(&post_table_name)?;

        let default_post_limit =
            parse_positive_env(&["DEFAULT_POST_LIMIT", "DEFAULT_NEWS_LIMIT"], 100)?;
        let max_post_limit = parse_positive_env(&["MAX_POST_LIMIT"], 1000)?;
        if default_post_limit > max_post_limit {
            return Err(anyhow!("DEFAULT_POST_LIMIT must be <= MAX_POST_LIMIT"));
        }

        let db_max_connections = parse_positive_env(&["DB_MAX_CONNECTIONS"], 10)?;
        let db_acquire_timeout_secs = parse_positive_env(&["DB_ACQUIRE_TIMEOUT_SECS"], 5)?;
        let run_migrations = parse_bool_env("RUN_MIGRATIONS", true)?;
        check_migration_target(run_migrations, &post_table_name)?;
        let http_request_body_limit_bytes =
            parse_positive_env(&["HTTP_REQUEST_BODY_LIMIT_BYTES"], 1024 * 1024)?;
        let http_concurrency_limit = parse_positive_env(&["HTTP_CONCURRENCY_LIMIT"], 256)?;
        let http_request_timeout_secs = parse_positive_env(&["HTTP_REQUEST_TIMEOUT_SECS"], 5)?;
        let http_shutdown_timeout_secs = match lookup_env(&["HTTP_SHUTDOWN_TIMEOUT_SECS"]) {
            Some(_) => parse_positive_env(&["HTTP_SHUTDOWN_TIMEOUT_SECS"], 5)?,
            None => match std::env::var("HTTP_SHUTDOWN_TIMEOUT") {
                Ok(raw) => parse_duration_secs(&raw)
                    .with_context(|| format!("Failed to parse HTTP_SHUTDOWN_TIMEOUT={raw:?}"))?,
                Err(_) => 5,
            },
        };

        Ok(Self {
            database_url,
            service_name,
            http_addr,
            cors_origins,
            log_level,
            log_format,
            post_table_name,
            default_post_limit,
            max_post_limit,
            db_max_connections,
            db_acquire_timeout_secs,
            run_migrations,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            http_shutdown_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Table names are spliced into SQL text, so only plain identifiers are accepted.
fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > 63 {
        return Err(anyhow!(
            "POST_TABLE_NAME must be a plain SQL identifier (letters, digits, '_'), got {name:?}"
        ));
    }
    Ok(())
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw).with_context(|| format!("Failed to parse {key}, expecting bool")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid bool value: {other}")),
    }
}

/// Table created by the embedded migrations.
const MIGRATED_POST_TABLE: &str = "post";

/// Embedded migrations only create the default table, so they cannot serve a custom name.
fn check_migration_target(run_migrations: bool, table_name: &str) -> Result<()> {
    if run_migrations && table_name != MIGRATED_POST_TABLE {
        return Err(anyhow!(
            "RUN_MIGRATIONS creates table {MIGRATED_POST_TABLE:?} but POST_TABLE_NAME is \
             {table_name:?}; set RUN_MIGRATIONS=false and provision that table yourself"
        ));
    }
    Ok(())
}

/// First key in `keys` that is set, with its value.
fn lookup_env<'a>(keys: &[&'a str]) -> Option<(&'a str, String)> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().map(|value| (*key, value)))
}

/// Accepts a full `host:port` or a bare port (`8080`, `:8080`), which binds all interfaces.
fn normalize_listen_addr(raw: &str) -> String {
    let raw = raw.trim();
    let port = raw.strip_prefix(':').unwrap_or(raw);
    if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
        return format!("0.0.0.0:{port}");
    }
    raw.to_string()
}

/// Whole seconds or minutes: `5`, `5s`, `2m`.
fn parse_duration_secs(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let (digits, scale) = if let Some(minutes) = raw.strip_suffix('m') {
        (minutes, 60)
    } else if let Some(seconds) = raw.strip_suffix('s') {
        (seconds, 1)
    } else {
        (raw, 1)
    };

    let value = digits
        .parse::<u64>()
        .map_err(|_| anyhow!("expected whole seconds or minutes like 5s or 2m, got {raw:?}"))?
        .checked_mul(scale)
        .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;

    if value == 0 {
        return Err(anyhow!("duration must be > 0"));
    }
    Ok(value)
}

/// Reads a strictly positive number from the first key that is set, falling back to `default`.
fn parse_positive_env<T>(keys: &[&str], default: T) -> Result<T>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let (key, value) = match lookup_env(keys) {
        Some((key, raw)) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a positive integer, got {raw:?}"))?;
            (key, value)
        }
        None => (keys.first().copied().unwrap_or("value"), default),
    };

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
