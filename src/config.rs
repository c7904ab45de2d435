use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEV_JWT_SECRET: &str = "esgconnect-development-secret";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_hours: i64,
    pub rate_limit: Option<RateLimit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub burst: u32,
    pub period: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let rate_limit = match env::var("RATE_LIMIT_BURST") {
            Ok(burst) => Some(RateLimit {
                burst: burst
                    .parse()
                    .with_context(|| format!("RATE_LIMIT_BURST is not a number: {}", burst))?,
                period: Duration::from_secs(parse_var("RATE_LIMIT_PERIOD_SECS", 60)?),
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./esgconnect.sqlite?mode=rwc".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string()),
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "esgconnect".to_string()),
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 24)?,
            rate_limit,
        })
    }

    /// Settings for tests and local tooling: in-memory database, no rate limit.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test_secret_key".to_string(),
            jwt_issuer: "esgconnect-test".to_string(),
            token_ttl_hours: 1,
            rate_limit: None,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(default),
    }
}
