use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Signing secret used when `JWT_SECRET` is unset. Never acceptable outside development.
pub const DEFAULT_JWT_SECRET: &str = "default-secret-key-change-in-production";
pub const DEFAULT_JWT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Upper bound for `JWT_EXPIRATION`.
pub const MAX_JWT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub jwt: JwtConfig,
    pub hasher: HasherConfig,
    pub cookie_secure: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => anyhow::bail!("unknown APP_ENV {other:?}"),
        };

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let ttl = match var("JWT_EXPIRATION") {
            Some(raw) => parse_duration(&raw)
                .with_context(|| format!("invalid JWT_EXPIRATION {raw:?}"))?,
            None => DEFAULT_JWT_TTL,
        };
        let jwt = JwtConfig {
            secret: var("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.into()),
            ttl,
        };
        if jwt.uses_default_secret() && environment == Environment::Production {
            anyhow::bail!("JWT_SECRET must be set when APP_ENV=production");
        }

        let defaults = HasherConfig::default();
        let hasher = HasherConfig {
            memory_kib: parse_or(var("ARGON2_MEMORY_KIB"), defaults.memory_kib)?,
            iterations: parse_or(var("ARGON2_ITERATIONS"), defaults.iterations)?,
            parallelism: parse_or(var("ARGON2_PARALLELISM"), defaults.parallelism)?,
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            environment,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(var("APP_PORT"), 8080)?,
            database_url,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or(var("DB_ACQUIRE_TIMEOUT_SECS"), 5)?),
            jwt,
            hasher,
            cookie_secure: parse_or(var("COOKIE_SECURE"), true)?,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("cannot parse {v:?}: {e}")),
        None => Ok(default),
    }
}

/// Parses `24h`, `90m`, `1h30m`, `3600s`; a bare integer is read as hours.
/// Values above [`MAX_JWT_TTL`] are rejected.
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let too_long = || anyhow::anyhow!("duration {raw:?} is too long");

    let total = if let Ok(hours) = raw.parse::<u64>() {
        hours.checked_mul(3600).ok_or_else(too_long)?
    } else {
        let mut total = 0u64;
        let mut digits = String::new();
        for ch in raw.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            let unit = match ch {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => anyhow::bail!("unknown duration unit {ch:?}"),
            };
            let n: u64 = digits.parse().context("missing number before unit")?;
            total = n
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(too_long)?;
            digits.clear();
        }
        anyhow::ensure!(digits.is_empty(), "trailing number without unit");
        total
    };

    anyhow::ensure!(total > 0, "duration must be positive");
    let ttl = Duration::from_secs(total);
    if ttl > MAX_JWT_TTL {
        return Err(too_long());
    }
    Ok(ttl)
}
