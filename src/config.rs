use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::services::simulator::DEFAULT_TICK_PERIOD;

/// Token-bucket settings for the login route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoginRateLimit {
    /// Seconds needed to replenish one attempt.
    pub per_second: u64,
    /// Attempts allowed in a burst.
    pub burst: u32,
}

impl Default for LoginRateLimit {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst: 5,
        }
    }
}

/// Resolves the login throttle from optional overrides.
///
/// A zero rate or burst disables throttling.
fn resolve_login_rate_limit(
    per_second: Option<String>,
    burst: Option<String>,
    defaults: LoginRateLimit,
) -> Result<Option<LoginRateLimit>> {
    let per_second = match per_second {
        Some(value) => value.parse().context("Invalid LOGIN_RATE_PER_SECOND")?,
        None => defaults.per_second,
    };
    let burst = match burst {
        Some(value) => value.parse().context("Invalid LOGIN_RATE_BURST")?,
        None => defaults.burst,
    };

    Ok((burst > 0 && per_second > 0).then_some(LoginRateLimit { per_second, burst }))
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the Redis server. `None` keeps client storage in memory.
    pub redis_url: Option<String>,
    /// Period between live stats ticks.
    pub stats_tick: Duration,
    /// Fixed seed for the stats random source.
    pub stats_random_seed: Option<u64>,
    /// Lifetime of the client identity cookie in days.
    pub client_cookie_days: i64,
    /// Login throttling. `None` disables it.
    pub login_rate_limit: Option<LoginRateLimit>,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Whether cookies are marked `Secure`.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            redis_url: None,
            stats_tick: DEFAULT_TICK_PERIOD,
            stats_random_seed: None,
            client_cookie_days: 365,
            login_rate_limit: Some(LoginRateLimit::default()),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://[::1]:3000".to_string(),
            ],
            production: false,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// Unset variables fall back to [`Config::default`].
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match optional_var("BIND_ADDR") {
            Some(addr) => addr.parse().context("Invalid BIND_ADDR")?,
            None => defaults.bind_addr,
        };

        let stats_tick = match optional_var("STATS_TICK_SECONDS") {
            Some(secs) => {
                let secs: u64 = secs.parse().context("Invalid STATS_TICK_SECONDS")?;
                if secs == 0 {
                    anyhow::bail!("STATS_TICK_SECONDS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => defaults.stats_tick,
        };

        let stats_random_seed = optional_var("STATS_RANDOM_SEED")
            .map(|seed| seed.parse().context("Invalid STATS_RANDOM_SEED"))
            .transpose()?;

        let client_cookie_days = optional_var("CLIENT_COOKIE_DAYS")
            .unwrap_or_else(|| defaults.client_cookie_days.to_string())
            .parse()
            .context("Invalid CLIENT_COOKIE_DAYS")?;

        let login_rate_limit = resolve_login_rate_limit(
            optional_var("LOGIN_RATE_PER_SECOND"),
            optional_var("LOGIN_RATE_BURST"),
            defaults.login_rate_limit.unwrap_or_default(),
        )?;

        let cors_origins = match optional_var("CORS_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string()) == "production";

        Ok(Self {
            bind_addr,
            redis_url: optional_var("REDIS_URL"),
            stats_tick,
            stats_random_seed,
            client_cookie_days,
            login_rate_limit,
            cors_origins,
            production,
        })
    }
}
