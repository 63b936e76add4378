use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use pricewatch_core::constants::{
    DEFAULT_CACHE_HIT_WINDOW, DEFAULT_CACHE_TTL, DEFAULT_MAX_CACHED_ASSETS, DEFAULT_POLL_INTERVAL,
    DEFAULT_RETENTION,
};
use pricewatch_core::CacheSettings;
use pricewatch_market_data::provider::kraken::DEFAULT_BASE_URL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub cache: CacheSettings,
    pub kraken_api_url: String,
}

impl Config {
    /// Reads the configuration from `PW_*` environment variables, loading a
    /// `.env` file first if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Unset variables take their defaults; set but malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = parse_var(&lookup, "PW_LISTEN_ADDR", "0.0.0.0:8080".parse()?)?;
        let db_path = lookup("PW_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = lookup("PW_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var(&lookup, "PW_REQUEST_TIMEOUT_MS", 30_000)?;

        let poll_secs: u64 = parse_var(
            &lookup,
            "PW_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL.as_secs(),
        )?;
        if poll_secs == 0 {
            bail!("PW_POLL_INTERVAL_SECS must be greater than zero");
        }

        let ttl_secs: u64 = parse_var(&lookup, "PW_CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())?;
        let retention_secs: u64 = parse_var(
            &lookup,
            "PW_CACHE_RETENTION_SECS",
            DEFAULT_RETENTION.as_secs(),
        )?;
        let max_assets: usize =
            parse_var(&lookup, "PW_CACHE_MAX_ASSETS", DEFAULT_MAX_CACHED_ASSETS)?;
        if max_assets == 0 {
            bail!("PW_CACHE_MAX_ASSETS must be at least 1");
        }
        let hit_window_secs: u64 = parse_var(
            &lookup,
            "PW_CACHE_HIT_WINDOW_SECS",
            DEFAULT_CACHE_HIT_WINDOW.as_secs(),
        )?;

        let kraken_api_url =
            lookup("PW_KRAKEN_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_secs(poll_secs),
            cache: CacheSettings {
                retention: Duration::from_secs(retention_secs),
                entry_ttl: Duration::from_secs(ttl_secs),
                max_assets,
                hit_window: (hit_window_secs > 0).then(|| Duration::from_secs(hit_window_secs)),
            },
            kraken_api_url,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.db_path, "./db/app.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.cache.entry_ttl, DEFAULT_CACHE_TTL);
        assert_eq!(config.cache.retention, DEFAULT_RETENTION);
        assert_eq!(config.cache.max_assets, DEFAULT_MAX_CACHED_ASSETS);
        assert_eq!(config.cache.hit_window, Some(DEFAULT_CACHE_HIT_WINDOW));
        assert_eq!(config.kraken_api_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PW_LISTEN_ADDR", "127.0.0.1:9000"),
            ("PW_CORS_ALLOW_ORIGINS", "http://a.test, http://b.test,"),
            ("PW_POLL_INTERVAL_SECS", "2"),
            ("PW_CACHE_MAX_ASSETS", "3"),
            ("PW_CACHE_HIT_WINDOW_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.cache.max_assets, 3);
        assert_eq!(config.cache.hit_window, None);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("PW_LISTEN_ADDR", "nowhere")]).is_err());
        assert!(config_from(&[("PW_REQUEST_TIMEOUT_MS", "soon")]).is_err());
        assert!(config_from(&[("PW_POLL_INTERVAL_SECS", "0")]).is_err());
        assert!(config_from(&[("PW_CACHE_MAX_ASSETS", "0")]).is_err());
        assert!(config_from(&[("PW_CACHE_TTL_SECS", "-1")]).is_err());
    }
}
