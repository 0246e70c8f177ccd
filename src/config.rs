use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::debug;

use crate::error::{PlStatsError, Result};

pub const APISPORTS_HOST: &str = "v3.football.api-sports.io";
pub const RAPIDAPI_HOST: &str = "api-football-v1.p.rapidapi.com";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3030";

/// API-Football league id of the Premier League.
pub const PREMIER_LEAGUE_ID: u32 = 39;
pub const DEFAULT_SEASON: u32 = 2025;
pub const DEFAULT_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_MAX_PAGES: u32 = 4;
pub const LIVE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Season id used by the backend for player statistics of the current season.
pub const BACKEND_SEASON_ID: u32 = 18;

/// Which API-Football gateway to talk to.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    /// Direct api-sports.io access with an `x-apisports-key` header.
    #[default]
    ApiSports,
    /// RapidAPI marketplace access; paths live under `/v3`.
    Rapid,
}

/// Runtime settings for every network-calling component.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    /// Host override for the upstream API. `None` picks the provider default.
    pub upstream_host: Option<String>,
    pub api_key: String,
    pub backend_url: String,
    pub league_id: u32,
    pub season: u32,
    pub timezone: String,
    pub max_pages: u32,
    pub poll_interval: Duration,
    pub backend_season_id: u32,
    /// Where the session token is persisted. `None` keeps it in memory only.
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            upstream_host: None,
            api_key: String::new(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            league_id: PREMIER_LEAGUE_ID,
            season: DEFAULT_SEASON,
            timezone: DEFAULT_TIMEZONE.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            poll_interval: LIVE_POLL_INTERVAL,
            backend_season_id: BACKEND_SEASON_ID,
            token_file: None,
        }
    }
}

impl Config {
    /// Load settings from the process environment, after reading `.env.local`
    /// and `.env` if they exist.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(key) = get("AF_KEY").or_else(|| get("API_KEY")) {
            config.api_key = key;
        }
        if let Some(provider) = get("AF_PROVIDER") {
            config.provider = Provider::from_str(&provider)
                .map_err(|_| PlStatsError::Config(format!("unknown AF_PROVIDER {provider:?}")))?;
        }
        config.upstream_host = get("AF_HOST");
        // A RapidAPI host implies the RapidAPI gateway even without AF_PROVIDER.
        if config
            .upstream_host
            .as_deref()
            .is_some_and(|h| h.to_ascii_lowercase().contains("rapidapi"))
        {
            config.provider = Provider::Rapid;
        }
        if let Some(season) = get("AF_SEASON") {
            config.season = parse_number("AF_SEASON", &season)?;
        }
        if let Some(max_pages) = get("AF_MAXPAGES") {
            config.max_pages = parse_number("AF_MAXPAGES", &max_pages)?;
        }
        if let Some(url) = get("API_URL") {
            config.backend_url = url;
        }
        config.token_file = get("PL_TOKEN_FILE").map(PathBuf::from);

        debug!(provider = %config.provider, season = config.season, "loaded config");
        Ok(config)
    }

    /// Base URL of the upstream API including the `/v3` prefix when needed.
    pub fn upstream_base(&self) -> String {
        match self.provider {
            Provider::ApiSports => {
                let host = self.upstream_host.as_deref().unwrap_or(APISPORTS_HOST);
                format!("https://{host}")
            }
            Provider::Rapid => {
                let host = self.upstream_host.as_deref().unwrap_or(RAPIDAPI_HOST);
                format!("https://{host}/v3")
            }
        }
    }

    /// Authentication headers for the upstream API.
    pub fn upstream_headers(&self) -> Result<Vec<(&'static str, String)>> {
        if self.api_key.is_empty() {
            return Err(PlStatsError::Config("API key missing (set AF_KEY)".to_string()));
        }
        let headers = match self.provider {
            Provider::ApiSports => vec![("x-apisports-key", self.api_key.clone())],
            Provider::Rapid => vec![
                ("X-RapidAPI-Key", self.api_key.clone()),
                (
                    "X-RapidAPI-Host",
                    self.upstream_host
                        .clone()
                        .unwrap_or_else(|| RAPIDAPI_HOST.to_string()),
                ),
            ],
        };
        Ok(headers)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| PlStatsError::Config(format!("{key} must be a number, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.league_id, 39);
        assert_eq!(config.season, 2025);
        assert_eq!(config.max_pages, 4);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.upstream_base(), "https://v3.football.api-sports.io");
        assert!(config.upstream_headers().is_err());
    }

    #[test]
    fn test_rapid_provider() {
        let config =
            Config::from_lookup(lookup(&[("AF_PROVIDER", "rapid"), ("API_KEY", "abc")])).unwrap();
        assert_eq!(config.provider, Provider::Rapid);
        assert_eq!(
            config.upstream_base(),
            "https://api-football-v1.p.rapidapi.com/v3"
        );
        let headers = config.upstream_headers().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0], ("X-RapidAPI-Key", "abc".to_string()));
    }

    #[test]
    fn test_rapid_host_implies_provider() {
        let config = Config::from_lookup(lookup(&[(
            "AF_HOST",
            "api-football-v1.p.rapidapi.com",
        )]))
        .unwrap();
        assert_eq!(config.provider, Provider::Rapid);
    }

    #[test]
    fn test_af_key_wins_over_api_key() {
        let config =
            Config::from_lookup(lookup(&[("AF_KEY", "first"), ("API_KEY", "second")])).unwrap();
        assert_eq!(config.api_key, "first");
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("AF_MAXPAGES", "lots")])).unwrap_err();
        assert!(matches!(err, PlStatsError::Config(_)));
        let err = Config::from_lookup(lookup(&[("AF_PROVIDER", "carrier-pigeon")])).unwrap_err();
        assert!(matches!(err, PlStatsError::Config(_)));
    }
}
