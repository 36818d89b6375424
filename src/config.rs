use std::env;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_env_bool(key: &str, default: bool) -> bool {
    match get_env(key) {
        None => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}

fn get_env_usize(key: &str, default: usize) -> Result<usize> {
    match get_env(key) {
        None => Ok(default),
        Some(v) => Ok(v
            .parse::<usize>()
            .map_err(|e| anyhow!("{key} invalid int: {e}"))?),
    }
}

fn get_env_string(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

/// Which calendar day `today=true` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodayTimezone {
    Local,
    Utc,
}

impl TodayTimezone {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "utc" => Some(Self::Utc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Snapshot
    pub matches_path: String,
    pub snapshot_cache: bool,

    // Query behaviour
    pub today_timezone: TodayTimezone,
    pub related_limit: usize,

    // Server
    pub api_host: String,
    pub api_port: u16,
    pub cors_allow_any: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            matches_path: "./response.json".to_string(),
            snapshot_cache: false,
            today_timezone: TodayTimezone::Local,
            related_limit: 4,
            api_host: "127.0.0.1".to_string(),
            api_port: 3000,
            cors_allow_any: true,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let tz_raw = get_env_string("TODAY_TIMEZONE", "local");
        let today_timezone = TodayTimezone::parse(&tz_raw)
            .ok_or_else(|| anyhow!("TODAY_TIMEZONE must be local|utc (got {tz_raw})"))?;

        let port = get_env_usize("API_PORT", defaults.api_port as usize)?;
        let api_port = u16::try_from(port).map_err(|_| anyhow!("API_PORT out of range (got {port})"))?;

        let s = Self {
            matches_path: get_env_string("MATCHES_PATH", &defaults.matches_path),
            snapshot_cache: get_env_bool("SNAPSHOT_CACHE", defaults.snapshot_cache),
            today_timezone,
            related_limit: get_env_usize("RELATED_LIMIT", defaults.related_limit)?,
            api_host: get_env_string("API_HOST", &defaults.api_host),
            api_port,
            cors_allow_any: get_env_bool("CORS_ALLOW_ANY", defaults.cors_allow_any),
        };

        s.validate()?;
        Ok(s)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.matches_path.trim().is_empty() {
            return Err(anyhow!("MATCHES_PATH must not be empty"));
        }
        if self.api_host.trim().is_empty() {
            return Err(anyhow!("API_HOST must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_parse_is_case_insensitive() {
        assert_eq!(TodayTimezone::parse("UTC"), Some(TodayTimezone::Utc));
        assert_eq!(TodayTimezone::parse("Local"), Some(TodayTimezone::Local));
        assert_eq!(TodayTimezone::parse("europe/paris"), None);
    }

    #[test]
    fn validate_rejects_blank_path() {
        let s = Settings {
            matches_path: "  ".to_string(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let s = Settings {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            ..Settings::default()
        };
        assert_eq!(s.bind_addr(), "0.0.0.0:8080");
    }
}
