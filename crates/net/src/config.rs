use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr, time::Duration};

use connector_service::github::GithubConfig;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
#[error("invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: String,
    value: String,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub github: GithubConfig,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` uses the process environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs: u64 = try_load(&lookup, "GITHUB_TIMEOUT_SECS", "10")?;
        let session_secs: i64 = try_load(&lookup, "SESSION_TTL_SECS", "360000")?;

        Ok(Self {
            port: try_load(&lookup, "PORT", "5001")?,
            database_path: try_load(&lookup, "DATABASE_PATH", "./data")?,
            github: GithubConfig {
                api_url: try_load(&lookup, "GITHUB_API_URL", "https://api.github.com")?,
                client_id: read_secret(&lookup, "GITHUB_CLIENT_ID"),
                client_secret: read_secret(&lookup, "GITHUB_SECRET"),
                timeout: Duration::from_secs(timeout_secs),
            },
            session_ttl: chrono::Duration::seconds(session_secs),
        })
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key: key.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}

/// Environment first, then a mounted secret file, then empty.
fn read_secret(lookup: &impl Fn(&str) -> Option<String>, secret_name: &str) -> String {
    if let Some(value) = lookup(secret_name) {
        return value;
    }

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|e| {
            warn!("Failed to read {secret_name} from {path}: {e}");
            String::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() -> Result<(), ConfigError> {
        let config = Config::load_from(lookup(&[("GITHUB_CLIENT_ID", "id"), ("GITHUB_SECRET", "s")]))?;

        assert_eq!(config.port, 5001);
        assert_eq!(config.database_path, PathBuf::from("./data"));
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.client_id, "id");
        assert_eq!(config.github.timeout, Duration::from_secs(10));
        assert_eq!(config.session_ttl, chrono::Duration::seconds(360000));
        Ok(())
    }

    #[test]
    fn overrides_are_parsed() -> Result<(), ConfigError> {
        let config = Config::load_from(lookup(&[
            ("PORT", "8080"),
            ("DATABASE_PATH", "/var/lib/connector"),
            ("GITHUB_API_URL", "http://localhost:9000"),
            ("SESSION_TTL_SECS", "60"),
        ]))?;

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/connector"));
        assert_eq!(config.github.api_url, "http://localhost:9000");
        assert_eq!(config.session_ttl, chrono::Duration::seconds(60));
        Ok(())
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Config::load_from(lookup(&[("PORT", "eighty")])).unwrap_err();

        assert!(err.to_string().contains("PORT"));
    }
}
