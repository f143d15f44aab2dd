//! Runtime configuration, read from the environment (and `.env`).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GATEWAY_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub model: String,
    /// Override for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    /// Upper bound on a single backend call.
    pub analysis_timeout: Duration,
    pub gateway_addr: SocketAddr,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("OPENAI_API_KEY must be set in .env")?;
        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty());

        let timeout_secs = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("ANALYSIS_TIMEOUT_SECS is not a number: '{}'", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("ANALYSIS_TIMEOUT_SECS must be greater than zero"));
        }

        let addr_raw = lookup("GATEWAY_ADDR").unwrap_or_else(|| DEFAULT_GATEWAY_ADDR.to_string());
        let gateway_addr = addr_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("GATEWAY_ADDR is not a socket address: '{}'", addr_raw))?;

        let level_raw = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = level_raw
            .parse::<tracing::Level>()
            .map_err(|_| anyhow!("LOG_LEVEL is not a valid level: '{}'", level_raw))?;

        Ok(Self {
            backend: BackendConfig {
                api_key,
                model,
                base_url,
            },
            analysis_timeout: Duration::from_secs(timeout_secs),
            gateway_addr,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.backend.model, DEFAULT_MODEL);
        assert_eq!(config.backend.base_url, None);
        assert_eq!(config.analysis_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.gateway_addr.port(), 3000);
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ANALYSIS_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ANALYSIS_TIMEOUT_SECS"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("ANALYSIS_TIMEOUT_SECS", "15"),
            ("GATEWAY_ADDR", "127.0.0.1:8080"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.backend.model, "gpt-4o-mini");
        assert_eq!(config.backend.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.analysis_timeout, Duration::from_secs(15));
        assert_eq!(config.gateway_addr.port(), 8080);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }
}
