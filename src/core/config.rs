//! Environment-driven configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: MAX_SESSIONS cap on live sessions
//! - 1.0.0: Initial release with OpenAI credential, bind address and session settings

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when the key is unset or empty; the chat surface is disabled then
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub bind_addr: SocketAddr,
    pub public_dir: PathBuf,
    /// Optional CDN/base URL for persona avatars
    pub avatar_base_url: Option<String>,
    pub session_idle_minutes: i64,
    /// Upper bound on live sessions; the least recently active one is dropped to make room
    pub max_sessions: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid BIND_ADDR: {bind_raw}"))?;

        let session_idle_minutes = match non_empty("SESSION_IDLE_MINUTES") {
            Some(raw) => {
                let minutes = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("Invalid SESSION_IDLE_MINUTES: {raw}"))?;
                if minutes <= 0 {
                    anyhow::bail!("SESSION_IDLE_MINUTES must be positive, got {minutes}");
                }
                minutes
            }
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };

        let max_sessions = match non_empty("MAX_SESSIONS") {
            Some(raw) => {
                let max = raw
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid MAX_SESSIONS: {raw}"))?;
                if max == 0 {
                    anyhow::bail!("MAX_SESSIONS must be positive");
                }
                max
            }
            None => DEFAULT_MAX_SESSIONS,
        };

        Ok(Config {
            openai_api_key: non_empty("OPENAI_API_KEY").map(|k| k.trim().to_string()),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr,
            public_dir: PathBuf::from(
                non_empty("PUBLIC_DIR").unwrap_or_else(|| "public".to_string()),
            ),
            avatar_base_url: non_empty("AVATAR_BASE_URL"),
            session_idle_minutes,
            max_sessions,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
