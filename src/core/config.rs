//! Environment configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::core::download::{DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_DOWNLOAD_BYTES};
use crate::features::emoji::{EmojiSettings, DEFAULT_MAX_ACTIVE_WIDGETS};

const DEFAULT_WIDGET_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Register commands on this guild only (instant updates while developing)
    pub discord_guild_id: Option<String>,
    pub log_level: String,
    pub widget_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub max_download_bytes: u64,
    pub max_active_widgets: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            get("DISCORD_TOKEN").ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        Ok(Self {
            discord_token,
            discord_guild_id: get("DISCORD_GUILD_ID"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            widget_timeout_secs: parse_or(
                get("EMOJI_WIDGET_TIMEOUT_SECS"),
                "EMOJI_WIDGET_TIMEOUT_SECS",
                DEFAULT_WIDGET_TIMEOUT_SECS,
            )?,
            download_timeout_secs: parse_or(
                get("EMOJI_DOWNLOAD_TIMEOUT_SECS"),
                "EMOJI_DOWNLOAD_TIMEOUT_SECS",
                DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            )?,
            max_download_bytes: parse_or(
                get("EMOJI_MAX_DOWNLOAD_BYTES"),
                "EMOJI_MAX_DOWNLOAD_BYTES",
                DEFAULT_MAX_DOWNLOAD_BYTES,
            )?,
            max_active_widgets: parse_or(
                get("EMOJI_MAX_ACTIVE_WIDGETS"),
                "EMOJI_MAX_ACTIVE_WIDGETS",
                DEFAULT_MAX_ACTIVE_WIDGETS,
            )?,
        })
    }

    pub fn emoji_settings(&self) -> EmojiSettings {
        EmojiSettings {
            widget_timeout: Duration::from_secs(self.widget_timeout_secs),
            max_active_widgets: self.max_active_widgets,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
