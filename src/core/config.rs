//! Environment-driven configuration.
//!
//! All knobs come from the process environment (loaded from `.env` by the
//! binary before this runs). `from_env` fails fast on the credentials the
//! bot cannot run without and falls back to defaults for everything else.

use anyhow::{Context, Result};

/// Process-wide configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot token used for the gateway connection.
    pub discord_token: String,
    /// Application id for slash command registration.
    pub application_id: u64,
    /// Optional single guild for command registration during testing.
    /// When unset, commands are registered globally.
    pub discord_guild_id: Option<String>,
    /// Path to the sqlite database file.
    pub database_path: String,
    /// Legacy text-command prefix. Slash commands are the primary surface;
    /// the prefix only drives the redirect hint on prefixed messages.
    pub command_prefix: String,
    /// User ids that bypass permission checks.
    pub owner_ids: Vec<String>,
    /// Active warnings before auto-punishment kicks in.
    pub max_warnings: i64,
    /// Commands allowed per rate-limit window.
    pub rate_limit_commands: usize,
    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,
    /// Port for the liveness HTTP endpoint.
    pub health_port: u16,
    /// Default log filter handed to env_logger.
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token =
            std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;
        let application_id = std::env::var("APPLICATION_ID")
            .context("APPLICATION_ID must be set")?
            .parse::<u64>()
            .context("APPLICATION_ID must be a numeric application id")?;

        let owner_ids = std::env::var("OWNER_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            discord_token,
            application_id,
            discord_guild_id: std::env::var("GUILD_ID").ok(),
            database_path: env_or("DATABASE_PATH", "./bot.db"),
            command_prefix: env_or("COMMAND_PREFIX", "!"),
            owner_ids,
            max_warnings: parse_or("MAX_WARNINGS", 3),
            rate_limit_commands: parse_or("RATE_LIMIT_COMMANDS", 5),
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", 60),
            health_port: parse_or("HEALTH_PORT", 5000),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }

    /// Whether the given user id is a configured bot owner.
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_ids.iter().any(|id| id == user_id)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_owner() {
        let config = Config {
            discord_token: String::new(),
            application_id: 1,
            discord_guild_id: None,
            database_path: ":memory:".to_string(),
            command_prefix: "!".to_string(),
            owner_ids: vec!["111".to_string(), "222".to_string()],
            max_warnings: 3,
            rate_limit_commands: 5,
            rate_limit_window_secs: 60,
            health_port: 5000,
            log_level: "info".to_string(),
        };

        assert!(config.is_owner("111"));
        assert!(config.is_owner("222"));
        assert!(!config.is_owner("333"));
    }
}
