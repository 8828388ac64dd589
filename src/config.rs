use std::env;

use crate::error::AppError;
use crate::roster::DEFAULT_TEAM_SIZES;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub allowed_team_sizes: Vec<u32>,
    pub port: u16,
    pub external_url: Option<String>,
    pub keep_alive_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        const DEFAULT_COMMAND_PREFIX: &str = "!";
        const DEFAULT_PORT: u16 = 8080;
        const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 600;

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        let command_prefix =
            env::var("COMMAND_PREFIX").unwrap_or_else(|_| DEFAULT_COMMAND_PREFIX.into());

        let allowed_team_sizes = match env::var("ALLOWED_TEAM_SIZES") {
            Ok(raw) => parse_team_sizes(&raw)?,
            Err(_) => DEFAULT_TEAM_SIZES.to_vec(),
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let external_url = env::var("RENDER_EXTERNAL_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let keep_alive_interval_secs = env::var("KEEPALIVE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_KEEP_ALIVE_INTERVAL_SECS);

        Ok(Self {
            discord_token,
            command_prefix,
            allowed_team_sizes,
            port,
            external_url,
            keep_alive_interval_secs,
        })
    }
}

/// Parse a comma separated list of team sizes, e.g. `5,10`.
fn parse_team_sizes(raw: &str) -> Result<Vec<u32>, AppError> {
    let mut sizes = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(AppError::Config(format!(
                "ALLOWED_TEAM_SIZES contains an invalid size: `{s}`"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if sizes.is_empty() {
        return Err(AppError::Config("ALLOWED_TEAM_SIZES must not be empty".into()));
    }

    sizes.sort_unstable();
    sizes.dedup();
    Ok(sizes)
}
