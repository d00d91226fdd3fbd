//! Server configuration from environment variables.

use settlers_core::{GameConfig, GameError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Tracing filter directive (`RUST_LOG`)
    pub log_filter: String,
    /// Settings for the hosted game (`GAME_PLAYERS`, `GAME_SEED`)
    pub game: GameConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = parse_var(&lookup, "SERVER_ADDR")?.unwrap_or(DEFAULT_ADDR);

        let mut game = GameConfig::default();
        if let Some(player_count) = parse_var(&lookup, "GAME_PLAYERS")? {
            game.player_count = player_count;
        }
        game.seed = parse_var(&lookup, "GAME_SEED")?;
        game.validate()?;

        Ok(Self {
            addr,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
            game,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
