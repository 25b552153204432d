//! Server configuration: command line over an optional TOML file.
//!
//! Precedence, highest first: command-line flag, config file value,
//! built-in default.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8081"
//! path = "/ws"
//!
//! [game]
//! seed = 42
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tileforge_session::SessionConfig;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8081";

/// Default log level when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments for the `tileforge` binary.
#[derive(Parser, Debug, Default)]
#[command(name = "tileforge", version)]
#[command(about = "Single-player 2048 game server over WebSocket", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g. 127.0.0.1:8081)
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Request path WebSocket upgrades are accepted on
    #[arg(short, long)]
    pub path: Option<String>,

    /// Base seed for tile spawning; omit for OS randomness
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Layout of the TOML configuration file. Every section is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub listen: Option<String>,
    pub path: Option<String>,
}

/// `[game]`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GameSection {
    pub seed: Option<u64>,
}

/// `[logging]`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parses a config file's contents.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: String,
    pub path: String,
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            path: tileforge_transport::DEFAULT_PATH.to_string(),
            seed: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parses the process arguments and resolves the configuration.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolves the configuration from already-parsed arguments, reading
    /// the TOML file they point at, if any.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let file = match cli.config {
            Some(ref path) => read_toml(path)?,
            None => TomlConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Merges command-line values over file values over defaults.
    pub fn merge(cli: CliArgs, file: TomlConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            listen: cli
                .listen
                .or(file.server.listen)
                .unwrap_or(defaults.listen),
            path: cli.path.or(file.server.path).unwrap_or(defaults.path),
            seed: cli.seed.or(file.game.seed),
            log_level: cli
                .log_level
                .or(file.logging.level)
                .unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would only fail later, at bind or upgrade time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.path.clone()));
        }
        Ok(())
    }

    /// The per-session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig { seed: self.seed }
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    TomlConfig::parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this layout.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The WebSocket path does not start with `/`.
    #[error("websocket path must start with '/': {0:?}")]
    InvalidPath(String),
}
