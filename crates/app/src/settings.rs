//! Handles settings for the application.
//!
//! Values are read from an optional `settings.toml` in the working directory
//! and then from `SIMPLEBANK__*` environment variables, e.g.
//! `SIMPLEBANK__APP__LEVEL=debug`. See `settings.example.toml`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite {
        path: String,
    },
    Postgres {
        url: String,
    },
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite { path } => format!("sqlite:{path}?mode=rwc"),
            Database::Postgres { url } => url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Engine {
    pub tx_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub engine: Engine,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SIMPLEBANK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
