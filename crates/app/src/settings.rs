//! Application settings, read from `settings.toml`.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (`trace`..`error`).
    pub level: String,
}

/// Which persistence backend the ledger writes through to.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory sqlite; state is lost on exit.
    Memory,
    /// sqlite file at `path`.
    Sqlite,
    /// JSON data files in the directory at `path`.
    Json,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: Backend,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    /// Bounded wait for account locks, in milliseconds.
    pub lock_wait_ms: Option<u64>,
    pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
