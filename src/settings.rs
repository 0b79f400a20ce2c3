//! Application settings, read from `config.toml` and the environment.
//!
//! Precedence, lowest first: built-in defaults, `DATABASE_URL` (also read from `.env`), the optional
//! `config.toml` in the working directory, then `TF_`-prefixed environment variables such as
//! `TF_DATABASE__URL` or `TF_LOGGING__FILTER`.

use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::env;

use crate::error::AttendanceResult;

const DEFAULT_DATABASE_URL: &str = "attendance.sqlite3";
const DEFAULT_LOG_FILTER: &str = "forum_attendance=info";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// A `tracing_subscriber::EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub filter: String,
}

impl Settings {
    /// Loads settings from `config.toml` in the current directory.
    pub fn load() -> AttendanceResult<Self> {
        Self::load_from("config")
    }

    /// Loads settings from the config file named `path`, with or without its extension. The file is
    /// optional.
    pub fn load_from(path: &str) -> AttendanceResult<Self> {
        Self::load_with(path, None)
    }

    /// Loads settings with `overrides` standing in for the process environment of `TF_` variables.
    fn load_with(path: &str, overrides: Option<Map<String, String>>) -> AttendanceResult<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let settings = Config::builder()
            .set_default("database.url", database_url)?
            .set_default("logging.filter", DEFAULT_LOG_FILTER)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TF")
                    .prefix_separator("_")
                    .separator("__")
                    .source(overrides),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
