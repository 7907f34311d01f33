use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseSettings, GatewaySettings, LogFormat, LoggingSettings};

/// Environment variables with this prefix override file values,
/// e.g. `LIGHTBNB__GATEWAY__DEFAULT_LIMIT=20`.
const ENV_PREFIX: &str = "LIGHTBNB";

/// Loads the application configuration.
///
/// Sources are layered lowest to highest: built-in defaults, the TOML file at
/// `path` (optional, missing is fine), `LIGHTBNB__*` environment variables,
/// and finally the conventional `DATABASE_URL`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Parses configuration from TOML text alone, without consulting the
/// environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Rejects settings that would leave the gateway unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.gateway.default_limit == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.default_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
