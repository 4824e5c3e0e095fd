use std::path::{Path, PathBuf};

use boxledgerlib::{catalog::CatalogRecords, policy::Policy};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub policy: Policy,
    pub logging: LoggingSettings,
    /// Default for `--catalog`.
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `boxledger.{toml,yaml,json}` or the given file, then
    /// `BOXLEDGER_*` variables (`BOXLEDGER_POLICY__MAX_RANGE_DAYS=30`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        builder = match path {
            Some(p) => builder.add_source(File::from(p)),
            None => builder.add_source(File::with_name("boxledger").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("BOXLEDGER")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings
            .policy
            .check()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(settings)
    }
}

/// Reads a catalog file; the format follows the extension.
pub fn read_catalog(path: &Path) -> Result<CatalogRecords, ConfigError> {
    Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()
}
