use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::account::{ACCOUNT_NUMBER_LENGTH, DEFAULT_SNAPSHOT_KEY};

/// Storage configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Key the account snapshot is stored under
    pub snapshot_key: String,
}

/// Account configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccountConfig {
    /// Number of digits in generated account numbers
    pub number_length: usize,
}

/// Session configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionConfig {
    /// Offer the destructive "reset all data" entry in the main menu
    pub allow_reset: bool,
}

/// Application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Application name, shown above the main menu
    pub app_name: String,
    pub storage: StorageConfig,
    pub accounts: AccountConfig,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Toy Bank".to_string(),
            storage: StorageConfig {
                path: "data/bank.db".to_string(),
                snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            },
            accounts: AccountConfig {
                number_length: ACCOUNT_NUMBER_LENGTH,
            },
            session: SessionConfig { allow_reset: true },
        }
    }
}

/// Load configuration from file, writing the defaults there if it is missing
pub fn load_config(path: &str) -> Result<Config> {
    if !Path::new(path).exists() {
        let default_config = Config::default();
        save_config(path, &default_config)?;
        return Ok(default_config);
    }

    let mut file = File::open(path).context(format!("Failed to open config file: {}", path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .context("Failed to read config file")?;

    let config: Config = match path.ends_with(".toml") {
        true => toml::from_str(&contents).context("Failed to parse TOML config")?,
        false => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    if config.accounts.number_length == 0 {
        bail!("accounts.number_length in {} must be at least 1", path);
    }

    Ok(config)
}

/// Save configuration to file
pub fn save_config(path: &str, config: &Config) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }

    let serialized = match path.ends_with(".toml") {
        true => toml::to_string_pretty(config).context("Failed to serialize config to TOML")?,
        false => {
            serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")?
        }
    };

    std::fs::write(path, serialized)
        .context(format!("Failed to write config to file: {}", path))?;

    Ok(())
}
