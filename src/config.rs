// Configuration management for the simulator

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::sim::{Asset, Delay};

fn default_lot_size() -> f64 {
    1.0
}

fn default_tick_size() -> f64 {
    0.0001
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Local → exchange trip, in virtual clock units
    #[serde(default)]
    pub send: i64,
    /// Exchange → local trip, in virtual clock units
    #[serde(default)]
    pub receive: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
    #[serde(default = "default_tick_size")]
    pub tick_size: f64,
    #[serde(default)]
    pub delay: DelayConfig,
}

impl AssetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lot_size: default_lot_size(),
            tick_size: default_tick_size(),
            delay: DelayConfig::default(),
        }
    }
}

impl From<&AssetConfig> for Asset {
    fn from(cfg: &AssetConfig) -> Self {
        Asset {
            name: cfg.name.clone(),
            lot_size: cfg.lot_size,
            tick_size: cfg.tick_size,
            delay: Delay {
                send: cfg.delay.send,
                receive: cfg.delay.receive,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub assets: Vec<AssetConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            assets: vec![AssetConfig::new("BTCUSD")],
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;
        let config: SimConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::Validation(
                "at least one asset must be configured".to_string(),
            ));
        }

        for asset in &self.assets {
            if asset.name.is_empty() {
                return Err(ConfigError::Validation(
                    "asset name must not be empty".to_string(),
                ));
            }
            if asset.tick_size <= 0.0 || !asset.tick_size.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "tick_size must be positive for {}",
                    asset.name
                )));
            }
            if asset.lot_size <= 0.0 || !asset.lot_size.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "lot_size must be positive for {}",
                    asset.name
                )));
            }
            if asset.delay.send < 0 || asset.delay.receive < 0 {
                return Err(ConfigError::Validation(format!(
                    "delays must be non-negative for {}",
                    asset.name
                )));
            }
        }

        Ok(())
    }

    /// Runtime asset descriptors in configuration order.
    pub fn build_assets(&self) -> Vec<Asset> {
        self.assets.iter().map(Asset::from).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
