//! Run configuration loaded from `config.toml` in the working folder.
//!
//! A missing or blank file is a bootstrap case, not a recoverable one: the
//! default template is (re)written and the run aborts so the user can fill
//! it in.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

const DEFAULT_CONFIG: &str = r#"# Config for the CubeMX project generator

# Specify BOARDNAME example "NUCLEO-F072RB" otherwise
# generate an ioc file with CubeMX and save it in this folder
BOARDNAME = ""

# Specify the folder in which the CubeMX application is located, usually:
# "C:/Program Files/STMicroelectronics/STM32Cube/STM32CubeMX"
CUBEMX_LOC = ""
"#;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Board template to load when no descriptor exists, e.g. "NUCLEO-F072RB".
    #[serde(rename = "BOARDNAME", default)]
    pub board_name: String,

    /// Install folder (or executable path) of the CubeMX application.
    #[serde(rename = "CUBEMX_LOC", default)]
    pub cubemx_loc: String,
}

impl Config {
    /// A config with no recognized value set is treated as unset.
    pub fn is_blank(&self) -> bool {
        self.board_name.trim().is_empty() && self.cubemx_loc.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found at {path}, wrote a default template")]
    Missing { path: String },
    #[error("config at {path} has no values set, rewrote the default template")]
    Blank { path: String },
    #[error("read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("write default config {path}: {source}")]
    WriteDefault { path: String, source: io::Error },
}

/// Load the config, bootstrapping the default template when it is missing
/// or entirely blank. Both bootstrap cases are errors: the caller aborts.
pub fn load_or_bootstrap(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        write_default(path)?;
        return Err(ConfigError::Missing {
            path: path.display().to_string(),
        });
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if config.is_blank() {
        write_default(path)?;
        return Err(ConfigError::Blank {
            path: path.display().to_string(),
        });
    }

    Ok(config)
}

fn write_default(path: &Path) -> Result<(), ConfigError> {
    fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::WriteDefault {
        path: path.display().to_string(),
        source,
    })
}
