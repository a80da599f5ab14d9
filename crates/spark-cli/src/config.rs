//! Config - TOML 設定ファイル
//!
//! 足りないキーは既定値で埋めます。ファイルが存在しなければ既定値で作成し、
//! 読み込んだ設定は正規化して書き戻します（新しいキーが追記される）。
//!
//! ```toml
//! production = false
//! log_level = "info"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3999
//!
//! [frontend]
//! types_out = "frontend/gotypes.ts"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid listen address '{0}'")]
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub production: bool,
    /// tracing の EnvFilter 書式（`RUST_LOG` があればそちらが優先）
    pub log_level: String,
    pub server: ServerConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// 生成した型定義の出力先
    pub types_out: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            production: false,
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            frontend: FrontendConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3999,
        }
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            types_out: PathBuf::from("frontend/gotypes.ts"),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 読み込み（なければ作成）して正規化した内容を書き戻す
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.save(path)?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }
}
