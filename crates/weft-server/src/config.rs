use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::authority::DEFAULT_OUTBOUND_CAPACITY;
use crate::error::ConfigError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Route serving the editor WebSocket.
    pub socket_path: String,
    /// File whose contents seed the document. Empty document if unset.
    pub initial_document: Option<PathBuf>,
    /// Capacity of the mutation queue.
    pub queue_capacity: usize,
    /// Updates buffered per connection before a slow client is dropped.
    pub outbound_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4000".into(),
            socket_path: "/socket".into(),
            initial_document: None,
            queue_capacity: 1024,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl Config {
    /// Load from a TOML file, substituting `$VAR` with environment variables.
    pub fn load(config_file: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = config_file.as_ref();
        let config_string = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config_string = substitute_env(&config_string, env::vars());

        let config: Config = toml::from_str(&config_string).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if !self.socket_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "socket_path",
                message: format!("route must start with '/', got {:?}", self.socket_path),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "queue_capacity",
                message: "must be at least 1".into(),
            });
        }
        if self.outbound_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "outbound_capacity",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "listen_addr",
                message: e.to_string(),
            })
    }

    /// Read the initial document, if one is configured.
    pub fn read_initial_document(&self) -> Result<String, ConfigError> {
        match &self.initial_document {
            Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::InitialDocument {
                path: path.clone(),
                source,
            }),
            None => Ok(String::new()),
        }
    }
}

/// Replace `$NAME` with the value of each variable.
///
/// Longer names are substituted first so `$HOME_DIR` is not clobbered by `$HOME`.
fn substitute_env(input: &str, vars: impl IntoIterator<Item = (String, String)>) -> String {
    let mut vars: Vec<_> = vars.into_iter().collect();
    vars.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = input.to_string();
    for (k, v) in vars {
        output = output.replace(&format!("${}", k), &v);
    }
    output
}
