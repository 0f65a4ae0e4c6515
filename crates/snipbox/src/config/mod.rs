use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::toolchain::{ArtifactKind, Toolchain, ToolchainCandidate, UnsuitableProbe};

mod loader;
pub mod toolchain;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../snipbox.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("toolchain '{0}' not found in configuration")]
    ToolchainNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for snipbox
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Toolchain configurations keyed by language tag
    #[serde(default)]
    pub toolchains: HashMap<String, Toolchain>,
}

impl Config {
    /// Create a new config with the embedded default toolchains
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no toolchains
    pub fn empty() -> Self {
        Self {
            toolchains: HashMap::new(),
        }
    }

    /// Get a toolchain by language tag
    pub fn get_toolchain(&self, tag: &str) -> Result<&Toolchain, ConfigError> {
        self.toolchains
            .get(tag)
            .ok_or_else(|| ConfigError::ToolchainNotFound(tag.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_toolchain_found() {
        let config = Config::default();
        let result = config.get_toolchain("cpp");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().name, "C++");
    }

    #[test]
    fn get_toolchain_not_found() {
        let config = Config::default();
        let result = config.get_toolchain("nonexistent");
        match result {
            Err(ConfigError::ToolchainNotFound(name)) => assert_eq!(name, "nonexistent"),
            _ => panic!("expected ToolchainNotFound error"),
        }
    }

    #[test]
    fn get_toolchain_empty_config() {
        let config = Config::empty();
        assert!(config.get_toolchain("cpp").is_err());
    }

    #[test]
    fn config_new_has_toolchains() {
        let config = Config::new();
        assert!(!config.toolchains.is_empty());
    }

    #[test]
    fn embedded_go_toolchain_rejects_regular_go() {
        let config = Config::default();
        let go = config.get_toolchain("go").unwrap();
        assert_eq!(go.artifact, ArtifactKind::Wasm);
        let unsuitable = go.unsuitable.as_ref().expect("go has an unsuitable probe");
        assert_eq!(unsuitable.probe[0], "go");
        assert!(unsuitable.message.contains("TinyGo"));
    }

    #[test]
    fn embedded_java_toolchain_is_class_artifact() {
        let config = Config::default();
        let java = config.get_toolchain("java").unwrap();
        assert_eq!(java.artifact, ArtifactKind::Class);
        assert!(java.runtime_probe.is_some());
        assert!(java.run.contains(&"{class}".to_owned()));
    }
}
