//! Configuration file loading
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        for (tag, toolchain) in &self.toolchains {
            if toolchain.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{tag}' has empty name"
                )));
            }
            if toolchain.source_name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{tag}' has empty source_name"
                )));
            }
            if toolchain.output_name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{tag}' has empty output_name"
                )));
            }
            if toolchain.candidates.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{tag}' has no compiler candidates"
                )));
            }
            for candidate in &toolchain.candidates {
                if candidate.probe.is_empty() || candidate.compile.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "toolchain '{tag}' has a candidate with an empty command"
                    )));
                }
            }
            if toolchain.install_hint.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{tag}' has empty install_hint"
                )));
            }
        }

        Ok(())
    }
}
