use std::{fmt, io, path::Path};

use serde::{Deserialize, Serialize};

/// File extension of the produced container.
///
/// `bcfzip` is the BCF 1.0/2.0 extension, `bcf` was introduced with BCF 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    /// `.zip`
    Zip,
    /// `.bcfzip`
    Bcfzip,
    /// `.bcf`
    #[default]
    Bcf,
}

impl Extension {
    /// The extension, without the leading dot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Bcfzip => "bcfzip",
            Self::Bcf => "bcf",
        }
    }

    /// The name under which a finished container is saved:
    /// `presentation.<extension>`.
    #[must_use]
    pub fn download_name(self) -> String {
        format!("presentation.{self}")
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How entries are stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate-compressed entries.
    #[default]
    Deflated,
    /// Uncompressed entries.
    Stored,
}

/// Configuration for building BCF containers.
///
/// The configuration is handed explicitly to the assembler, the worker
/// transport and the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Extension of the saved container.
    pub extension: Extension,

    /// Compression of the container entries.
    pub compression: Compression,

    /// Whether XML documents are indented.
    ///
    /// Indentation does not change the meaning of the documents, it only
    /// makes them easier to read.
    pub pretty_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: Extension::default(),
            compression: Compression::default(),
            pretty_print: default_pretty_print(),
        }
    }
}

/// Errors reading or writing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] io::Error),
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialised.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] io::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration at `path`, falling back to the defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }
}

const fn default_pretty_print() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        extension: Extension,

        #[serde(default)]
        compression: Compression,

        #[serde(default = "default_pretty_print")]
        pretty_print: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                extension,
                compression,
                pretty_print,
            } => Self {
                extension,
                compression,
                pretty_print,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            extension: config.extension,
            compression: config.compression,
            pretty_print: config.pretty_print,
        }
    }
}
