//! Every document is UTF-8, declared `standalone="yes"`, and points
//! `xsi:noNamespaceSchemaLocation` at the BCF 3.0 schema it conforms to.
//! Builders only read their input.

/// The markup (`markup.bcf`) document.
pub mod markup;
/// The container version (`bcf.version`) document.
pub mod version;
/// The viewpoint (`.bcfv`) document.
pub mod visinfo;
mod writer;

use crate::domain::Config;

/// The BCF version written to `bcf.version`.
pub const VERSION_ID: &str = "3.0";

/// Where the BCF 3.0 schemas are published.
pub const SCHEMA_BASE: &str =
    "https://raw.githubusercontent.com/buildingSMART/BCF-XML/release_3_0/Schemas/";

/// The XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

fn schema_location(xsd: &str) -> String {
    format!("{SCHEMA_BASE}{xsd}")
}

/// Errors building an XML document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The input lacks a structure the document requires.
    #[error("missing required section: {0}")]
    MissingRequiredSection(&'static str),

    /// The XML writer failed.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Formatting options shared by the builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Indent nested elements.
    pub pretty_print: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Self {
            pretty_print: config.pretty_print,
        }
    }
}
