//! Topic files, in JSON or YAML.

use std::{fs, path::Path};

use bcfkit::schema::{HeaderRecord, TopicRecord};
use serde::Deserialize;

/// The contents of a topics file.
#[derive(Debug, Default, PartialEq)]
pub struct TopicFile {
    pub topics: Vec<TopicRecord>,
    pub header: HeaderRecord,
}

/// A topics file is either a bare list of topics, or a document holding the
/// topics and a header.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<TopicRecord>),
    Full {
        topics: Vec<TopicRecord>,
        #[serde(default)]
        header: HeaderRecord,
    },
}

impl From<Document> for TopicFile {
    fn from(document: Document) -> Self {
        match document {
            Document::List(topics) => Self {
                topics,
                header: HeaderRecord::default(),
            },
            Document::Full { topics, header } => Self { topics, header },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Cannot tell the format of {}: expected a .json, .yaml or .yml file",
                path.display()
            ),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, content: &str) -> anyhow::Result<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

fn read<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let format = Format::of(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    format
        .parse(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
}

impl TopicFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let document: Document = read(path)?;
        let file = Self::from(document);
        tracing::debug!(topics = file.topics.len(), "read {}", path.display());
        Ok(file)
    }

    /// Replaces the header with the one in `path`.
    pub fn with_header_from(mut self, path: &Path) -> anyhow::Result<Self> {
        self.header = read(path)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use test_case::test_case;

    use super::*;

    fn file_with(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test_case(".json", r#"[{"uuid": "a", "title": "Leak"}]"#; "json list")]
    #[test_case(".yaml", "- uuid: a\n  title: Leak\n"; "yaml list")]
    #[test_case(".yml", "topics:\n  - uuid: a\n    title: Leak\n"; "yaml document")]
    #[test_case(".json", r#"{"topics": [{"uuid": "a", "title": "Leak"}]}"#; "json document")]
    fn reads_topics(suffix: &str, content: &str) {
        let file = file_with(suffix, content);
        let topics = TopicFile::load(file.path()).unwrap();

        assert_eq!(topics.topics.len(), 1);
        assert_eq!(topics.topics[0].title.as_deref(), Some("Leak"));
        assert_eq!(topics.header, HeaderRecord::default());
    }

    #[test]
    fn reads_header_from_document() {
        let file = file_with(
            ".yaml",
            "topics: []\nheader:\n  fileName: house.ifc\n  isExternal: false\n",
        );
        let topics = TopicFile::load(file.path()).unwrap();

        assert_eq!(topics.header.file_name.as_deref(), Some("house.ifc"));
        assert_eq!(topics.header.is_external, Some(false));
    }

    #[test]
    fn header_file_overrides_document_header() {
        let topics = file_with(".json", r#"{"topics": [], "header": {"fileName": "a.ifc"}}"#);
        let header = file_with(".yaml", "fileName: b.ifc\n");

        let file = TopicFile::load(topics.path())
            .unwrap()
            .with_header_from(header.path())
            .unwrap();
        assert_eq!(file.header.file_name.as_deref(), Some("b.ifc"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = file_with(".txt", "[]");
        let error = TopicFile::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("Cannot tell the format"));
    }
}
