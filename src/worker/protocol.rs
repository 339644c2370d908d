use serde::{Deserialize, Serialize};

use crate::{
    container::{AssemblyError, FailureKind, TopicRef},
    schema::{HeaderRecord, TopicRecord},
};

/// Payload of the handshake reply.
pub const HANDSHAKE_DATA: &str = "test";

/// A message to the worker.
///
/// ```json
/// { "type": "test" }
/// { "type": "begin", "topics": [...], "header": {...} }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Liveness check.
    Test,
    /// Build a container.
    Begin {
        /// The topics, in folder order.
        topics: Vec<TopicRecord>,
        /// The project header.
        #[serde(default)]
        header: HeaderRecord,
    },
}

/// A message from the worker.
///
/// The archive bytes of a `begin` reply are base64 encoded when serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    /// Reply to [`Request::Test`].
    Test {
        /// Always [`HANDSHAKE_DATA`].
        data: String,
    },
    /// The finished container.
    Begin {
        /// The ZIP archive.
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    /// The build failed.
    Error {
        /// What went wrong.
        error: BuildFailure,
    },
}

impl Response {
    /// The message tag, as it appears in the `type` field.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Test { .. } => "test",
            Self::Begin { .. } => "begin",
            Self::Error { .. } => "error",
        }
    }
}

/// A build failure, flattened so it can cross the worker boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BuildFailure {
    /// Classification of the failure.
    pub kind: FailureKind,
    /// Human readable description.
    pub message: String,
    /// The failing topic, if the failure is topic-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicRef>,
}

impl BuildFailure {
    /// A failure that is not the fault of the input.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Internal,
            message: message.into(),
            topic: None,
        }
    }
}

impl From<&AssemblyError> for BuildFailure {
    fn from(error: &AssemblyError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            topic: error.topic().cloned(),
        }
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
