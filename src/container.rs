//! A container holds `bcf.version` at its root and one folder per topic,
//! named by the topic's uuid:
//!
//! ```text
//! bcf.version
//! <topic-uuid>/
//!     markup.bcf
//!     <viewpoint-uuid>.bcfv
//!     <viewpoint-uuid>.png
//! ```
//!
//! Building is all-or-nothing. If any topic fails, no archive is produced.

use std::{fmt, io};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zip::result::ZipError;

use crate::{
    domain::InvalidCameraState,
    schema::{SchemaViolation, ViolationKind},
    xml::XmlError,
};

mod assembler;
pub use assembler::Assembler;

/// Decoding of snapshot images.
pub mod snapshot;
pub use snapshot::InvalidImageData;

/// Identifies the topic a build failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    /// Position of the topic in the build request.
    pub position: usize,
    /// The topic's uuid, as given.
    pub uuid: Option<String>,
}

impl fmt::Display for TopicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uuid {
            Some(uuid) => write!(f, "#{} ({uuid})", self.position),
            None => write!(f, "#{}", self.position),
        }
    }
}

/// Why a single topic could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum TopicError {
    /// The record failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    /// The camera could not be converted.
    #[error(transparent)]
    Camera(#[from] InvalidCameraState),

    /// A document could not be built.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The snapshot could not be decoded.
    #[error(transparent)]
    Image(#[from] InvalidImageData),
}

/// A container could not be built.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// One of the topics failed.
    #[error("topic {topic}: {source}")]
    Topic {
        /// The failing topic.
        topic: TopicRef,
        /// What went wrong.
        #[source]
        source: TopicError,
    },

    /// The header failed validation.
    #[error("header: {0}")]
    Header(#[source] SchemaViolation),

    /// Two topics share a uuid, so they would share a folder.
    #[error("more than one topic has uuid {0}")]
    DuplicateTopic(Uuid),

    /// The version document could not be built.
    #[error("failed to build bcf.version: {0}")]
    Version(#[source] XmlError),

    /// The archive could not be written.
    #[error("failed to write archive: {0}")]
    Zip(#[from] ZipError),

    /// The archive could not be written.
    #[error("failed to write archive: {0}")]
    Io(#[from] io::Error),
}

/// A coarse classification of build failures, stable across the worker
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// A record has a bad or missing field.
    SchemaViolation,
    /// A camera has non-finite components.
    InvalidCameraState,
    /// A document lacks a structure it requires.
    MissingRequiredSection,
    /// A snapshot could not be decoded.
    InvalidImageData,
    /// The archive could not be written.
    Archive,
    /// The worker failed unexpectedly.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SchemaViolation => "schema violation",
            Self::InvalidCameraState => "invalid camera state",
            Self::MissingRequiredSection => "missing required section",
            Self::InvalidImageData => "invalid image data",
            Self::Archive => "archive error",
            Self::Internal => "internal error",
        })
    }
}

impl TopicError {
    /// The failure's classification.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Schema(_) => FailureKind::SchemaViolation,
            Self::Camera(_) => FailureKind::InvalidCameraState,
            Self::Xml(XmlError::MissingRequiredSection(_)) => FailureKind::MissingRequiredSection,
            Self::Xml(XmlError::Write(_)) => FailureKind::Archive,
            Self::Image(_) => FailureKind::InvalidImageData,
        }
    }
}

impl AssemblyError {
    /// The failure's classification.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Topic { source, .. } => source.kind(),
            Self::Header(_) => FailureKind::SchemaViolation,
            Self::DuplicateTopic(_) | Self::Version(_) | Self::Zip(_) | Self::Io(_) => {
                FailureKind::Archive
            }
        }
    }

    /// The topic the failure belongs to, if it is topic-scoped.
    #[must_use]
    pub const fn topic(&self) -> Option<&TopicRef> {
        match self {
            Self::Topic { topic, .. } => Some(topic),
            _ => None,
        }
    }

    pub(crate) fn topic_error(topic: TopicRef, source: impl Into<TopicError>) -> Self {
        Self::Topic {
            topic,
            source: source.into(),
        }
    }

    /// Whether the failure is a schema violation of the given kind.
    #[must_use]
    pub fn is_violation(&self, kind: &ViolationKind) -> bool {
        match self {
            Self::Topic {
                source: TopicError::Schema(violation),
                ..
            }
            | Self::Header(violation) => &violation.kind == kind,
            _ => false,
        }
    }
}
