//! Domain models for BCF topics.
//!
//! This module contains the validated shape of every BCF entity (topics,
//! comments, viewpoints, component visualisation state, the container
//! header), the viewer-to-BCF camera conversion and the configuration.

/// Camera state capture and conversion into BCF space.
pub mod camera;
pub use camera::{BcfCamera, CameraState, InvalidCameraState, Vector3};

mod comment;
pub use comment::{Comment, EmptyComment};

/// Component references and their selection, visibility and colouring.
pub mod components;
pub use components::{
    Color, Coloring, Component, Components, InvalidColor, Selection, ViewSetupHints, Visibility,
};

mod config;
pub use config::{Compression, Config, ConfigError, Extension};

mod header;
pub use header::{Header, IfcId, InvalidIfcId};

/// The topic (issue) record.
pub mod topic;
pub use topic::{Stamp, Timestamp, Topic, TopicStatus, TopicType};

/// The foreground collection of topics.
pub mod topics;
pub use topics::{StoreError, TopicDraft, TopicStore, TopicUpdate, ViewpointCapture};

mod viewpoint;
pub use viewpoint::Viewpoint;
