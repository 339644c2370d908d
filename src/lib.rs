//! BIM Collaboration Format containers
//!
//! Issue records ("topics") are validated, converted into BCF 3.0 XML
//! documents and packed into a `.bcf` ZIP container on a background worker.

pub mod domain;
pub use domain::{
    BcfCamera, CameraState, Comment, Components, Config, Extension, Header, Topic, TopicStatus,
    TopicStore, TopicType, Viewpoint,
};

/// Validation of candidate records into domain types.
pub mod schema;
pub use schema::{SchemaViolation, TopicRecord, Validate};

/// XML document builders for `bcf.version`, `markup.bcf` and `.bcfv` files.
pub mod xml;

/// Assembly of the ZIP container.
pub mod container;
pub use container::{Assembler, AssemblyError};

/// Background execution context and its message protocol.
pub mod worker;
pub use worker::Transport;

mod client;
pub use client::{Client, ClientError, DirectorySaver, SavedContainer, Saver};
