//! Candidate records arrive as loosely typed `camelCase` structures, from the
//! worker protocol or from topic files. Validation checks their shape field by
//! field and produces the corresponding domain type. It does not check
//! relations between records.

mod components;
pub use components::{
    ColoringRecord, ComponentRecord, ComponentsRecord, SelectionRecord, ViewSetupHintsRecord,
    VisibilityRecord,
};

mod header;
pub use header::HeaderRecord;

mod topic;
pub use topic::{
    ASPECT_RATIO_RANGE, CameraRecord, CommentRecord, FIELD_OF_VIEW_RANGE, TopicRecord,
    ViewpointRecord,
};

mod violation;
pub use violation::{SchemaViolation, ViolationKind};

/// Check-or-reject conversion of a candidate record into its domain type.
pub trait Validate {
    /// The validated domain type.
    type Output;

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found. Its path is relative to
    /// the record.
    fn validate(&self) -> Result<Self::Output, SchemaViolation>;
}
