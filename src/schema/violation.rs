use chrono::{DateTime, NaiveDateTime};
use uuid::Uuid;

use crate::domain::Timestamp;

/// A candidate record does not have the shape of a BCF entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("schema violation at `{path}`: {kind}")]
pub struct SchemaViolation {
    /// Path to the offending field, e.g. `comments[1].uuid`.
    pub path: String,
    /// What is wrong with it.
    pub kind: ViolationKind,
}

/// The ways a field can violate the schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViolationKind {
    /// A required field is absent.
    #[error("required field is missing")]
    Missing,

    /// A required string is empty.
    #[error("must not be empty")]
    Empty,

    /// The value is not a UUID.
    #[error("'{0}' is not a valid UUID")]
    InvalidUuid(String),

    /// The value is not an ISO 8601 date-time.
    #[error("'{0}' is not an ISO 8601 date-time")]
    InvalidDate(String),

    /// A number lies outside its declared range.
    #[error("{value} is outside the range {min}..={max}")]
    OutOfRange {
        /// The value given.
        value: f64,
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
    },

    /// The value is not one of a closed set of names.
    #[error("unknown value '{value}', expected one of: {expected}")]
    UnknownVariant {
        /// The value given.
        value: String,
        /// The accepted values, comma separated.
        expected: String,
    },

    /// The value is not a 6 or 8 digit hexadecimal colour.
    #[error("'{0}' is not a 6 or 8 digit hexadecimal colour")]
    InvalidColor(String),

    /// The value is neither a UUID nor a compressed IFC GUID.
    #[error("'{0}' is neither a UUID nor a compressed IFC GUID")]
    InvalidIfcId(String),

    /// A comment has neither text nor a viewpoint reference.
    #[error("a comment needs text, a viewpoint reference, or both")]
    EmptyComment,

    /// An index is negative.
    #[error("index {0} is negative")]
    NegativeIndex(i64),

    /// A number is NaN or infinite.
    #[error("value is not finite")]
    NotFinite,

    /// A file name would not land as a plain file inside its topic folder.
    #[error("'{0}' is not a plain file name inside the topic folder")]
    InvalidFileName(String),
}

impl SchemaViolation {
    /// A violation of `kind` at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Prefixes the path with the field that contains it.
    #[must_use]
    pub fn nested(mut self, parent: &str) -> Self {
        self.path = if self.path.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.path)
        };
        self
    }
}

/// A required field.
pub fn required<'a, T>(value: Option<&'a T>, field: &str) -> Result<&'a T, SchemaViolation> {
    value.ok_or_else(|| SchemaViolation::new(field, ViolationKind::Missing))
}

/// A required, non-empty string.
pub fn required_str<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, SchemaViolation> {
    let value = required(value, field)?;
    if value.is_empty() {
        return Err(SchemaViolation::new(field, ViolationKind::Empty));
    }
    Ok(value)
}

/// An optional string. Empty counts as absent.
pub fn optional_str(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

/// Parses a hyphenated UUID.
pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid, SchemaViolation> {
    Uuid::parse_str(value)
        .map_err(|_| SchemaViolation::new(field, ViolationKind::InvalidUuid(value.to_string())))
}

/// A required file name that stays inside the topic folder.
///
/// Separators and `..` are rejected, and so is `reserved`, the name of the
/// folder's markup document.
pub fn file_name<'a>(
    value: Option<&'a String>,
    reserved: &str,
    field: &str,
) -> Result<&'a str, SchemaViolation> {
    let value = required_str(value, field)?;
    if value.contains(['/', '\\']) || value.contains("..") || value == reserved {
        return Err(SchemaViolation::new(
            field,
            ViolationKind::InvalidFileName(value.to_string()),
        ));
    }
    Ok(value)
}

/// Parses an `xs:dateTime`.
///
/// The offset may be written with or without a colon. Values without an
/// offset are taken to be UTC.
pub fn parse_date(value: &str, field: &str) -> Result<Timestamp, SchemaViolation> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .map_err(|_| SchemaViolation::new(field, ViolationKind::InvalidDate(value.to_string())))
}

/// An optional `xs:dateTime`. Empty counts as absent.
pub fn optional_date(value: Option<&String>, field: &str) -> Result<Option<Timestamp>, SchemaViolation> {
    optional_str(value)
        .map(|s| parse_date(&s, field))
        .transpose()
}

/// A non-negative sort index.
pub fn parse_index(value: i64, field: &str) -> Result<usize, SchemaViolation> {
    usize::try_from(value).map_err(|_| SchemaViolation::new(field, ViolationKind::NegativeIndex(value)))
}

/// A finite number within `min..=max`.
pub fn check_range(value: f64, min: f64, max: f64, field: &str) -> Result<f64, SchemaViolation> {
    if !value.is_finite() {
        return Err(SchemaViolation::new(field, ViolationKind::NotFinite));
    }
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SchemaViolation::new(
            field,
            ViolationKind::OutOfRange { value, min, max },
        ))
    }
}
