use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use uuid::Uuid;

use crate::domain::Timestamp;

static IFC_GUID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-3][0-9A-Za-z_$]{21}$").expect("valid regex"));

/// An identifier of an IFC entity, either as a UUID or in the 22 character
/// compressed `IfcGloballyUniqueId` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IfcId {
    /// A hyphenated UUID.
    Uuid(Uuid),
    /// A compressed IFC GUID such as `16ptFjkWnCdh4kqFvB0NRX`.
    Compressed(String),
}

/// The string is neither a UUID nor a compressed IFC GUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is neither a UUID nor a compressed IFC GUID")]
pub struct InvalidIfcId(pub String);

impl FromStr for IfcId {
    type Err = InvalidIfcId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if IFC_GUID_PATTERN.is_match(s) {
            return Ok(Self::Compressed(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self::Uuid)
            .map_err(|_| InvalidIfcId(s.to_string()))
    }
}

impl fmt::Display for IfcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Compressed(guid) => f.write_str(guid),
        }
    }
}

/// Describes the model file the container's topics relate to.
///
/// One header is shared by every topic in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The `IfcProject` the topics relate to.
    pub ifc_project: Option<IfcId>,
    /// The spatial structure element (e.g. a storey) the topics relate to.
    pub ifc_spatial_structure_element: Option<IfcId>,
    /// Whether the model file lives outside the container.
    pub is_external: bool,
    /// The model file name, from the IFC header's `FILE_NAME`.
    pub file_name: Option<String>,
    /// The model file date, from the IFC header's `FILE_NAME`.
    pub date: Option<Timestamp>,
    /// URI of the model file.
    pub reference: Option<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            ifc_project: None,
            ifc_spatial_structure_element: None,
            is_external: true,
            file_name: None,
            date: None,
            reference: None,
        }
    }
}
