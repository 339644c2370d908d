use serde::{Deserialize, Serialize};

use super::{
    SchemaViolation, Validate, ViolationKind,
    violation::{optional_date, optional_str},
};
use crate::domain::{Header, IfcId, InvalidIfcId, topic::format_timestamp};

/// A candidate container header.
///
/// Every field is optional; an empty record describes an external model
/// file with nothing else known about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct HeaderRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifc_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifc_spatial_structure_element: Option<String>,
    /// Defaults to `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_external: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

fn ifc_id(value: Option<&String>, field: &str) -> Result<Option<IfcId>, SchemaViolation> {
    optional_str(value)
        .map(|s| {
            s.parse().map_err(|InvalidIfcId(id)| {
                SchemaViolation::new(field, ViolationKind::InvalidIfcId(id))
            })
        })
        .transpose()
}

impl Validate for HeaderRecord {
    type Output = Header;

    fn validate(&self) -> Result<Header, SchemaViolation> {
        Ok(Header {
            ifc_project: ifc_id(self.ifc_project.as_ref(), "ifcProject")?,
            ifc_spatial_structure_element: ifc_id(
                self.ifc_spatial_structure_element.as_ref(),
                "ifcSpatialStructureElement",
            )?,
            is_external: self.is_external.unwrap_or(true),
            file_name: optional_str(self.file_name.as_ref()),
            date: optional_date(self.date.as_ref(), "date")?,
            reference: optional_str(self.reference.as_ref()),
        })
    }
}

impl From<&Header> for HeaderRecord {
    fn from(header: &Header) -> Self {
        Self {
            ifc_project: header.ifc_project.as_ref().map(ToString::to_string),
            ifc_spatial_structure_element: header
                .ifc_spatial_structure_element
                .as_ref()
                .map(ToString::to_string),
            is_external: Some(header.is_external),
            file_name: header.file_name.clone(),
            date: header.date.as_ref().map(format_timestamp),
            reference: header.reference.clone(),
        }
    }
}
