use serde::{Deserialize, Serialize};

use super::{
    SchemaViolation, Validate, ViolationKind,
    violation::{parse_uuid, required, required_str},
};
use crate::domain::{
    Color, Coloring, Component, Components, InvalidColor, Selection, ViewSetupHints, Visibility,
};

/// A candidate visualisation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ComponentsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub selection: Vec<SelectionRecord>,
    /// Absent means everything visible with no exceptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityRecord>,
    #[serde(default)]
    pub coloring: Vec<ColoringRecord>,
}

/// A candidate selection group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SelectionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// A candidate visibility block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct VisibilityRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_visibility: Option<bool>,
    #[serde(default)]
    pub view_setup_hints: ViewSetupHintsRecord,
    /// The exceptions to `defaultVisibility`.
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// Candidate visibility flags. Absent flags are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ViewSetupHintsRecord {
    #[serde(default)]
    pub spaces_visible: bool,
    #[serde(default)]
    pub space_boundaries_visible: bool,
    #[serde(default)]
    pub openings_visible: bool,
}

/// A candidate colouring group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ColoringRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// A candidate component reference.
///
/// Every field is optional. A component without an IFC GUID passes
/// validation, but is left out of the viewpoint document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ComponentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifc_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originating_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoring_tool_id: Option<String>,
}

fn component_list(records: &[ComponentRecord]) -> Vec<Component> {
    records.iter().map(Component::from).collect()
}

impl Validate for ComponentsRecord {
    type Output = Components;

    fn validate(&self) -> Result<Components, SchemaViolation> {
        let uuid = parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?;

        let selection = self
            .selection
            .iter()
            .enumerate()
            .map(|(i, selection)| {
                selection
                    .validate()
                    .map_err(|e| e.nested(&format!("selection[{i}]")))
            })
            .collect::<Result<_, _>>()?;

        let visibility = self
            .visibility
            .as_ref()
            .map(|visibility| visibility.validate().map_err(|e| e.nested("visibility")))
            .transpose()?
            .unwrap_or_default();

        let coloring = self
            .coloring
            .iter()
            .enumerate()
            .map(|(i, coloring)| {
                coloring
                    .validate()
                    .map_err(|e| e.nested(&format!("coloring[{i}]")))
            })
            .collect::<Result<_, _>>()?;

        Ok(Components {
            uuid,
            selection,
            visibility,
            coloring,
        })
    }
}

impl Validate for SelectionRecord {
    type Output = Selection;

    fn validate(&self) -> Result<Selection, SchemaViolation> {
        Ok(Selection {
            uuid: parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?,
            components: component_list(&self.components),
        })
    }
}

impl Validate for VisibilityRecord {
    type Output = Visibility;

    fn validate(&self) -> Result<Visibility, SchemaViolation> {
        let hints = self.view_setup_hints;
        Ok(Visibility {
            default_visibility: *required(self.default_visibility.as_ref(), "defaultVisibility")?,
            view_setup_hints: ViewSetupHints {
                spaces_visible: hints.spaces_visible,
                space_boundaries_visible: hints.space_boundaries_visible,
                openings_visible: hints.openings_visible,
            },
            components: component_list(&self.components),
        })
    }
}

impl Validate for ColoringRecord {
    type Output = Coloring;

    fn validate(&self) -> Result<Coloring, SchemaViolation> {
        let uuid = parse_uuid(required_str(self.uuid.as_ref(), "uuid")?, "uuid")?;
        let color: Color = required_str(self.color.as_ref(), "color")?
            .parse()
            .map_err(|InvalidColor(color)| {
                SchemaViolation::new("color", ViolationKind::InvalidColor(color))
            })?;
        Ok(Coloring {
            uuid,
            color,
            components: component_list(&self.components),
        })
    }
}

impl From<&ComponentRecord> for Component {
    fn from(record: &ComponentRecord) -> Self {
        Self {
            ifc_guid: record.ifc_guid.clone(),
            originating_system: record.originating_system.clone(),
            authoring_tool_id: record.authoring_tool_id.clone(),
        }
    }
}

impl From<&Component> for ComponentRecord {
    fn from(component: &Component) -> Self {
        Self {
            ifc_guid: component.ifc_guid.clone(),
            originating_system: component.originating_system.clone(),
            authoring_tool_id: component.authoring_tool_id.clone(),
        }
    }
}

fn record_list(components: &[Component]) -> Vec<ComponentRecord> {
    components.iter().map(ComponentRecord::from).collect()
}

impl From<&Components> for ComponentsRecord {
    fn from(components: &Components) -> Self {
        let visibility = &components.visibility;
        let hints = visibility.view_setup_hints;
        Self {
            uuid: Some(components.uuid.to_string()),
            selection: components
                .selection
                .iter()
                .map(|selection| SelectionRecord {
                    uuid: Some(selection.uuid.to_string()),
                    components: record_list(&selection.components),
                })
                .collect(),
            visibility: Some(VisibilityRecord {
                default_visibility: Some(visibility.default_visibility),
                view_setup_hints: ViewSetupHintsRecord {
                    spaces_visible: hints.spaces_visible,
                    space_boundaries_visible: hints.space_boundaries_visible,
                    openings_visible: hints.openings_visible,
                },
                components: record_list(&visibility.components),
            }),
            coloring: components
                .coloring
                .iter()
                .map(|coloring| ColoringRecord {
                    uuid: Some(coloring.uuid.to_string()),
                    color: Some(coloring.color.to_string()),
                    components: record_list(&coloring.components),
                })
                .collect(),
        }
    }
}
