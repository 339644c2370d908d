use super::{Options, XmlError, schema_location, writer::XmlWriter};
use crate::domain::{BcfCamera, Component, Components, Vector3, Viewpoint};

/// What goes into one viewpoint document.
#[derive(Debug, Clone, Copy)]
pub struct Visinfo<'a> {
    /// The viewpoint the document belongs to. Its uuid becomes the
    /// document's `Guid`.
    pub viewpoint: &'a Viewpoint,
    /// The visualisation state captured with the viewpoint.
    pub components: Option<&'a Components>,
    /// The camera, already converted into BCF space.
    pub camera: Option<&'a BcfCamera>,
}

/// Builds a `<viewpoint-uuid>.bcfv` document.
///
/// All selection groups are merged into one `Selection` and every colouring
/// group becomes one `Color`. Components without an IFC GUID are skipped.
///
/// # Errors
///
/// Returns [`XmlError::MissingRequiredSection`] if the components or the
/// camera are absent, and [`XmlError::Write`] if the writer fails.
pub fn build(input: &Visinfo<'_>, options: Options) -> Result<Vec<u8>, XmlError> {
    let components = input
        .components
        .ok_or(XmlError::MissingRequiredSection("Components"))?;
    let camera = input
        .camera
        .ok_or(XmlError::MissingRequiredSection("PerspectiveCamera"))?;

    let mut xml = XmlWriter::new(options.pretty_print)?;
    let guid = input.viewpoint.uuid().to_string();
    xml.root(
        "VisualizationInfo",
        &[("Guid", guid.as_str())],
        &schema_location("visinfo.xsd"),
        false,
    )?;

    write_components(&mut xml, components)?;
    write_camera(&mut xml, camera)?;

    xml.end("VisualizationInfo")?;
    Ok(xml.finish())
}

/// The components that can be written, logging those that cannot.
fn serializable<'a>(components: &'a [Component], group: &str) -> Vec<(&'a str, &'a Component)> {
    let kept: Vec<_> = components
        .iter()
        .filter_map(|component| component.ifc_guid().map(|guid| (guid, component)))
        .collect();
    let skipped = components.len() - kept.len();
    if skipped > 0 {
        tracing::warn!(group, skipped, "skipping components without an IFC GUID");
    }
    kept
}

fn write_component_list(
    xml: &mut XmlWriter,
    components: &[(&str, &Component)],
) -> Result<(), XmlError> {
    for &(guid, component) in components {
        let has_children =
            component.originating_system.is_some() || component.authoring_tool_id.is_some();
        if has_children {
            xml.start("Component", &[("IfcGuid", guid)])?;
            xml.optional_text_element(
                "OriginatingSystem",
                component.originating_system.as_deref(),
            )?;
            xml.optional_text_element("AuthoringToolId", component.authoring_tool_id.as_deref())?;
            xml.end("Component")?;
        } else {
            xml.empty("Component", &[("IfcGuid", guid)])?;
        }
    }
    Ok(())
}

fn write_components(xml: &mut XmlWriter, components: &Components) -> Result<(), XmlError> {
    xml.start("Components", &[])?;

    let selected: Vec<_> = components
        .selection
        .iter()
        .flat_map(|selection| serializable(&selection.components, "Selection"))
        .collect();
    if !selected.is_empty() {
        xml.start("Selection", &[])?;
        write_component_list(xml, &selected)?;
        xml.end("Selection")?;
    }

    let visibility = &components.visibility;
    let hints = visibility.view_setup_hints;
    xml.start(
        "Visibility",
        &[("DefaultVisibility", bool_str(visibility.default_visibility))],
    )?;
    xml.empty(
        "ViewSetupHints",
        &[
            ("SpacesVisible", bool_str(hints.spaces_visible)),
            (
                "SpaceBoundariesVisible",
                bool_str(hints.space_boundaries_visible),
            ),
            ("OpeningsVisible", bool_str(hints.openings_visible)),
        ],
    )?;
    let exceptions = serializable(&visibility.components, "Exceptions");
    if !exceptions.is_empty() {
        xml.start("Exceptions", &[])?;
        write_component_list(xml, &exceptions)?;
        xml.end("Exceptions")?;
    }
    xml.end("Visibility")?;

    let colors: Vec<_> = components
        .coloring
        .iter()
        .map(|coloring| (coloring.color.as_str(), serializable(&coloring.components, "Coloring")))
        .filter(|(_, components)| !components.is_empty())
        .collect();
    if !colors.is_empty() {
        xml.start("Coloring", &[])?;
        for (color, components) in &colors {
            xml.start("Color", &[("Color", *color)])?;
            xml.start("Components", &[])?;
            write_component_list(xml, components)?;
            xml.end("Components")?;
            xml.end("Color")?;
        }
        xml.end("Coloring")?;
    }

    xml.end("Components")
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn write_vector(xml: &mut XmlWriter, name: &str, [x, y, z]: Vector3) -> Result<(), XmlError> {
    xml.start(name, &[])?;
    xml.text_element("X", &x.to_string())?;
    xml.text_element("Y", &y.to_string())?;
    xml.text_element("Z", &z.to_string())?;
    xml.end(name)
}

fn write_camera(xml: &mut XmlWriter, camera: &BcfCamera) -> Result<(), XmlError> {
    xml.start("PerspectiveCamera", &[])?;
    write_vector(xml, "CameraViewPoint", camera.position)?;
    write_vector(xml, "CameraDirection", camera.direction)?;
    write_vector(xml, "CameraUpVector", camera.up)?;
    xml.text_element("FieldOfView", &camera.field_of_view.to_string())?;
    xml.text_element("AspectRatio", &camera.aspect_ratio.to_string())?;
    xml.end("PerspectiveCamera")
}
