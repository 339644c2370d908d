use super::{Options, XmlError, schema_location, writer::XmlWriter};
use crate::domain::{Comment, Header, Topic, Viewpoint, topic::format_timestamp};

/// Filename of the markup document inside a topic folder.
pub const FILE_NAME: &str = "markup.bcf";

/// Builds a topic's `markup.bcf` document.
///
/// Only the topic's first viewpoint is listed under `Viewpoints`. Optional
/// elements with no value, and list wrappers with no entries, are left out.
///
/// # Errors
///
/// Returns [`XmlError::Write`] if the writer fails.
pub fn build(topic: &Topic, header: &Header, options: Options) -> Result<Vec<u8>, XmlError> {
    let mut xml = XmlWriter::new(options.pretty_print)?;
    xml.root("Markup", &[], &schema_location("markup.xsd"), false)?;

    write_header(&mut xml, header)?;

    let guid = topic.uuid().to_string();
    xml.start(
        "Topic",
        &[
            ("Guid", guid.as_str()),
            ("TopicType", topic.topic_type().as_str()),
            ("TopicStatus", topic.topic_status().as_str()),
        ],
    )?;
    xml.text_element("Title", topic.title())?;
    xml.text_element("Index", &topic.index().to_string())?;
    xml.text_element("CreationDate", &format_timestamp(&topic.creation().date))?;
    xml.text_element("CreationAuthor", &topic.creation().author)?;
    xml.text_element("ModifiedDate", &format_timestamp(&topic.modified().date))?;
    xml.text_element("ModifiedAuthor", &topic.modified().author)?;
    xml.optional_text_element("DueDate", topic.due_date().map(format_timestamp).as_deref())?;
    xml.optional_text_element("AssignedTo", topic.assigned_to())?;
    xml.optional_text_element("Description", topic.description())?;

    if !topic.comments().is_empty() {
        xml.start("Comments", &[])?;
        for comment in topic.comments() {
            write_comment(&mut xml, comment)?;
        }
        xml.end("Comments")?;
    }

    if let Some(viewpoint) = topic.first_viewpoint() {
        xml.start("Viewpoints", &[])?;
        write_viewpoint(&mut xml, viewpoint)?;
        xml.end("Viewpoints")?;
    }

    xml.end("Topic")?;
    xml.end("Markup")?;
    Ok(xml.finish())
}

fn write_header(xml: &mut XmlWriter, header: &Header) -> Result<(), XmlError> {
    let project = header.ifc_project.as_ref().map(ToString::to_string);
    let spatial = header
        .ifc_spatial_structure_element
        .as_ref()
        .map(ToString::to_string);

    let mut attributes = Vec::with_capacity(3);
    if let Some(project) = &project {
        attributes.push(("IfcProject", project.as_str()));
    }
    if let Some(spatial) = &spatial {
        attributes.push(("IfcSpatialStructureElement", spatial.as_str()));
    }
    attributes.push(("IsExternal", if header.is_external { "true" } else { "false" }));

    xml.start("Header", &[])?;
    xml.start("Files", &[])?;
    xml.start("File", &attributes)?;
    xml.optional_text_element("Filename", header.file_name.as_deref())?;
    xml.optional_text_element("Date", header.date.as_ref().map(format_timestamp).as_deref())?;
    xml.optional_text_element("Reference", header.reference.as_deref())?;
    xml.end("File")?;
    xml.end("Files")?;
    xml.end("Header")
}

fn write_comment(xml: &mut XmlWriter, comment: &Comment) -> Result<(), XmlError> {
    let guid = comment.uuid().to_string();
    xml.start("Comment", &[("Guid", guid.as_str())])?;
    xml.text_element("Date", &format_timestamp(comment.date()))?;
    xml.text_element("Author", comment.author())?;
    xml.optional_text_element("Comment", comment.text())?;
    if let Some(viewpoint) = comment.viewpoint() {
        xml.empty("Viewpoint", &[("Guid", viewpoint.to_string().as_str())])?;
    }
    xml.optional_text_element(
        "ModifiedDate",
        comment.modified_date().map(format_timestamp).as_deref(),
    )?;
    xml.optional_text_element("ModifiedAuthor", comment.modified_author())?;
    xml.end("Comment")
}

fn write_viewpoint(xml: &mut XmlWriter, viewpoint: &Viewpoint) -> Result<(), XmlError> {
    let guid = viewpoint.uuid().to_string();
    xml.start("ViewPoint", &[("Guid", guid.as_str())])?;
    xml.text_element("Viewpoint", viewpoint.viewpoint_file())?;
    xml.text_element("Snapshot", viewpoint.snapshot_file())?;
    xml.text_element("Index", &viewpoint.index().to_string())?;
    xml.end("ViewPoint")
}
