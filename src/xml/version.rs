use super::{Options, VERSION_ID, XmlError, schema_location, writer::XmlWriter};

/// Filename of the version document at the root of the container.
pub const FILE_NAME: &str = "bcf.version";

/// Builds the `bcf.version` document.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
/// <Version xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" VersionId="3.0" xsi:noNamespaceSchemaLocation="https://raw.githubusercontent.com/buildingSMART/BCF-XML/release_3_0/Schemas/version.xsd"/>
/// ```
///
/// # Errors
///
/// Returns [`XmlError::Write`] if the writer fails.
pub fn build(options: Options) -> Result<Vec<u8>, XmlError> {
    let mut xml = XmlWriter::new(options.pretty_print)?;
    xml.root(
        "Version",
        &[("VersionId", VERSION_ID)],
        &schema_location("version.xsd"),
        true,
    )?;
    Ok(xml.finish())
}
