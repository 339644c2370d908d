use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use super::{XSI_NAMESPACE, XmlError};

/// An element-at-a-time writer for one standalone UTF-8 document.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts a document with a `standalone="yes"` declaration.
    pub fn new(pretty_print: bool) -> Result<Self, XmlError> {
        let inner = if pretty_print {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        let mut writer = Self { inner };
        writer.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(writer)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.inner
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))
    }

    fn element<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut element = BytesStart::new(name);
        for &attribute in attributes {
            element.push_attribute(attribute);
        }
        element
    }

    /// Opens the root element, declaring the XSI namespace and pointing
    /// `xsi:noNamespaceSchemaLocation` at `schema`.
    ///
    /// `attributes` are written between the namespace declaration and the
    /// schema location.
    pub fn root(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        schema: &str,
        empty: bool,
    ) -> Result<(), XmlError> {
        let mut element = Self::element(name, &[("xmlns:xsi", XSI_NAMESPACE)]);
        for &attribute in attributes {
            element.push_attribute(attribute);
        }
        element.push_attribute(("xsi:noNamespaceSchemaLocation", schema));
        if empty {
            self.write(Event::Empty(element))
        } else {
            self.write(Event::Start(element))
        }
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmlError> {
        self.write(Event::Start(Self::element(name, attributes)))
    }

    pub fn end(&mut self, name: &str) -> Result<(), XmlError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmlError> {
        self.write(Event::Empty(Self::element(name, attributes)))
    }

    /// `<name>text</name>`, with the text escaped.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), XmlError> {
        self.start(name, &[])?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Like [`text_element`](Self::text_element), but writes nothing for
    /// `None`.
    pub fn optional_text_element(&mut self, name: &str, text: Option<&str>) -> Result<(), XmlError> {
        text.map_or(Ok(()), |text| self.text_element(name, text))
    }

    pub fn finish(self) -> Vec<u8> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        bytes
    }
}
