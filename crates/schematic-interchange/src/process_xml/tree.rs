//! A small owned XML element tree.
//!
//! The importer reads the whole document into [`Element`]s first so it can
//! resolve references in any order (shapes after the process, flows before
//! their targets). The exporter builds the same structure and serializes it.

use std::borrow::Cow;

use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::{Diagnostic, DiagnosticCode, ExportError, MalformedInputError},
    process_xml::FORMAT,
    span::{Span, line_col},
};

/// One XML element.
///
/// Imported elements carry local names (`task`, not `bpmn:task`) and the
/// span from the start tag to the end tag. Exported elements carry the
/// qualified name to write.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated, trimmed text content.
    pub text: String,
    pub span: Span,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Value of the attribute with local name `key`.
    pub(crate) fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Parses `text` into its root element.
///
/// Returns `Ok(None)` for a document without any element. Content after the
/// root element is ignored.
pub(crate) fn parse(text: &str) -> Result<Option<Element>, MalformedInputError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let offset = reader.error_position() as usize;
                return Err(malformed(text, Span::at(offset), &err.to_string()));
            }
        };
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(start) => {
                let span = Span::new(end.saturating_sub(start.len() + 2)..end);
                stack.push(open(text, &start, span)?);
            }
            Event::Empty(start) => {
                let span = Span::new(end.saturating_sub(start.len() + 3)..end);
                let element = open(text, &start, span)?;
                close(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(mut element) = stack.pop() {
                    element.span = Span::new(element.span.start()..end);
                    close(&mut stack, &mut root, element);
                }
            }
            Event::Text(content) => {
                if let Some(current) = stack.last_mut() {
                    let value = content
                        .unescape()
                        .map_err(|err| malformed(text, Span::at(end), &err.to_string()))?;
                    current.text.push_str(&value);
                }
            }
            Event::CData(content) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = stack.last() {
        return Err(malformed(
            text,
            unclosed.span,
            &format!("element `{}` is never closed", unclosed.name),
        ));
    }

    Ok(root)
}

/// Serializes `root` as an indented document with an XML declaration.
pub(crate) fn write(root: &Element) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_element(&mut writer, root)?;

    let mut xml =
        String::from_utf8(writer.into_inner()).map_err(|err| ExportError::write(FORMAT, err))?;
    xml.push('\n');
    Ok(xml)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ExportError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        let value = escape_attribute(value);
        start.push_attribute((key.as_bytes(), value.as_bytes()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if !element.text.is_empty() {
        emit(writer, Event::Text(BytesText::new(&element.text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Escapes markup characters and the whitespace that attribute-value
/// normalization would turn into spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|err| ExportError::write(FORMAT, err))
}

fn open(text: &str, start: &BytesStart<'_>, span: Span) -> Result<Element, MalformedInputError> {
    let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
    element.span = span;

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| malformed(text, span, &err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| malformed(text, span, &err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn close(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn malformed(text: &str, span: Span, reason: &str) -> MalformedInputError {
    let (line, column) = line_col(text, span.start());
    Diagnostic::error(format!(
        "malformed XML at line {line}, column {column}: {reason}"
    ))
    .with_code(DiagnosticCode::E001)
    .with_label(span, "here")
    .into()
}
