//! A small owned XML element tree
//!
//! Project files are read with `quick-xml` into plain [`Element`] values so
//! the rest of the crate can use explicit, optional-returning lookups instead
//! of walking reader events.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DocumentError, Result};

/// One XML element with its attributes, direct text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: HashMap<String, String>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute (builder style)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append text content (builder style)
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Append a child element (builder style)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Tag name, including any namespace prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Look up an attribute value by exact name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Concatenated text and CDATA content directly inside this element.
    ///
    /// Text of nested elements is not included.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given tag name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a complete XML document and return its root element.
    ///
    /// The parse is generic: no schema or DTD is consulted. Comments,
    /// processing instructions and the XML declaration are dropped.
    pub fn parse_str(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => open.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut open, &mut root, element)?;
                }
                Event::End(e) => {
                    let element = open.pop().ok_or_else(|| {
                        DocumentError::structure(format!(
                            "unexpected end tag </{}> at byte {}",
                            String::from_utf8_lossy(e.name().as_ref()),
                            reader.buffer_position()
                        ))
                    })?;
                    Self::attach(&mut open, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    Self::append_text(&mut open, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e);
                    Self::append_text(&mut open, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(DocumentError::structure(format!(
                "unclosed element <{}>",
                unclosed.name
            )));
        }

        root.ok_or_else(|| DocumentError::structure("no root element"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.insert(key, value);
        }
        Ok(element)
    }

    /// Hand a finished element to its parent, or make it the root.
    fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        if let Some(parent) = open.last_mut() {
            parent.children.push(element);
            return Ok(());
        }
        if root.is_some() {
            return Err(DocumentError::structure(format!(
                "second root element <{}>",
                element.name
            )));
        }
        *root = Some(element);
        Ok(())
    }

    fn append_text(open: &mut [Element], text: &str) -> Result<()> {
        match open.last_mut() {
            Some(current) => current.push_text(text),
            None if text.trim().is_empty() => {}
            None => return Err(DocumentError::structure("text outside the root element")),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }
}
