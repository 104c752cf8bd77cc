//! Mutable XML document trees for collection files.
//!
//! This module is the document I/O layer: it parses a collection file into an
//! owned, mutable [`Element`] tree, lets callers build and rearrange child
//! elements, and serializes the tree back out with a UTF-8 declaration and
//! normalized indentation.
//!
//! Whitespace-only text nodes are dropped at parse time; they are formatting
//! artifacts that the serializer recreates. All other text is kept verbatim
//! (entities unescaped on read, re-escaped on write). Elements with mixed or
//! text content are rendered inline so pretty-printing never alters
//! significant text.

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use tracing::debug;

use crate::errors::XmlError;

const INDENT_WIDTH: usize = 2;

// ---------------------------------------------------------------------------
// Tree model
// ---------------------------------------------------------------------------

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An XML element: name, attributes in document order, ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a named child element with optional text content and return a
    /// mutable reference to it.
    pub fn append_simple(&mut self, name: &str, text: Option<&str>) -> &mut Element {
        let mut child = Element::new(name);
        if let Some(t) = text {
            child.children.push(Node::Text(t.to_string()));
        }
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(e)) => e,
            _ => unreachable!("just pushed an element"),
        }
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child element with the given name.
    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|c| match c {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Mutable variant of [`Element::child_named`].
    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// All direct child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter_map(move |c| match c {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// First direct text chunk of this element (the text before any child
    /// element), if any.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|c| match c {
            Node::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Replace the first direct text chunk, or insert one if the element has
    /// no text yet.
    pub fn set_text(&mut self, value: impl Into<String>) {
        let value = value.into();
        for child in self.children.iter_mut() {
            if let Node::Text(t) = child {
                *t = value;
                return;
            }
        }
        self.children.insert(0, Node::Text(value));
    }

    fn has_text_child(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Text(_)))
    }
}

/// A parsed collection document: the root element of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Read and parse a collection file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Document, XmlError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = contents.len(), "parsing collection file");
        Document::parse(&contents)
    }

    /// Parse a document from a string.
    pub fn parse(text: &str) -> Result<Document, XmlError> {
        let mut reader = Reader::from_reader(text.as_bytes());
        // The tree builder checks tag nesting itself and reports which
        // element was open when the mismatch happened.
        reader.check_end_names(false);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(element_from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Ok(Event::End(e)) => {
                    let found = decode_name(e.name().as_ref())?;
                    let el = stack.pop().ok_or_else(|| {
                        XmlError::Parse(format!("unexpected closing tag </{}>", found))
                    })?;
                    if el.name != found {
                        return Err(XmlError::MismatchedTag {
                            expected: el.name,
                            found,
                        });
                    }
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|e| XmlError::Parse(e.to_string()))?;
                    // Whitespace-only nodes are indentation; drop them.
                    if !text.trim().is_empty() {
                        attach(&mut stack, &mut root, Node::Text(text.into_owned()))?;
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    attach(&mut stack, &mut root, Node::Text(text))?;
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    attach(&mut stack, &mut root, Node::Comment(text))?;
                }
                // Declaration metadata is regenerated on write; doctypes and
                // processing instructions are not used by collection files.
                Ok(Event::Decl(_)) | Ok(Event::DocType(_)) | Ok(Event::PI(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(XmlError::Parse(e.to_string())),
            }
            buf.clear();
        }

        if let Some(el) = stack.pop() {
            return Err(XmlError::Parse(format!("unclosed element <{}>", el.name)));
        }
        root.map(|root| Document { root })
            .ok_or(XmlError::NoRootElement)
    }

    /// Serialize with a UTF-8 XML declaration and normalized indentation.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(serialize_err)?;
        write_raw(&mut writer, "\n")?;
        write_element(&mut writer, &self.root, Some(0))?;
        write_raw(&mut writer, "\n")?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Serialize(e.to_string()))
    }

    /// Serialize the document and write it to `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), XmlError> {
        let path = path.as_ref();
        let output = self.to_xml_string()?;
        std::fs::write(path, &output)?;
        debug!(path = %path.display(), bytes = output.len(), "wrote collection file");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn decode_name(raw: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| XmlError::Parse(format!("invalid UTF-8 in name: {}", e)))
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element, XmlError> {
    let mut el = Element::new(decode_name(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
        let key = decode_name(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Parse(e.to_string()))?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

/// Attach a completed node to the element currently open, or make it the
/// root when the stack is empty. Text and comments outside the root are
/// dropped.
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, node: Node) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => match node {
            Node::Element(el) => {
                if root.is_some() {
                    return Err(XmlError::Parse("multiple root elements".into()));
                }
                *root = Some(el);
                Ok(())
            }
            Node::Text(_) | Node::Comment(_) => Ok(()),
        },
    }
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn serialize_err(e: impl std::fmt::Display) -> XmlError {
    XmlError::Serialize(e.to_string())
}

fn write_raw<W: Write>(writer: &mut Writer<W>, raw: &str) -> Result<(), XmlError> {
    writer
        .write_event(Event::Text(BytesText::from_escaped(raw)))
        .map_err(serialize_err)
}

fn write_indent<W: Write>(writer: &mut Writer<W>, depth: usize) -> Result<(), XmlError> {
    let mut raw = String::with_capacity(1 + depth * INDENT_WIDTH);
    raw.push('\n');
    for _ in 0..depth * INDENT_WIDTH {
        raw.push(' ');
    }
    write_raw(writer, &raw)
}

/// Write one element. `indent` carries the current nesting depth when the
/// element is part of indented structure, or `None` when inside inline
/// (mixed) content. Elements that contain any text are always rendered
/// inline so significant text is never padded with whitespace.
fn write_element<W: Write>(
    writer: &mut Writer<W>,
    el: &Element,
    indent: Option<usize>,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(serialize_err);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(serialize_err)?;

    match indent {
        Some(depth) if !el.has_text_child() => {
            for child in &el.children {
                write_indent(writer, depth + 1)?;
                match child {
                    Node::Element(e) => write_element(writer, e, Some(depth + 1))?,
                    Node::Comment(c) => writer
                        .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                        .map_err(serialize_err)?,
                    // has_text_child() was false
                    Node::Text(_) => unreachable!("text child in element-only content"),
                }
            }
            write_indent(writer, depth)?;
        }
        _ => {
            for child in &el.children {
                match child {
                    Node::Element(e) => write_element(writer, e, None)?,
                    Node::Text(t) => writer
                        .write_event(Event::Text(BytesText::new(t)))
                        .map_err(serialize_err)?,
                    Node::Comment(c) => writer
                        .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                        .map_err(serialize_err)?,
                }
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(serialize_err)
}
