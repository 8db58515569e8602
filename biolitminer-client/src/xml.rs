//! Owned XML element tree with path lookups
//!
//! E-utilities responses are semi-structured: optional elements come and go
//! between records, and the same field can live under different paths. The
//! record parser therefore works on a small owned tree and asks it
//! independent optional questions ("first `PMID` below here", "all
//! `AbstractText` under `Abstract`") instead of deserializing into a fixed
//! schema.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{PubMedError, Result};

/// A node in the element tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attributes = start
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                };
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Parse a complete document and return its root element
    ///
    /// Fails on malformed markup (mismatched or unclosed tags), on a
    /// document without a root element and on a second top-level element.
    /// Text with unknown entity references is kept verbatim rather than
    /// failing the document.
    ///
    /// # Example
    ///
    /// ```
    /// use biolitminer_client::xml::XmlElement;
    ///
    /// let root = XmlElement::parse("<a><b>one</b><b>two</b></a>").unwrap();
    /// assert_eq!(root.name(), "a");
    /// assert_eq!(root.children("b").count(), 2);
    /// ```
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().expand_empty_elements = true;

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(e)),
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        PubMedError::XmlError("closing tag without matching opening tag".into())
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(PubMedError::XmlError(format!(
                                "unexpected second root element <{}>",
                                element.name
                            )));
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = match e.unescape() {
                            Ok(text) => text,
                            Err(err) => {
                                debug!(error = %err, "Keeping unresolved entities as-is");
                                Cow::Owned(unescape_known(&String::from_utf8_lossy(e)))
                            }
                        };
                        if !text.is_empty() {
                            parent.children.push(XmlNode::Text(text.into_owned()));
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(PubMedError::XmlError(format!(
                        "malformed XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                // Declarations, doctype, comments and processing instructions
                Ok(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(PubMedError::XmlError(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| PubMedError::XmlError("document has no root element".into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute `name`, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child named `name`
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct children named `name`
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// Follow a slash-separated path of direct children, e.g. `"Journal/Title"`
    ///
    /// At every step the first matching child is taken. Any missing link
    /// yields `None`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// All elements reached by `path` where the last segment may repeat,
    /// e.g. `"AuthorList/Author"`
    pub fn find_all<'a>(&'a self, path: &'a str) -> Vec<&'a XmlElement> {
        let (parent, last) = match path.rsplit_once('/') {
            Some((parent, last)) => (self.find(parent), last),
            None => (Some(self), path),
        };
        parent
            .map(|p| p.children(last).collect())
            .unwrap_or_default()
    }

    /// First descendant (not self) named `name`, depth-first in document order
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (not self) named `name`, in document order
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// All text below this element with whitespace runs collapsed
    ///
    /// Inline markup such as `<i>` or `<sup>` is flattened into the
    /// surrounding text.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    /// [`text`](Self::text), or `None` when it is empty
    pub fn non_empty_text(&self) -> Option<String> {
        let text = self.text();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Decode each `&...;` reference on its own, leaving unknown ones verbatim
fn unescape_known(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let reference = &tail[..=end];
        match unescape(reference) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(reference),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}
