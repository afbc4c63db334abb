//! A small owned XML element tree.
//!
//! Configuration documents are read and written through `xml-rs`; the tree in
//! between keeps attribute order and whitespace so a document that is parsed,
//! extended and written back keeps its original layout.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use xml::escape::{escape_str_attribute, escape_str_pcdata};
use xml::name::OwnedName;
use xml::reader::{ParserConfig, XmlEvent};

use crate::error::{Error, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::append`].
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder form of [`Element::push_text`].
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Like [`Element::attr`], but a missing attribute is an error that
    /// carries this element's serialized form.
    pub fn required_attr(&self, name: &'static str) -> Result<&str> {
        self.attr(name).ok_or_else(|| Error::MissingAttribute {
            tag: self.name.clone(),
            attribute: name,
            element: self.describe(),
        })
    }

    /// Replaces an existing attribute in place, otherwise appends it.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given tag.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Direct children with the given tag, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Every element below this one (not including itself) with the given
    /// tag, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// The element's own text, i.e. its direct text children concatenated.
    /// `None` when there is no text at all.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect();
        (!text.is_empty()).then_some(text)
    }

    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.children.push(Node::Text(text.to_owned())),
        }
    }

    /// Appends `child` and returns a reference to it as it now sits in the
    /// tree.
    pub fn append(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        let index = self.children.len() - 1;
        self.element_at_mut(index)
    }

    /// Returns the first direct child named `name`, creating and appending
    /// an empty one if there is none.
    pub fn ensure_child(&mut self, name: &str) -> &mut Element {
        let position = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(element) if element.name == name));
        match position {
            Some(index) => self.element_at_mut(index),
            None => self.append(Element::new(name)),
        }
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    fn element_at_mut(&mut self, index: usize) -> &mut Element {
        match &mut self.children[index] {
            Node::Element(element) => element,
            Node::Text(_) => unreachable!("index {index} was located as an element"),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let reader = ParserConfig::new()
            .cdata_to_characters(true)
            .ignore_comments(true)
            .create_reader(input.as_bytes());

        let mut stack: Vec<Element> = Vec::new();
        let mut scopes: Vec<BTreeMap<String, String>> = Vec::new();
        let mut root = None;

        for event in reader {
            match event? {
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespace,
                } => {
                    let mut element = Element::new(qualified(&name));
                    for (prefix, uri) in &namespace.0 {
                        let inherited = scopes.last().and_then(|scope| scope.get(prefix));
                        if is_predefined(prefix, uri) || inherited == Some(uri) {
                            continue;
                        }
                        let declaration = if prefix.is_empty() {
                            "xmlns".to_owned()
                        } else {
                            format!("xmlns:{prefix}")
                        };
                        element.attributes.push((declaration, uri.clone()));
                    }
                    for attribute in attributes {
                        element
                            .attributes
                            .push((qualified(&attribute.name), attribute.value));
                    }
                    scopes.push(namespace.0);
                    stack.push(element);
                }
                XmlEvent::EndElement { .. } => {
                    scopes.pop();
                    let Some(element) = stack.pop() else {
                        continue;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&text);
                    }
                }
                _ => {}
            }
        }

        root.ok_or(Error::EmptyDocument)
    }

    /// Serializes this subtree without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_into(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Serializes this element as a whole document, declaration included.
    pub fn write_document<W: Write>(&self, mut sink: W) -> Result<()> {
        sink.write_all(XML_DECLARATION.as_bytes())?;
        self.write_into(&mut sink)
    }

    fn write_into<W: Write>(&self, sink: &mut W) -> Result<()> {
        write!(sink, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(sink, " {key}=\"{}\"", escape_attribute(value))?;
        }
        if self.children.is_empty() {
            sink.write_all(b" />")?;
            return Ok(());
        }
        sink.write_all(b">")?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_into(sink)?,
                Node::Text(text) => sink.write_all(escape_str_pcdata(text).as_bytes())?,
            }
        }
        write!(sink, "</{}>", self.name)?;
        Ok(())
    }

    /// Serialized form used in diagnostics.
    pub fn describe(&self) -> String {
        self.to_xml_string()
            .unwrap_or_else(|_| format!("<{} ...>", self.name))
    }
}

impl FromStr for Element {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn qualified(name: &OwnedName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local_name),
        None => name.local_name.clone(),
    }
}

/// Attribute escaping plus tabs, which a conforming reader would otherwise
/// normalize to spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape_str_attribute(value);
    if escaped.contains('\t') {
        Cow::Owned(escaped.replace('\t', "&#x9;"))
    } else {
        escaped
    }
}

fn is_predefined(prefix: &str, uri: &str) -> bool {
    prefix == "xml" || prefix == "xmlns" || (prefix.is_empty() && uri.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parse_reads_attributes_children_and_text() {
        let root =
            Element::parse(r#"<exec command="ls" workingdir="tmp"><arg>-la</arg><arg>/</arg></exec>"#)
                .unwrap();

        assert_eq!(root.name(), "exec");
        assert_eq!(root.attr("command"), Some("ls"));
        assert_eq!(root.attr("workingdir"), Some("tmp"));
        assert_eq!(root.attr("missing"), None);

        let args: Vec<String> = root.find_all("arg").filter_map(Element::text).collect();
        assert_eq!(args, vec!["-la", "/"]);
    }

    // An element with no text content reports None rather than "".
    #[rstest]
    #[case::self_closing("<arg/>")]
    #[case::open_close("<arg></arg>")]
    fn text_is_none_for_empty_elements(#[case] input: &str) {
        assert_eq!(Element::parse(input).unwrap().text(), None);
    }

    #[rstest]
    fn entities_and_cdata_are_decoded_into_text() {
        let root = Element::parse("<arg>a&amp;b <![CDATA[<x>]]></arg>").unwrap();
        assert_eq!(root.text().as_deref(), Some("a&b <x>"));
    }

    // Values with markup characters must survive a write/parse cycle, both
    // as attributes and as text.
    #[rstest]
    #[case::quote(r#"say "hi""#)]
    #[case::ampersand("fish & chips")]
    #[case::angle_brackets("<x>")]
    #[case::apostrophe("it's")]
    fn special_characters_survive_round_trip(#[case] value: &str) {
        let element = Element::new("exec")
            .with_attr("command", value)
            .with_child(Element::new("arg").with_text(value));

        let written = element.to_xml_string().unwrap();
        let reparsed = Element::parse(&written).unwrap();

        assert_eq!(reparsed.attr("command"), Some(value));
        assert_eq!(
            reparsed.find("arg").and_then(Element::text).as_deref(),
            Some(value)
        );
    }

    #[rstest]
    fn written_output_escapes_text_and_attributes() {
        let element = Element::new("arg")
            .with_attr("note", r#"a"b"#)
            .with_text("a&b <x>");
        let written = element.to_xml_string().unwrap();

        assert!(written.contains("a&amp;b &lt;x&gt;"), "{written}");
        assert!(written.contains("&quot;"), "{written}");
    }

    // Other readers normalize raw tabs and newlines in attribute values to
    // spaces, so both are written as character references.
    #[rstest]
    fn attribute_whitespace_is_written_as_references() {
        let element = Element::new("exec").with_attr("command", "a\nb\tc");
        let written = element.to_xml_string().unwrap();

        assert_eq!(written, r#"<exec command="a&#xA;b&#x9;c" />"#);
        assert_eq!(
            Element::parse(&written).unwrap().attr("command"),
            Some("a\nb\tc")
        );
    }

    #[rstest]
    fn set_attr_replaces_in_place_and_keeps_order() {
        let mut element = Element::new("artifact")
            .with_attr("src", "a")
            .with_attr("dest", "b");
        element.set_attr("src", "c");
        element.set_attr("type", "build");

        let attributes: Vec<(&str, &str)> = element.attributes().collect();
        assert_eq!(
            attributes,
            vec![("src", "c"), ("dest", "b"), ("type", "build")]
        );
    }

    #[rstest]
    fn ensure_child_reuses_existing_container() {
        let mut job = Element::parse("<job><tasks><rake target=\"a\"/></tasks></job>").unwrap();
        job.ensure_child("tasks").append(Element::new("rake"));

        assert_eq!(job.find_all("tasks").count(), 1);
        assert_eq!(job.find("tasks").unwrap().find_all("rake").count(), 2);
    }

    #[rstest]
    fn ensure_child_creates_missing_container() {
        let mut job = Element::new("job");
        job.ensure_child("tasks");

        assert!(job.find("tasks").is_some());
        assert_eq!(job.elements().count(), 1);
    }

    #[rstest]
    fn append_returns_the_inserted_child() {
        let mut parent = Element::new("tasks");
        parent.append(Element::new("exec")).set_attr("command", "make");

        assert_eq!(parent.find("exec").unwrap().attr("command"), Some("make"));
    }

    #[rstest]
    fn descendants_are_found_at_any_depth_in_document_order() {
        let root = Element::parse(
            "<a><property>1</property><configuration><property>2</property></configuration><property>3</property></a>",
        )
        .unwrap();

        let texts: Vec<String> = root
            .descendants("property")
            .into_iter()
            .filter_map(Element::text)
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[rstest]
    fn whitespace_layout_is_preserved() {
        let input = "<job>\n  <tasks>\n    <rake target=\"a\" />\n  </tasks>\n</job>";
        let root = Element::parse(input).unwrap();
        assert_eq!(root.to_xml_string().unwrap(), input);
    }

    #[rstest]
    fn namespace_declarations_are_kept_as_attributes() {
        let input = r#"<cruise xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="cruise-config.xsd"><server /></cruise>"#;
        let root = Element::parse(input).unwrap();

        assert_eq!(
            root.attr("xmlns:xsi"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(
            root.attr("xsi:noNamespaceSchemaLocation"),
            Some("cruise-config.xsd")
        );
        assert!(!root.find("server").unwrap().has_attr("xmlns:xsi"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::unclosed("<job><tasks></job>")]
    #[case::garbage("not xml at all")]
    fn malformed_documents_are_rejected(#[case] input: &str) {
        assert!(Element::parse(input).is_err());
    }

    #[rstest]
    fn required_attr_reports_the_element() {
        let element = Element::new("rake");
        let err = element.required_attr("target").unwrap_err();

        assert!(matches!(
            err,
            Error::MissingAttribute { attribute: "target", .. }
        ));
        assert!(err.to_string().contains("<rake"));
    }
}
