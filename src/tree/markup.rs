// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! XML adapter.
//!
//! Parsing leans on `roxmltree` and folds each element into a [`Node`]:
//! attributes become `@name` entries, non-blank text becomes `#text`, and
//! child elements are grouped by tag (a repeated tag turns into a
//! sequence).  Plain leaf elements collapse to a string scalar.  Writing
//! goes the other way through [`XmlElement`] and `quick-xml`, which is
//! also what the structure renamer emits.

use super::{Node, is_xml_char, is_xml_name};
use crate::error::{ObfuscateError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use roxmltree::Document;
use std::io::Write;
use std::path::Path;

pub const ATTRIBUTE_PREFIX: char = '@';
pub const TEXT_KEY: &str = "#text";

/// Output element tree.  Leaves carry text, containers carry children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn container(tag: impl Into<String>, children: Vec<XmlElement>) -> Self {
        Self {
            tag: tag.into(),
            children,
            ..Self::default()
        }
    }
}

/// Parse an XML document into a one-entry mapping keyed by the root tag.
///
/// Depth is counted in tree levels, the same unit the walker uses: the
/// root mapping is level 0, the root element's content level 1, and a
/// run of repeated tags adds a sequence level above its items.
pub fn parse_markup(text: &str, path: &Path, max_depth: usize) -> Result<Node> {
    check_nesting(text, path, max_depth)?;
    let doc = Document::parse(text).map_err(|err| ObfuscateError::malformed(path, err))?;
    let root = doc.root_element();
    let content = element_to_node(root, 1, max_depth)?;
    Ok(Node::Mapping(vec![(
        root.tag_name().name().to_string(),
        content,
    )]))
}

/// Stream the document once and bail out as soon as element nesting goes
/// past `max_depth`.  roxmltree recurses per level while building its
/// tree, so this has to run first.  Element depth never exceeds tree
/// depth, so anything rejected here would be rejected later anyway.
fn check_nesting(text: &str, path: &Path, max_depth: usize) -> Result<()> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                if depth > max_depth {
                    return Err(ObfuscateError::RecursionLimitExceeded { limit: max_depth });
                }
            }
            Ok(Event::Empty(_)) if depth + 1 > max_depth => {
                return Err(ObfuscateError::RecursionLimitExceeded { limit: max_depth });
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(err) => return Err(ObfuscateError::malformed(path, err)),
        }
    }
}

fn element_to_node(el: roxmltree::Node, depth: usize, max_depth: usize) -> Result<Node> {
    if depth > max_depth {
        return Err(ObfuscateError::RecursionLimitExceeded { limit: max_depth });
    }

    let raw_text: String = el
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    let text = raw_text.trim();
    let has_attributes = el.attributes().next().is_some();
    let has_children = el.children().any(|c| c.is_element());

    if !has_attributes && !has_children {
        return Ok(Node::string(text));
    }
    // Entries of this mapping sit one level further down.
    if depth >= max_depth {
        return Err(ObfuscateError::RecursionLimitExceeded { limit: max_depth });
    }

    let mut entries: Vec<(String, Node)> = Vec::new();
    for attr in el.attributes() {
        let mut key = format!("{ATTRIBUTE_PREFIX}{}", attr.name());
        if entries.iter().any(|(k, _)| *k == key) {
            key = format!("{ATTRIBUTE_PREFIX}{}", qualified_name(el, &attr));
        }
        entries.push((key, Node::string(attr.value())));
    }
    if !text.is_empty() {
        entries.push((TEXT_KEY.to_string(), Node::string(text)));
    }

    let mut groups: Vec<(&str, Vec<roxmltree::Node>)> = Vec::new();
    for child in el.children().filter(|c| c.is_element()) {
        let tag = child.tag_name().name();
        match groups.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, nodes)) => nodes.push(child),
            None => groups.push((tag, vec![child])),
        }
    }
    for (tag, children) in groups {
        let node = match children.as_slice() {
            [only] => element_to_node(*only, depth + 1, max_depth)?,
            _ => Node::Sequence(
                children
                    .iter()
                    .map(|child| element_to_node(*child, depth + 2, max_depth))
                    .collect::<Result<_>>()?,
            ),
        };
        entries.push((tag.to_string(), node));
    }

    Ok(Node::Mapping(entries))
}

/// `prefix:local` for a namespaced attribute, used when its local name is
/// already taken on the same element.
fn qualified_name(el: roxmltree::Node, attr: &roxmltree::Attribute) -> String {
    let prefix = attr
        .namespace()
        .and_then(|uri| el.lookup_prefix(uri))
        .unwrap_or("ns");
    format!("{prefix}:{}", attr.name())
}

/// Write a tree produced by [`parse_markup`] (or one of the same shape)
/// back out as an XML document.
pub fn write_markup(node: &Node, max_depth: usize) -> Result<String> {
    let (tag, content) = match node {
        Node::Mapping(entries) if entries.len() == 1 => (&entries[0].0, &entries[0].1),
        other => {
            return Err(ObfuscateError::Serialization(format!(
                "markup needs a single root entry, found a {} at the top",
                other.kind()
            )));
        }
    };
    let mut elements = node_to_elements(tag, content, 1, max_depth)?;
    if elements.len() != 1 {
        return Err(ObfuscateError::Serialization(format!(
            "root element <{tag}> cannot repeat"
        )));
    }
    render_document(&elements.remove(0))
}

/// Expand one entry into elements.  A sequence yields one element per item,
/// all carrying `tag`; a mapping splits into attributes, text and children.
fn node_to_elements(
    tag: &str,
    node: &Node,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<XmlElement>> {
    if depth > max_depth {
        return Err(ObfuscateError::RecursionLimitExceeded { limit: max_depth });
    }

    match node {
        Node::Scalar(value) => Ok(vec![XmlElement::leaf(tag, value.render())]),
        Node::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.extend(node_to_elements(tag, item, depth + 1, max_depth)?);
            }
            Ok(out)
        }
        Node::Mapping(entries) => {
            let mut element = XmlElement {
                tag: tag.to_string(),
                ..XmlElement::default()
            };
            for (key, value) in entries {
                if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    element
                        .attributes
                        .push((name.to_string(), scalar_text(key, value)?));
                } else if key == TEXT_KEY {
                    element.text = Some(scalar_text(key, value)?);
                } else {
                    element
                        .children
                        .extend(node_to_elements(key, value, depth + 1, max_depth)?);
                }
            }
            if element.children.is_empty() && element.text.is_none() {
                element.text = Some(String::new());
            }
            Ok(vec![element])
        }
    }
}

/// Text of an attribute or `#text` entry, which must be a scalar.
fn scalar_text(key: &str, node: &Node) -> Result<String> {
    match node {
        Node::Scalar(value) => Ok(value.render()),
        other => Err(ObfuscateError::Serialization(format!(
            "entry {key} must be a scalar, found a {}",
            other.kind()
        ))),
    }
}

/// Serialise an element tree with an XML declaration and two-space indent.
pub fn render_document(root: &XmlElement) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_element(&mut writer, root)?;
    let mut buf = writer.into_inner();
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|err| ObfuscateError::Serialization(err.to_string()))
}

/// Emit an element and its subtree.  Names and text are checked before
/// anything reaches the writer, so a bad tree never yields broken markup.
fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    if !is_xml_name(&element.tag) {
        return Err(ObfuscateError::Serialization(format!(
            "{:?} is not a valid element name",
            element.tag
        )));
    }

    let mut start = BytesStart::new(element.tag.as_str());
    for (index, (name, value)) in element.attributes.iter().enumerate() {
        if !is_xml_name(name) {
            return Err(ObfuscateError::Serialization(format!(
                "{name:?} is not a valid attribute name"
            )));
        }
        if element.attributes[..index].iter().any(|(seen, _)| seen == name) {
            return Err(ObfuscateError::Serialization(format!(
                "attribute {name:?} appears twice on <{}>",
                element.tag
            )));
        }
        start.push_attribute((name.as_str(), checked_text(value)?));
    }

    let text = element.text.as_deref().filter(|t| !t.is_empty());
    if text.is_none() && element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = text {
        emit(writer, Event::Text(BytesText::new(checked_text(text)?)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.tag.as_str())))
}

fn checked_text(text: &str) -> Result<&str> {
    match text.chars().find(|ch| !is_xml_char(*ch)) {
        None => Ok(text),
        Some(bad) => Err(ObfuscateError::Serialization(format!(
            "text contains U+{:04X}, which XML cannot represent",
            bad as u32
        ))),
    }
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|err| ObfuscateError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{DEFAULT_MAX_DEPTH, Walker, to_json};

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<people source="hr">
  <person id="1"><name>Alice</name><joined>2022-01-10</joined></person>
  <person id="2"><name>Bob</name><joined/></person>
  <note>internal</note>
</people>"#;

    fn parse(text: &str) -> Node {
        parse_markup(text, Path::new("sample.xml"), DEFAULT_MAX_DEPTH).unwrap()
    }

    #[test]
    fn repeated_children_become_a_sequence() {
        let tree = parse(SAMPLE);
        let people = tree.get("people").expect("root entry");
        assert_eq!(people.get("@source"), Some(&Node::string("hr")));
        assert_eq!(people.get("note"), Some(&Node::string("internal")));

        let Some(Node::Sequence(persons)) = people.get("person") else {
            panic!("person should be a sequence: {people:?}");
        };
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].get("@id"), Some(&Node::string("1")));
        assert_eq!(persons[0].get("joined"), Some(&Node::string("2022-01-10")));
        assert_eq!(persons[1].get("joined"), Some(&Node::string("")));
    }

    #[test]
    fn written_markup_parses_back_to_the_same_tree() {
        let tree = parse(SAMPLE);
        let text = write_markup(&tree, DEFAULT_MAX_DEPTH).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(parse(&text), tree);
    }

    #[test]
    fn mixed_text_is_kept_under_text_key() {
        let tree = parse("<a>hello<b>x</b></a>");
        let a = tree.get("a").unwrap();
        assert_eq!(a.get(TEXT_KEY), Some(&Node::string("hello")));
        assert_eq!(a.get("b"), Some(&Node::string("x")));
    }

    #[test]
    fn broken_markup_is_malformed_input() {
        let err = parse_markup("<a><b></a>", Path::new("bad.xml"), DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(err, ObfuscateError::MalformedInput { .. }));
    }

    #[test]
    fn deep_markup_hits_the_depth_limit() {
        let err = parse_markup("<a><b><c>x</c></b></a>", Path::new("deep.xml"), 2).unwrap_err();
        assert!(matches!(
            err,
            ObfuscateError::RecursionLimitExceeded { limit: 2 }
        ));
    }

    #[test]
    fn very_deep_markup_is_rejected_before_tree_building() {
        let levels = 100_000;
        let text = format!("{}x{}", "<a>".repeat(levels), "</a>".repeat(levels));
        let err = parse_markup(&text, Path::new("deep.xml"), DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(
            err,
            ObfuscateError::RecursionLimitExceeded { limit: DEFAULT_MAX_DEPTH }
        ));
    }

    #[test]
    fn nesting_scan_counts_empty_elements() {
        let err = parse_markup("<a><b/></a>", Path::new("deep.xml"), 1).unwrap_err();
        assert!(matches!(err, ObfuscateError::RecursionLimitExceeded { limit: 1 }));
    }

    #[test]
    fn repeated_tags_add_a_level_like_the_walker() {
        let text = "<r><a>1</a><a>2</a></r>";
        let err = parse_markup(text, Path::new("seq.xml"), 2).unwrap_err();
        assert!(matches!(err, ObfuscateError::RecursionLimitExceeded { limit: 2 }));

        let tree = parse_markup(text, Path::new("seq.xml"), 3).unwrap();
        assert!(to_json(&tree, &Walker::with_max_depth(3)).is_ok());
    }

    #[test]
    fn attributes_sit_one_level_below_their_element() {
        let text = r#"<a id="1"/>"#;
        let err = parse_markup(text, Path::new("attr.xml"), 1).unwrap_err();
        assert!(matches!(err, ObfuscateError::RecursionLimitExceeded { limit: 1 }));

        let tree = parse_markup(text, Path::new("attr.xml"), 2).unwrap();
        assert!(to_json(&tree, &Walker::with_max_depth(2)).is_ok());
        assert!(to_json(&tree, &Walker::with_max_depth(1)).is_err());
    }

    #[test]
    fn names_starting_with_xml_round_trip() {
        let tree = parse("<XMLRecord><xmlPayload>2022-01-10</xmlPayload></XMLRecord>");
        let text = write_markup(&tree, DEFAULT_MAX_DEPTH).unwrap();
        assert!(text.contains("<xmlPayload>2022-01-10</xmlPayload>"), "{text}");
        assert_eq!(parse(&text), tree);
    }

    #[test]
    fn clashing_namespaced_attributes_keep_distinct_keys() {
        let tree = parse(r#"<a xmlns:p="urn:p" xmlns:q="urn:q" p:id="1" q:id="2">x</a>"#);
        let a = tree.get("a").unwrap();
        assert_eq!(a.get("@id"), Some(&Node::string("1")));
        assert_eq!(a.get("@q:id"), Some(&Node::string("2")));

        let err = write_markup(&tree, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(err, ObfuscateError::Serialization(_)));
    }

    #[test]
    fn namespaced_attributes_with_distinct_names_reparse() {
        let tree = parse(r#"<a xmlns:p="urn:p" p:id="1" kind="k">x</a>"#);
        let text = write_markup(&tree, DEFAULT_MAX_DEPTH).unwrap();
        let doc = Document::parse(&text).expect("well-formed");
        assert_eq!(doc.root_element().attribute("id"), Some("1"));
        assert_eq!(doc.root_element().attribute("kind"), Some("k"));
    }

    #[test]
    fn duplicate_attribute_names_fail_serialisation() {
        let mut root = XmlElement::leaf("root", "x");
        root.attributes = vec![
            ("id".to_string(), "1".to_string()),
            ("id".to_string(), "2".to_string()),
        ];
        let err = render_document(&root).unwrap_err();
        assert!(matches!(err, ObfuscateError::Serialization(_)));
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn writer_rejects_multi_entry_root() {
        let tree = Node::Mapping(vec![
            ("a".to_string(), Node::string("1")),
            ("b".to_string(), Node::string("2")),
        ]);
        let err = write_markup(&tree, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(err, ObfuscateError::Serialization(_)));
    }

    #[test]
    fn control_characters_fail_serialisation() {
        let root = XmlElement::leaf("root", "bell\u{0007}");
        let err = render_document(&root).unwrap_err();
        assert!(err.to_string().contains("U+0007"));
    }

    #[test]
    fn text_is_escaped() {
        let root = XmlElement::container("root", vec![XmlElement::leaf("a", "x < y & z")]);
        let text = render_document(&root).unwrap();
        assert!(text.contains("<a>x &lt; y &amp; z</a>"), "{text}");
    }
}
