// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Generic in-memory document tree.  Both loaders produce a [`Node`] and
//! both obfuscation strategies consume one, so the rest of the crate never
//! has to care whether the data arrived as JSON or XML.

pub mod json;
pub mod markup;
pub mod walker;

pub use json::{parse_json, to_json, write_json};
pub use markup::{parse_markup, write_markup};
pub use walker::{DEFAULT_MAX_DEPTH, Visitor, Walker};

/// A single node of a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered key/value entries; keys are unique within one mapping.
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

/// Primitive leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Render the scalar as element text.  Null renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Node {
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// Short label used in log lines and test failure messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Scalar(_) => "scalar",
        }
    }

    /// Look up a mapping entry by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Only `\t`, `\n`, `\r` and characters from U+0020 upwards (bar U+FFFE
/// and U+FFFF) may appear in an XML 1.0 document.
pub(crate) fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r') || (ch >= '\u{20}' && ch != '\u{FFFE}' && ch != '\u{FFFF}')
}

/// Conservative check for an XML element or attribute name.
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}
