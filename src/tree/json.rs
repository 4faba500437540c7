// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! JSON adapter: `serde_json::Value` in, pretty JSON text out.

use super::walker::{Visitor, Walker};
use super::{Node, Scalar};
use crate::error::{ObfuscateError, Result};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Mapping(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

/// Parse JSON text, tagging failures with the file they came from.
pub fn parse_json(text: &str, path: &Path) -> Result<Node> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ObfuscateError::malformed(path, err))?;
    Ok(Node::from(value))
}

struct JsonBuilder;

impl Visitor for JsonBuilder {
    type Output = Value;

    fn on_mapping(&mut self, entries: Vec<(String, Value)>) -> Result<Value> {
        Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    fn on_sequence(&mut self, items: Vec<Value>) -> Result<Value> {
        Ok(Value::Array(items))
    }

    fn on_scalar(&mut self, value: &Scalar) -> Result<Value> {
        Ok(match value {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        })
    }
}

/// Convert a tree back into a `serde_json::Value`.
pub fn to_json(node: &Node, walker: &Walker) -> Result<Value> {
    walker.walk(node, &mut JsonBuilder)
}

/// Render a tree as JSON indented by four spaces, with a trailing newline.
pub fn write_json(node: &Node, walker: &Walker) -> Result<String> {
    let value = to_json(node, walker)?;
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    serde::Serialize::serialize(&value, &mut ser)
        .map_err(|err| ObfuscateError::Serialization(err.to_string()))?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|err| ObfuscateError::Serialization(err.to_string()))
}
