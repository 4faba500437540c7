// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! JSON-to-XML obfuscation.  The tree keeps its shape but every element
//! name is a freshly drawn word; original keys are thrown away rather than
//! renamed, so the output carries no trace of them.

use super::words::WordSource;
use crate::error::Result;
use crate::tree::markup::{XmlElement, render_document};
use crate::tree::{Node, Scalar, Visitor, Walker};

/// Tag of the fixed container element.
pub const ROOT_TAG: &str = "root";

/// What a subtree turns into before it is given a tag of its own.
enum Content {
    Text(String),
    Children(Vec<XmlElement>),
}

impl Content {
    fn into_element(self, tag: String) -> XmlElement {
        match self {
            Content::Text(text) => XmlElement::leaf(tag, text),
            Content::Children(children) => XmlElement::container(tag, children),
        }
    }
}

struct StructureRenamer<'a, W: ?Sized> {
    words: &'a mut W,
}

impl<W: WordSource + ?Sized> Visitor for StructureRenamer<'_, W> {
    type Output = Content;

    fn on_mapping(&mut self, entries: Vec<(String, Content)>) -> Result<Content> {
        let children = entries
            .into_iter()
            .map(|(_key, content)| content.into_element(self.words.next_word()))
            .collect();
        Ok(Content::Children(children))
    }

    fn on_sequence(&mut self, items: Vec<Content>) -> Result<Content> {
        let children = items
            .into_iter()
            .map(|content| content.into_element(self.words.next_word()))
            .collect();
        Ok(Content::Children(children))
    }

    fn on_scalar(&mut self, value: &Scalar) -> Result<Content> {
        Ok(Content::Text(value.render()))
    }
}

/// Build the renamed element tree under a fixed `<root>`.  A bare scalar
/// input becomes the root's text.
pub fn rename_tree<W>(tree: &Node, words: &mut W, walker: &Walker) -> Result<XmlElement>
where
    W: WordSource + ?Sized,
{
    let content = walker.walk(tree, &mut StructureRenamer { words })?;
    Ok(content.into_element(ROOT_TAG.to_string()))
}

/// Rename `tree` and serialise it as an indented XML document.
pub fn rename_structure<W>(tree: &Node, words: &mut W) -> Result<String>
where
    W: WordSource + ?Sized,
{
    rename_structure_with(tree, words, &Walker::default())
}

pub fn rename_structure_with<W>(tree: &Node, words: &mut W, walker: &Walker) -> Result<String>
where
    W: WordSource + ?Sized,
{
    render_document(&rename_tree(tree, words, walker)?)
}
