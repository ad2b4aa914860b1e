//! # Host document
//!
//! A positional tree in the ProseMirror style. Every node has a size: text
//! counts its characters, an atomic leaf counts 1 and a container counts 2
//! (open and close token) plus the size of its content. A position is a gap
//! between tokens of the root content, so `0..=size()` are all valid.
//!
//! ```text
//! <p>  H  i  !  </p>  <button>  <p>  </p>
//! 0    1  2  3  4     5         6    7    8
//! ```
//!
//! Lookups return elements with the position they start at. Positions go
//! stale after any edit and must be looked up again.

use crate::visitor::{walk_document, Visitor};
use richnode_schema::{Attrs, NodeInstance, SchemaRegistry};
use std::collections::HashMap;

pub const PARAGRAPH: &str = "paragraph";
pub const HEADING: &str = "heading";
pub const BLOCKQUOTE: &str = "blockquote";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub type_name: String,
    pub attrs: Attrs,
    /// `None` for atomic leaves
    pub content: Option<Vec<Node>>,
}

impl Element {
    pub fn leaf(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            content: None,
        }
    }

    pub fn container(type_name: impl Into<String>, attrs: Attrs, content: Vec<Node>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            content: Some(content),
        }
    }

    pub fn is_atomic(&self) -> bool {
        self.content.is_none()
    }

    pub fn size(&self) -> usize {
        match &self.content {
            None => 1,
            Some(content) => 2 + content_size(content),
        }
    }

    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .flatten()
            .map(Node::text_content)
            .collect()
    }

    /// Snapshot for callers outside the document
    pub fn to_instance(&self, pos: usize) -> NodeInstance {
        NodeInstance::new(self.type_name.clone(), self.attrs.clone()).with_position(pos)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::Element(Element::container(PARAGRAPH, Attrs::new(), content))
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("level".to_string(), level.into());
        Node::Element(Element::container(HEADING, attrs, content))
    }

    pub fn blockquote(content: Vec<Node>) -> Self {
        Node::Element(Element::container(BLOCKQUOTE, Attrs::new(), content))
    }

    pub fn size(&self) -> usize {
        match self {
            Node::Element(element) => element.size(),
            Node::Text(text) => text.chars().count(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.as_element().map(|el| el.type_name.as_str())
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Element(element) => element.text_content(),
            Node::Text(text) => text.clone(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

pub fn content_size(content: &[Node]) -> usize {
    content.iter().map(Node::size).sum()
}

/// Merge adjacent text nodes and drop empty ones
pub fn normalize_content(content: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => match out.last_mut() {
                Some(Node::Text(previous)) => previous.push_str(&text),
                _ => out.push(Node::Text(text)),
            },
            other => out.push(other),
        }
    }
    out
}

/// A gap between two siblings: `index` within the content at `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub path: Vec<usize>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    pub fn size(&self) -> usize {
        content_size(&self.content)
    }

    /// Element starting exactly at `pos`
    pub fn element_at(&self, pos: usize) -> Option<&Element> {
        let path = element_path(&self.content, pos)?;
        self.element_by_path(&path)
    }

    pub(crate) fn element_at_mut(&mut self, pos: usize) -> Option<&mut Element> {
        let path = element_path(&self.content, pos)?;
        let (last, parents) = path.split_last()?;
        self.content_at_mut(parents)?.get_mut(*last)?.as_element_mut()
    }

    /// Containers strictly enclosing `pos`, innermost first
    pub fn ancestors_at(&self, pos: usize) -> Vec<(usize, &Element)> {
        let mut ancestors = Vec::new();
        let mut content: &[Node] = &self.content;
        let mut base = 0;

        'descend: loop {
            let mut offset = base;
            for node in content {
                let end = offset + node.size();
                if offset < pos && pos < end {
                    if let Node::Element(element) = node {
                        if let Some(inner) = &element.content {
                            ancestors.push((offset, element));
                            content = inner;
                            base = offset + 1;
                            continue 'descend;
                        }
                    }
                    break 'descend;
                }
                offset = end;
            }
            break;
        }

        ancestors.reverse();
        ancestors
    }

    /// Elements whose span intersects `from..to`, in document order
    pub fn elements_between(&self, from: usize, to: usize) -> Vec<(usize, &Element)> {
        let mut found = Vec::new();
        collect_between(&self.content, 0, from, to, &mut found);
        found
    }

    /// Every element with its start position, in document order
    pub fn descendants(&self) -> Vec<(usize, &Element)> {
        let mut collector = ElementCollector::default();
        walk_document(&mut collector, self);
        collector.elements
    }

    pub fn resolve_gap(&self, pos: usize) -> Option<Gap> {
        resolve_gap(&self.content, pos)
    }

    pub fn content_at(&self, path: &[usize]) -> Option<&Vec<Node>> {
        let mut content = &self.content;
        for &index in path {
            content = content.get(index)?.as_element()?.content.as_ref()?;
        }
        Some(content)
    }

    pub(crate) fn content_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut content = &mut self.content;
        for &index in path {
            content = content.get_mut(index)?.as_element_mut()?.content.as_mut()?;
        }
        Some(content)
    }

    /// The element at `path`; an empty path is the root, which is no element
    pub fn element_by_path(&self, path: &[usize]) -> Option<&Element> {
        let (last, parents) = path.split_last()?;
        self.content_at(parents)?.get(*last)?.as_element()
    }
}

fn element_path(content: &[Node], pos: usize) -> Option<Vec<usize>> {
    let mut offset = 0;
    for (index, node) in content.iter().enumerate() {
        let end = offset + node.size();
        if pos == offset {
            return node.as_element().map(|_| vec![index]);
        }
        if pos < end {
            let inner = node.as_element()?.content.as_ref()?;
            let mut path = element_path(inner, pos - offset - 1)?;
            path.insert(0, index);
            return Some(path);
        }
        offset = end;
    }
    None
}

fn resolve_gap(content: &[Node], pos: usize) -> Option<Gap> {
    let mut offset = 0;
    for (index, node) in content.iter().enumerate() {
        if pos == offset {
            return Some(Gap {
                path: Vec::new(),
                index,
            });
        }
        let end = offset + node.size();
        if pos < end {
            let inner = node.as_element()?.content.as_ref()?;
            let mut gap = resolve_gap(inner, pos - offset - 1)?;
            gap.path.insert(0, index);
            return Some(gap);
        }
        offset = end;
    }

    (pos == offset).then(|| Gap {
        path: Vec::new(),
        index: content.len(),
    })
}

fn collect_between<'doc>(
    content: &'doc [Node],
    base: usize,
    from: usize,
    to: usize,
    found: &mut Vec<(usize, &'doc Element)>,
) {
    let mut offset = base;
    for node in content {
        if offset >= to {
            break;
        }
        let end = offset + node.size();
        if end > from {
            if let Node::Element(element) = node {
                found.push((offset, element));
                if let Some(inner) = &element.content {
                    collect_between(inner, offset + 1, from, to, found);
                }
            }
        }
        offset = end;
    }
}

#[derive(Default)]
struct ElementCollector<'doc> {
    elements: Vec<(usize, &'doc Element)>,
}

impl<'doc> Visitor<'doc> for ElementCollector<'doc> {
    fn visit_element(&mut self, element: &'doc Element, pos: usize) {
        self.elements.push((pos, element));
        crate::visitor::walk_element(self, element, pos);
    }
}

/// What the in-memory host allows where
#[derive(Debug, Clone, Default)]
pub struct HostSchema {
    /// Registered custom kinds and whether each is atomic
    custom: HashMap<String, bool>,
}

impl HostSchema {
    pub fn new(registry: &SchemaRegistry) -> Self {
        Self {
            custom: registry
                .iter()
                .map(|d| (d.name().to_string(), d.is_atomic()))
                .collect(),
        }
    }

    pub fn is_custom(&self, type_name: &str) -> bool {
        self.custom.contains_key(type_name)
    }

    pub fn is_textblock(&self, type_name: &str) -> bool {
        matches!(type_name, PARAGRAPH | HEADING)
    }

    /// Whether block nodes may sit in `parent` (`None` is the root)
    pub fn accepts_blocks(&self, parent: Option<&str>) -> bool {
        match parent {
            None | Some(BLOCKQUOTE) => true,
            Some(name) => self.custom.get(name) == Some(&false),
        }
    }

    /// Document node for a custom instance
    pub fn create_node(&self, instance: &NodeInstance) -> Node {
        let attrs = instance.attrs.clone();
        if self.custom.get(&instance.type_name) == Some(&false) {
            Element::container(instance.type_name.clone(), attrs, Vec::new()).into()
        } else {
            Element::leaf(instance.type_name.clone(), attrs).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richnode_schema::patch;
    use serde_json::json;

    fn button(id: &str) -> Node {
        Element::leaf("customButton", patch([("id", id)])).into()
    }

    // 0 <p> 1 "Hi!" 4 </p> 5 [btn-a] 6 <blockquote> 7 [btn-b] 8 <p> 9 "x" 10 </p> 11 </blockquote> 12
    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph(vec![Node::text("Hi!")]),
            button("btn-a"),
            Node::blockquote(vec![button("btn-b"), Node::paragraph(vec![Node::text("x")])]),
        ])
    }

    #[test]
    fn test_sizes() {
        let doc = sample();
        assert_eq!(doc.content[0].size(), 5);
        assert_eq!(doc.content[1].size(), 1);
        assert_eq!(doc.content[2].size(), 6);
        assert_eq!(doc.size(), 12);
    }

    #[test]
    fn test_element_at() {
        let doc = sample();

        assert_eq!(doc.element_at(0).map(|e| e.type_name.as_str()), Some(PARAGRAPH));
        assert_eq!(doc.element_at(5).map(|e| e.type_name.as_str()), Some("customButton"));
        assert_eq!(doc.element_at(7).and_then(|e| e.attrs.get("id")), Some(&json!("btn-b")));
        assert!(doc.element_at(2).is_none());
        assert!(doc.element_at(12).is_none());
    }

    #[test]
    fn test_ancestors_innermost_first() {
        let doc = sample();

        let ancestors: Vec<_> = doc
            .ancestors_at(9)
            .into_iter()
            .map(|(pos, el)| (pos, el.type_name.as_str()))
            .collect();

        assert_eq!(ancestors, vec![(8, PARAGRAPH), (6, BLOCKQUOTE)]);
        assert!(doc.ancestors_at(5).is_empty());
    }

    #[test]
    fn test_elements_between() {
        let doc = sample();

        let positions: Vec<_> = doc.elements_between(3, 8).into_iter().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![0, 5, 6, 7]);

        assert!(doc.elements_between(5, 5).is_empty());
        assert_eq!(doc.descendants().len(), 5);
    }

    #[test]
    fn test_resolve_gap() {
        let doc = sample();

        assert_eq!(doc.resolve_gap(5), Some(Gap { path: vec![], index: 1 }));
        assert_eq!(doc.resolve_gap(12), Some(Gap { path: vec![], index: 3 }));
        assert_eq!(doc.resolve_gap(8), Some(Gap { path: vec![2], index: 1 }));
        assert_eq!(doc.resolve_gap(1), Some(Gap { path: vec![0], index: 0 }));
        assert_eq!(doc.resolve_gap(2), None);
    }

    #[test]
    fn test_normalize_content() {
        let content = normalize_content(vec![
            Node::text("a"),
            Node::text(""),
            Node::text("b"),
            button("x"),
            Node::text("c"),
        ]);

        assert_eq!(content, vec![Node::text("ab"), button("x"), Node::text("c")]);
    }
}
