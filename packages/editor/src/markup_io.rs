//! # Document <-> markup
//!
//! Loads a markup fragment into the host document and writes it back.
//! Paragraphs, headings and blockquotes map to their tags; custom kinds go
//! through the schema registry. Other wrappers are flattened into their
//! content, loose text at block level becomes a paragraph and whitespace
//! between blocks is dropped.

use crate::document::{normalize_content, Document, Element, Node, BLOCKQUOTE, HEADING, PARAGRAPH};
use richnode_markup::{parse, serialize, MarkupElement, MarkupNode, ParseResult, SerializeOptions};
use richnode_schema::{Attrs, NodeInstance, SchemaRegistry};
use serde_json::Value;

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "em", "i", "kbd", "mark", "q", "s", "small", "span",
    "strong", "sub", "sup", "u",
];

pub fn document_from_markup(source: &str, registry: &SchemaRegistry) -> ParseResult<Document> {
    let nodes = parse(source)?;
    Ok(Document::new(parse_blocks(&nodes, registry)))
}

pub fn document_to_markup(
    doc: &Document,
    registry: &SchemaRegistry,
    options: SerializeOptions,
) -> String {
    let nodes: Vec<MarkupNode> = doc
        .content
        .iter()
        .map(|node| to_markup(node, registry))
        .collect();
    serialize(&nodes, options)
}

/// Block content from a markup fragment
pub fn parse_blocks(nodes: &[MarkupNode], registry: &SchemaRegistry) -> Vec<Node> {
    let mut builder = BlockBuilder::new(registry);
    for node in nodes {
        builder.add(node);
    }
    builder.finish()
}

struct BlockBuilder<'r> {
    registry: &'r SchemaRegistry,
    blocks: Vec<Node>,
    /// Loose inline content waiting for a paragraph
    inline: Vec<Node>,
}

impl<'r> BlockBuilder<'r> {
    fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            blocks: Vec::new(),
            inline: Vec::new(),
        }
    }

    fn add(&mut self, node: &MarkupNode) {
        let element = match node {
            MarkupNode::Text { content } => {
                self.inline.push(Node::text(content.as_str()));
                return;
            }
            MarkupNode::Element(element) => element,
        };

        if let Some(custom) = decode_custom(element, self.registry) {
            self.flush();
            self.blocks.push(custom);
            return;
        }

        match textblock_attrs(&element.tag) {
            Some((type_name, attrs)) => {
                self.flush();
                self.blocks
                    .extend(textblock(type_name, attrs, &element.children, self.registry));
            }
            None if element.tag == "blockquote" => {
                self.flush();
                let content = parse_blocks(&element.children, self.registry);
                self.blocks.push(Node::blockquote(content));
            }
            None if INLINE_TAGS.contains(&element.tag.as_str()) => {
                for child in &element.children {
                    self.add(child);
                }
            }
            None => {
                self.flush();
                for child in &element.children {
                    self.add(child);
                }
                self.flush();
            }
        }
    }

    fn flush(&mut self) {
        let inline = normalize_content(std::mem::take(&mut self.inline));
        let blank = inline.iter().all(|node| match node {
            Node::Text(text) => text.trim().is_empty(),
            Node::Element(_) => false,
        });
        if !blank {
            self.blocks.push(Node::paragraph(inline));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.blocks
    }
}

fn textblock_attrs(tag: &str) -> Option<(&'static str, Attrs)> {
    match tag {
        "p" => Some((PARAGRAPH, Attrs::new())),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level: u8 = tag[1..].parse().ok()?;
            let mut attrs = Attrs::new();
            attrs.insert("level".to_string(), level.into());
            Some((HEADING, attrs))
        }
        _ => None,
    }
}

/// A text block's content. Custom nodes cannot live inside one, so each
/// splits the block around itself.
fn textblock(
    type_name: &str,
    attrs: Attrs,
    children: &[MarkupNode],
    registry: &SchemaRegistry,
) -> Vec<Node> {
    let mut segments: Vec<Vec<Node>> = vec![Vec::new()];
    let mut customs: Vec<Node> = Vec::new();
    collect_inline(children, registry, &mut segments, &mut customs);

    let split = !customs.is_empty();
    let mut blocks = Vec::new();
    let mut customs = customs.into_iter();

    for (index, segment) in segments.into_iter().enumerate() {
        if index > 0 {
            blocks.extend(customs.next());
        }
        let content = normalize_content(segment);
        if !(split && content.is_empty()) {
            blocks.push(Element::container(type_name, attrs.clone(), content).into());
        }
    }
    blocks
}

fn collect_inline(
    children: &[MarkupNode],
    registry: &SchemaRegistry,
    segments: &mut Vec<Vec<Node>>,
    customs: &mut Vec<Node>,
) {
    for child in children {
        match child {
            MarkupNode::Text { content } => {
                if let Some(segment) = segments.last_mut() {
                    segment.push(Node::text(content.as_str()));
                }
            }
            MarkupNode::Element(element) => match decode_custom(element, registry) {
                Some(custom) => {
                    customs.push(custom);
                    segments.push(Vec::new());
                }
                None => collect_inline(&element.children, registry, segments, customs),
            },
        }
    }
}

fn decode_custom(element: &MarkupElement, registry: &SchemaRegistry) -> Option<Node> {
    let instance = registry.decode(element)?;
    let atomic = registry
        .get(&instance.type_name)
        .map_or(true, |descriptor| descriptor.is_atomic());

    let node = if atomic {
        Element::leaf(instance.type_name, instance.attrs)
    } else {
        let content = parse_blocks(&element.children, registry);
        Element::container(instance.type_name, instance.attrs, content)
    };
    Some(node.into())
}

fn to_markup(node: &Node, registry: &SchemaRegistry) -> MarkupNode {
    let element = match node {
        Node::Text(text) => return MarkupNode::text(text.as_str()),
        Node::Element(element) => element,
    };

    let mut markup = match element.type_name.as_str() {
        PARAGRAPH => MarkupElement::new("p"),
        HEADING => {
            let level = element
                .attrs
                .get("level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6);
            MarkupElement::new(format!("h{}", level))
        }
        BLOCKQUOTE => MarkupElement::new("blockquote"),
        type_name => {
            let instance = NodeInstance::new(type_name, element.attrs.clone());
            registry
                .encode(&instance)
                .unwrap_or_else(|| MarkupElement::new("div").with_attr("data-node-type", type_name))
        }
    };

    if let Some(content) = &element.content {
        markup.children = content.iter().map(|child| to_markup(child, registry)).collect();
    }
    markup.into()
}
