//! Figure with an image and an optional caption

use crate::attribute::{AttrSource, AttributeSpec};
use crate::descriptor::{Marker, MarkupRule, NodeTypeDescriptor};
use crate::error::ConfigError;
use richnode_markup::{MarkupElement, MarkupNode};
use serde_json::Value;

pub const IMAGE_WITH_CAPTION: &str = "imageWithCaption";

pub fn image_with_caption() -> Result<NodeTypeDescriptor, ConfigError> {
    NodeTypeDescriptor::builder(IMAGE_WITH_CAPTION)
        .rule(MarkupRule::new("figure").with_marker(Marker::present("data-image-with-caption")))
        .atomic(true)
        .id_prefix("img")
        .attribute(
            AttributeSpec::text("src", Value::Null)
                .markup_attribute("data-src")
                .parse_from(from_attribute_or_image("data-src", img_src)),
        )
        .attribute(
            AttributeSpec::text("alt", Value::Null)
                .markup_attribute("data-alt")
                .parse_from(from_attribute_or_image("data-alt", img_alt)),
        )
        .attribute(
            AttributeSpec::text("title", Value::Null)
                .markup_attribute("data-title")
                .parse_from(from_attribute_or_image("data-title", img_title)),
        )
        .attribute(
            AttributeSpec::text("caption", "")
                .markup_attribute("data-caption")
                .parse_from(AttrSource::FirstOf(vec![
                    AttrSource::attribute("data-caption"),
                    AttrSource::Custom(figcaption_text),
                ])),
        )
        .build()
}

// Figures written by hand keep the image data on a nested <img>
fn from_attribute_or_image(name: &str, nested: fn(&MarkupElement) -> Option<String>) -> AttrSource {
    AttrSource::FirstOf(vec![AttrSource::attribute(name), AttrSource::Custom(nested)])
}

fn child_element<'a>(element: &'a MarkupElement, tag: &str) -> Option<&'a MarkupElement> {
    element
        .children
        .iter()
        .filter_map(MarkupNode::as_element)
        .find(|child| child.tag == tag)
}

fn img_attr(element: &MarkupElement, name: &str) -> Option<String> {
    child_element(element, "img")?.attr(name).map(str::to_string)
}

fn img_src(element: &MarkupElement) -> Option<String> {
    img_attr(element, "src")
}

fn img_alt(element: &MarkupElement) -> Option<String> {
    img_attr(element, "alt")
}

fn img_title(element: &MarkupElement) -> Option<String> {
    img_attr(element, "title")
}

fn figcaption_text(element: &MarkupElement) -> Option<String> {
    child_element(element, "figcaption").map(|caption| caption.text_content().trim().to_string())
}
