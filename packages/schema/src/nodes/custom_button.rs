//! Inline call-to-action button block

use crate::attribute::{AttrKind, AttrSource, AttributeSpec};
use crate::descriptor::{Marker, MarkupRule, NodeTypeDescriptor};
use crate::error::ConfigError;
use crate::instance::AttributePatch;
use serde::{Deserialize, Serialize};

pub const CUSTOM_BUTTON: &str = "customButton";

pub const BUTTON_SIZES: &[&str] = &["sm", "md", "lg"];
pub const BUTTON_COLORS: &[&str] = &["primary", "secondary", "destructive", "outline", "ghost", "link"];
pub const BUTTON_ALIGNMENTS: &[&str] = &["left", "center", "right"];

pub const DEFAULT_BUTTON_LABEL: &str = "New Button";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    Md,
    Lg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Primary,
    Secondary,
    Destructive,
    Outline,
    Ghost,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAlignment {
    Left,
    Center,
    Right,
}

/// Typed attribute patch for [`CUSTOM_BUTTON`] nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_size: Option<ButtonSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<ButtonColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_alignment: Option<ButtonAlignment>,
}

impl ButtonPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn into_patch(self) -> AttributePatch {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => AttributePatch::new(),
        }
    }
}

pub fn custom_button() -> Result<NodeTypeDescriptor, ConfigError> {
    NodeTypeDescriptor::builder(CUSTOM_BUTTON)
        .rule(MarkupRule::new("button").with_marker(Marker::equals("data-type", "custom-button")))
        .atomic(true)
        .id_prefix("btn")
        .attribute(
            AttributeSpec::text("label", DEFAULT_BUTTON_LABEL)
                .markup_attribute("data-label")
                // Older documents carried the label as button text only
                .parse_from(AttrSource::FirstOf(vec![
                    AttrSource::attribute("data-label"),
                    AttrSource::TextContent,
                ])),
        )
        .attribute(
            AttributeSpec::new("buttonSize", AttrKind::OneOf(BUTTON_SIZES), "md")
                .markup_attribute("data-size"),
        )
        .attribute(
            AttributeSpec::new("buttonColor", AttrKind::OneOf(BUTTON_COLORS), "primary")
                .markup_attribute("data-color"),
        )
        .attribute(
            AttributeSpec::new("buttonAlignment", AttrKind::OneOf(BUTTON_ALIGNMENTS), "left")
                .markup_attribute("data-align"),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use richnode_markup::{MarkupElement, MarkupNode};
    use serde_json::json;

    #[test]
    fn test_button_patch_skips_unset_fields() {
        let patch = ButtonPatch {
            button_color: Some(ButtonColor::Destructive),
            ..ButtonPatch::default()
        }
        .into_patch();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("buttonColor"), Some(&json!("destructive")));
    }

    #[test]
    fn test_typed_patch_is_valid_for_descriptor() {
        let descriptor = custom_button().unwrap();
        let patch = ButtonPatch {
            label: Some("Buy".into()),
            button_size: Some(ButtonSize::Lg),
            button_color: Some(ButtonColor::Ghost),
            button_alignment: Some(ButtonAlignment::Center),
        }
        .into_patch();

        assert!(descriptor.validate_patch(&patch).is_ok());
    }

    #[test]
    fn test_legacy_label_from_text() {
        let element = MarkupElement::new("button")
            .with_attr("data-type", "custom-button")
            .with_attr("data-id", "btn-legacy")
            .with_child(MarkupNode::text("Subscribe"));

        let instance = custom_button().unwrap().decode(&element).unwrap();

        assert_eq!(instance.attr("label"), Some(&json!("Subscribe")));
        assert_eq!(instance.id(), Some("btn-legacy"));
        assert_eq!(instance.attr("buttonSize"), Some(&json!("md")));
    }
}
