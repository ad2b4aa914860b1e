//! # Node type descriptors
//!
//! A descriptor is the single source of truth for a custom node kind: its
//! name, the markup pattern that identifies it, its attributes with their
//! defaults, and whether it is an opaque leaf.
//!
//! Every descriptor carries an implicit `id` attribute (first in declaration
//! order). It is read from and written to `data-id`, starts out null and is
//! filled in with a fresh token when a node is inserted.

use crate::attribute::{AttrKind, AttrSource, AttrTarget, AttributeSpec};
use crate::error::{ConfigError, SchemaError};
use crate::instance::{AttributePatch, Attrs, NodeInstance};
use richnode_markup::{Attributes, MarkupElement};
use serde_json::Value;
use std::collections::HashSet;

/// Reserved attribute holding the instance key
pub const ID_ATTRIBUTE: &str = "id";

/// Markup attribute the instance key is persisted in
pub const ID_MARKUP_ATTRIBUTE: &str = "data-id";

/// Type-marker attribute test of a markup rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    None,
    /// `tag[name]`
    Present(String),
    /// `tag[name="value"]`
    Equals(String, String),
    /// `tag[name*="needle"]`
    Contains(String, String),
}

impl Marker {
    pub fn present(name: impl Into<String>) -> Self {
        Marker::Present(name.into())
    }

    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Marker::Equals(name.into(), value.into())
    }

    pub fn contains(name: impl Into<String>, needle: impl Into<String>) -> Self {
        Marker::Contains(name.into(), needle.into())
    }

    /// The attribute an encoder writes to make the output match again
    pub(crate) fn rendered(&self) -> Option<(&str, &str)> {
        match self {
            Marker::Present(name) => Some((name, "")),
            Marker::Equals(name, value) => Some((name, value)),
            Marker::None | Marker::Contains(..) => None,
        }
    }
}

/// Recognition pattern: a tag name plus a type marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRule {
    pub tag: String,
    pub marker: Marker,
}

impl MarkupRule {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            marker: Marker::None,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn matches(&self, element: &MarkupElement) -> bool {
        if element.tag != self.tag {
            return false;
        }

        match &self.marker {
            Marker::None => true,
            Marker::Present(name) => element.attributes.contains(name),
            Marker::Equals(name, value) => element.attr(name) == Some(value.as_str()),
            Marker::Contains(name, needle) => element
                .attr(name)
                .map_or(false, |actual| actual.contains(needle.as_str())),
        }
    }
}

/// Static schema definition of one custom node kind
#[derive(Debug, Clone)]
pub struct NodeTypeDescriptor {
    pub(crate) name: String,
    pub(crate) rules: Vec<MarkupRule>,
    pub(crate) static_attributes: Attributes,
    pub(crate) attributes: Vec<AttributeSpec>,
    pub(crate) atomic: bool,
    pub(crate) id_prefix: String,
}

/// Define a node type with a single markup rule
pub fn define_node_type(
    name: impl Into<String>,
    rule: MarkupRule,
    attributes: Vec<AttributeSpec>,
    atomic: bool,
) -> Result<NodeTypeDescriptor, ConfigError> {
    let mut builder = NodeTypeDescriptor::builder(name).rule(rule).atomic(atomic);
    for spec in attributes {
        builder = builder.attribute(spec);
    }
    builder.build()
}

impl NodeTypeDescriptor {
    pub fn builder(name: impl Into<String>) -> NodeTypeBuilder {
        NodeTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[MarkupRule] {
        &self.rules
    }

    pub fn static_attributes(&self) -> &Attributes {
        &self.static_attributes
    }

    /// Attribute specs in declaration order, `id` first
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    /// Whether some rule recognizes this element
    pub fn matches(&self, element: &MarkupElement) -> bool {
        self.rules.iter().any(|rule| rule.matches(element))
    }

    /// All attributes at their defaults
    pub fn defaults(&self) -> Attrs {
        self.attributes
            .iter()
            .map(|spec| (spec.name.clone(), spec.default.clone()))
            .collect()
    }

    /// Build an instance from defaults plus validated overrides.
    ///
    /// Overrides may set `id`; the instance is otherwise left without one.
    pub fn construct(&self, overrides: &Attrs) -> Result<NodeInstance, SchemaError> {
        self.check_values(overrides, true)?;

        let mut attrs = self.defaults();
        for (key, value) in overrides {
            attrs.insert(key.clone(), value.clone());
        }

        Ok(NodeInstance::new(self.name.clone(), attrs))
    }

    /// Check a patch against this type. The instance id is not patchable.
    pub fn validate_patch(&self, patch: &AttributePatch) -> Result<(), SchemaError> {
        self.check_values(patch, false)
    }

    /// Parse a raw string into the attribute's kind
    pub fn coerce(&self, name: &str, raw: &str) -> Result<Value, SchemaError> {
        let spec = self.attribute(name).ok_or_else(|| SchemaError::UnknownAttribute {
            node_type: self.name.clone(),
            attribute: name.to_string(),
        })?;

        spec.kind
            .coerce(raw)
            .ok_or_else(|| SchemaError::InvalidValue {
                node_type: self.name.clone(),
                attribute: name.to_string(),
                value: format!("{:?}", raw),
            })
    }

    fn check_values(&self, values: &Attrs, allow_id: bool) -> Result<(), SchemaError> {
        for (key, value) in values {
            if key == ID_ATTRIBUTE && !allow_id {
                return Err(SchemaError::ImmutableAttribute {
                    node_type: self.name.clone(),
                    attribute: key.clone(),
                });
            }

            let spec = self.attribute(key).ok_or_else(|| SchemaError::UnknownAttribute {
                node_type: self.name.clone(),
                attribute: key.clone(),
            })?;

            if !spec.accepts(value) {
                return Err(SchemaError::InvalidValue {
                    node_type: self.name.clone(),
                    attribute: key.clone(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for [`NodeTypeDescriptor`]
#[derive(Debug, Clone)]
pub struct NodeTypeBuilder {
    name: String,
    rules: Vec<MarkupRule>,
    static_attributes: Attributes,
    attributes: Vec<AttributeSpec>,
    atomic: bool,
    id_prefix: Option<String>,
}

impl NodeTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            static_attributes: Attributes::new(),
            attributes: Vec::new(),
            atomic: true,
            id_prefix: None,
        }
    }

    /// Add a recognition rule. The first rule is also the render shape.
    pub fn rule(mut self, rule: MarkupRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Markup attribute written on every encode
    pub fn static_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_attributes.set(key, value);
        self
    }

    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<NodeTypeDescriptor, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        if self.rules.is_empty() {
            return Err(ConfigError::MissingMarkupRule {
                node_type: self.name,
            });
        }

        let mut seen = HashSet::new();
        for spec in &self.attributes {
            if spec.name == ID_ATTRIBUTE {
                return Err(ConfigError::ReservedAttribute {
                    node_type: self.name.clone(),
                    attribute: spec.name.clone(),
                });
            }

            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateAttribute {
                    node_type: self.name.clone(),
                    attribute: spec.name.clone(),
                });
            }

            if !spec.accepts(&spec.default) {
                return Err(ConfigError::InvalidDefault {
                    node_type: self.name.clone(),
                    attribute: spec.name.clone(),
                });
            }
        }

        let mut attributes = Vec::with_capacity(self.attributes.len() + 1);
        attributes.push(id_attribute());
        attributes.extend(self.attributes);

        Ok(NodeTypeDescriptor {
            id_prefix: self.id_prefix.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            rules: self.rules,
            static_attributes: self.static_attributes,
            attributes,
            atomic: self.atomic,
        })
    }
}

fn id_attribute() -> AttributeSpec {
    AttributeSpec {
        name: ID_ATTRIBUTE.to_string(),
        kind: AttrKind::Text,
        default: Value::Null,
        source: AttrSource::Attribute(ID_MARKUP_ATTRIBUTE.to_string()),
        target: AttrTarget::Attribute(ID_MARKUP_ATTRIBUTE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::patch;
    use serde_json::json;

    fn badge() -> NodeTypeDescriptor {
        NodeTypeDescriptor::builder("badge")
            .rule(MarkupRule::new("span").with_marker(Marker::equals("data-type", "badge")))
            .attribute(AttributeSpec::text("text", "Badge"))
            .attribute(AttributeSpec::new("tone", AttrKind::OneOf(&["info", "warn"]), "info"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_id_is_implicit_and_first() {
        let descriptor = badge();

        assert_eq!(descriptor.attributes()[0].name, ID_ATTRIBUTE);
        assert_eq!(descriptor.attributes().len(), 3);
        assert_eq!(descriptor.defaults().get("id"), Some(&Value::Null));
    }

    #[test]
    fn test_reserved_id_is_rejected() {
        let result = define_node_type(
            "badge",
            MarkupRule::new("span"),
            vec![AttributeSpec::text("id", "x")],
            true,
        );

        assert_eq!(
            result.unwrap_err(),
            ConfigError::ReservedAttribute {
                node_type: "badge".to_string(),
                attribute: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_attribute_is_rejected() {
        let result = define_node_type(
            "badge",
            MarkupRule::new("span"),
            vec![AttributeSpec::text("text", "a"), AttributeSpec::text("text", "b")],
            true,
        );

        assert!(matches!(result, Err(ConfigError::DuplicateAttribute { .. })));
    }

    #[test]
    fn test_default_outside_options_is_rejected() {
        let result = define_node_type(
            "badge",
            MarkupRule::new("span"),
            vec![AttributeSpec::new("tone", AttrKind::OneOf(&["info"]), "loud")],
            true,
        );

        assert!(matches!(result, Err(ConfigError::InvalidDefault { .. })));
    }

    #[test]
    fn test_missing_rule_and_empty_name() {
        assert!(matches!(
            NodeTypeDescriptor::builder("badge").build(),
            Err(ConfigError::MissingMarkupRule { .. })
        ));
        assert_eq!(
            NodeTypeDescriptor::builder(" ").rule(MarkupRule::new("span")).build().unwrap_err(),
            ConfigError::EmptyName
        );
    }

    #[test]
    fn test_construct_applies_overrides() {
        let instance = badge()
            .construct(&patch([("text", "New"), ("id", "badge-1")]))
            .unwrap();

        assert_eq!(instance.attr("text"), Some(&json!("New")));
        assert_eq!(instance.attr("tone"), Some(&json!("info")));
        assert_eq!(instance.id(), Some("badge-1"));
    }

    #[test]
    fn test_validate_patch() {
        let descriptor = badge();

        assert!(descriptor.validate_patch(&patch([("tone", "warn")])).is_ok());
        assert!(matches!(
            descriptor.validate_patch(&patch([("tone", "loud")])),
            Err(SchemaError::InvalidValue { .. })
        ));
        assert!(matches!(
            descriptor.validate_patch(&patch([("colour", "red")])),
            Err(SchemaError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            descriptor.validate_patch(&patch([("id", "other")])),
            Err(SchemaError::ImmutableAttribute { .. })
        ));
    }

    #[test]
    fn test_rule_markers() {
        let present = MarkupRule::new("iframe").with_marker(Marker::present("data-vimeo"));
        let contains = MarkupRule::new("iframe").with_marker(Marker::contains("src", "vimeo.com"));

        let tagged = MarkupElement::new("iframe").with_attr("data-vimeo", "");
        let by_src = MarkupElement::new("iframe").with_attr("src", "https://player.vimeo.com/video/1");

        assert!(present.matches(&tagged));
        assert!(!present.matches(&by_src));
        assert!(contains.matches(&by_src));
        assert!(!contains.matches(&MarkupElement::new("div")));
    }
}
