//! # Markup codec
//!
//! Encoding writes, in order: the first rule's tag and marker, the static
//! attributes, then every attribute target in declaration order. When two
//! writers produce the same markup key the last one wins and the earlier
//! value is lost; a descriptor that lets two attributes share a key (for
//! example two `Style` targets) does not round-trip both of them.
//!
//! Decoding never fails on a matching element: a missing or malformed
//! attribute takes its default. A non-matching element yields `None` so the
//! caller can try the next descriptor. The instance id is read back as-is
//! and never regenerated.

use crate::descriptor::NodeTypeDescriptor;
use crate::instance::{Attrs, NodeInstance};
use richnode_markup::MarkupElement;

impl NodeTypeDescriptor {
    /// Render an instance to a markup element without children
    pub fn encode(&self, instance: &NodeInstance) -> MarkupElement {
        let rule = &self.rules[0];
        let mut element = MarkupElement::new(rule.tag.clone());

        if let Some((key, value)) = rule.marker.rendered() {
            element.attributes.set(key, value);
        }
        element.attributes.merge(self.static_attributes.clone());

        for spec in &self.attributes {
            let value = instance.attrs.get(&spec.name).unwrap_or(&spec.default);
            for (key, rendered) in spec.target.render(value) {
                element.attributes.set(key, rendered);
            }
        }

        element
    }

    /// Read an instance back from markup; `None` when no rule matches
    pub fn decode(&self, element: &MarkupElement) -> Option<NodeInstance> {
        if !self.matches(element) {
            return None;
        }

        let attrs: Attrs = self
            .attributes
            .iter()
            .map(|spec| {
                let value = spec
                    .source
                    .extract(element)
                    .and_then(|raw| spec.kind.coerce(&raw))
                    .unwrap_or_else(|| spec.default.clone());
                (spec.name.clone(), value)
            })
            .collect();

        Some(NodeInstance::new(self.name.clone(), attrs))
    }
}
