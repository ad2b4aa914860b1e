use crate::descriptor::NodeTypeDescriptor;
use crate::error::ConfigError;
use crate::instance::NodeInstance;
use richnode_markup::MarkupElement;

/// Registered node types, in registration order.
///
/// Decoding tries descriptors in that order, so when two kinds could match
/// the same element the earlier registration wins.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    descriptors: Vec<NodeTypeDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: NodeTypeDescriptor) -> Result<(), ConfigError> {
        if self.contains(descriptor.name()) {
            return Err(ConfigError::DuplicateNodeType(descriptor.name().to_string()));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodeTypeDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Decode with the first descriptor that recognizes `element`
    pub fn decode(&self, element: &MarkupElement) -> Option<NodeInstance> {
        self.descriptors.iter().find_map(|d| d.decode(element))
    }

    /// Encode with the instance's own descriptor
    pub fn encode(&self, instance: &NodeInstance) -> Option<MarkupElement> {
        self.get(&instance.type_name).map(|d| d.encode(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{builtin_registry, custom_button, VimeoOptions, CUSTOM_BUTTON, VIMEO_VIDEO};

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(custom_button().unwrap()).unwrap();

        assert_eq!(
            registry.register(custom_button().unwrap()),
            Err(ConfigError::DuplicateNodeType(CUSTOM_BUTTON.to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_decode_picks_matching_kind() {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        let iframe = MarkupElement::new("iframe").with_attr("data-vimeo", "");
        let plain = MarkupElement::new("button");

        assert_eq!(registry.decode(&iframe).map(|i| i.type_name), Some(VIMEO_VIDEO.to_string()));
        assert!(registry.decode(&plain).is_none());
    }

    #[test]
    fn test_encode_unknown_type_is_none() {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        let stray = NodeInstance::new("mystery", Default::default());

        assert!(registry.encode(&stray).is_none());
    }
}
