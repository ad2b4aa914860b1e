use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute set of one node instance
pub type Attrs = serde_json::Map<String, Value>;

/// Partial attribute set merged onto an instance. Keys that are absent keep
/// their current value.
pub type AttributePatch = Attrs;

/// Snapshot of a node in the host document.
///
/// `position` is the document offset the snapshot was taken at. It is only
/// meaningful until the next committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
    pub type_name: String,
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl NodeInstance {
    pub fn new(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            position: None,
        }
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Instance id, once one has been assigned
    pub fn id(&self) -> Option<&str> {
        self.attrs.get(crate::ID_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Attributes after applying `patch`
    pub fn merged(&self, patch: &AttributePatch) -> Attrs {
        merge_attrs(&self.attrs, patch)
    }

    /// Same type and attributes, ignoring the transient position
    pub fn same_node(&self, other: &NodeInstance) -> bool {
        self.type_name == other.type_name && self.attrs == other.attrs
    }
}

/// Merge `patch` onto `base`: patch keys win, everything else is kept.
pub fn merge_attrs(base: &Attrs, patch: &AttributePatch) -> Attrs {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Build a patch from `(name, value)` pairs
pub fn patch<K, V, I>(pairs: I) -> AttributePatch
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
