//! # Richnode Schema
//!
//! Declarative descriptions of custom structured nodes and the codec that
//! moves them between the editor's attribute model and persisted markup.
//!
//! ```text
//! NodeTypeDescriptor ──encode──▶ MarkupElement
//!        ▲                             │
//!        └────────────decode───────────┘
//! ```

pub mod attribute;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod nodes;
pub mod registry;

pub use attribute::{data_attribute_name, AttrKind, AttrSource, AttrTarget, AttributeSpec};
pub use descriptor::{
    define_node_type, Marker, MarkupRule, NodeTypeBuilder, NodeTypeDescriptor, ID_ATTRIBUTE,
    ID_MARKUP_ATTRIBUTE,
};
pub use error::{ConfigError, SchemaError};
pub use instance::{merge_attrs, patch, AttributePatch, Attrs, NodeInstance};
pub use nodes::builtin_registry;
pub use registry::SchemaRegistry;
