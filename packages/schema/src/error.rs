//! Error types for node type definitions

use thiserror::Error;

/// Malformed descriptor, detected at registration time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Node type name must not be empty")]
    EmptyName,

    #[error("Attribute '{attribute}' on '{node_type}' collides with a reserved identifier")]
    ReservedAttribute { node_type: String, attribute: String },

    #[error("Attribute '{attribute}' is declared twice on '{node_type}'")]
    DuplicateAttribute { node_type: String, attribute: String },

    #[error("Default for '{attribute}' on '{node_type}' does not match its kind")]
    InvalidDefault { node_type: String, attribute: String },

    #[error("Node type '{node_type}' has no markup rule")]
    MissingMarkupRule { node_type: String },

    #[error("Node type '{0}' is already registered")]
    DuplicateNodeType(String),
}

/// Attribute values rejected by a descriptor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown attribute '{attribute}' for '{node_type}'")]
    UnknownAttribute { node_type: String, attribute: String },

    #[error("Invalid value {value} for '{attribute}' on '{node_type}'")]
    InvalidValue {
        node_type: String,
        attribute: String,
        value: String,
    },

    #[error("Attribute '{attribute}' on '{node_type}' cannot be patched")]
    ImmutableAttribute { node_type: String, attribute: String },
}
