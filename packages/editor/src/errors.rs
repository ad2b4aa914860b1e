//! Error types for the editor

use richnode_markup::ParseError;
use richnode_schema::{ConfigError, SchemaError};
use thiserror::Error;

/// A transaction step that does not fit the document it is applied to
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Position {0} is outside the document")]
    OutOfRange(usize),

    #[error("No element starts at position {0}")]
    NoElementAt(usize),

    #[error("Position {0} is not between two sibling nodes")]
    NotAGap(usize),

    #[error("Position {0} is not inside a text block")]
    NotInTextblock(usize),

    #[error("Blocks around position {0} cannot be joined")]
    NotJoinable(usize),
}

/// Failure of a mutation command. Finding nothing to act on is not one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(#[from] SchemaError),

    #[error("Cannot insert '{type_name}' at position {position}")]
    InvalidInsertionPoint { type_name: String, position: usize },

    #[error("Node id '{0}' is already in the document")]
    DuplicateId(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Not a Vimeo URL: {0}")]
    InvalidEmbedUrl(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments for '{command}': {message}")]
    InvalidArguments { command: String, message: String },

    #[error("Result of '{command}' is not valid JSON: {message}")]
    InvalidOutput { command: String, message: String },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Schema configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),

    #[error("Document is read-only")]
    ReadOnly,
}
