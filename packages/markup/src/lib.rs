//! # Richnode Markup
//!
//! The HTML subset custom nodes are persisted in: elements with ordered
//! attributes and text, parsed with a logos lexer and written back by a
//! small serializer.

pub mod ast;
pub mod entities;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{is_void_tag, Attributes, MarkupElement, MarkupNode};
pub use error::{ParseError, ParseResult};
pub use parser::{parse, Parser};
pub use serializer::{serialize, serialize_element, SerializeOptions};
