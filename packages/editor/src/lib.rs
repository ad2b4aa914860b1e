//! # Richnode Editor
//!
//! Custom structured nodes inside a rich-text document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup + schema: fragment ⇄ NodeInstance    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - locator: selection → target nodes        │
//! │  - commands: add / update / delete          │
//! │  - view: per-node interaction state         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ HostEditor: positions, transactions, undo   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Positions are ephemeral**: nodes are found by selection or id, never cached
//! 2. **One command, one transaction**: a range update is a single undo step
//! 3. **Nothing to do is not an error**: an empty selection updates zero nodes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use richnode_editor::{EditSession, EditorOptions, SelectionContext};
//! use richnode_schema::patch;
//!
//! let mut session = EditSession::from_markup("<p>Hello</p>", EditorOptions::default())?;
//! session.set_selection(SelectionContext::cursor(7));
//!
//! let button = session.add_node("customButton", &patch([("label", "Save")]))?;
//! session.update_at_selection("customButton", &patch([("buttonColor", "destructive")]))?;
//!
//! println!("{}", session.to_markup());
//! ```

mod commands;
mod document;
mod errors;
mod history;
mod host;
mod id_generator;
mod locator;
mod markup_io;
mod options;
mod session;
mod transaction;
mod view;
mod visitor;

pub use commands::{
    add_custom_button, add_node, delete_node, embed_vimeo_link, insert_vimeo_video,
    remove_caption, set_image_with_caption, update_caption, update_custom_button, update_node,
    CommandContext, CommandFn, CommandTable, ImageOptions, UpdateOutcome, VideoOptions,
};
pub use document::{
    content_size, normalize_content, Document, Element, Gap, HostSchema, Node, BLOCKQUOTE, HEADING, PARAGRAPH,
};
pub use errors::{CommandError, EditorError, StepError};
pub use history::{HistoryEntry, UndoStack};
pub use host::{HostEditor, MemoryEditor};
pub use id_generator::{session_seed, IdGenerator};
pub use locator::{find_by_id, locate, SelectionContext, SelectionKind};
pub use markup_io::{document_from_markup, document_to_markup, parse_blocks};
pub use options::EditorOptions;
pub use session::EditSession;
pub use transaction::{apply_steps, Applied, Step, Transaction};
pub use view::{ActiveNode, NodeViewBinding, ViewEvent, ViewState};
pub use visitor::{walk_document, Visitor};
