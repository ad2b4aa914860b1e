//! # Host editor
//!
//! The seam between the custom-node core and whatever owns the document.
//! Commands and the locator only talk to [`HostEditor`]; [`MemoryEditor`]
//! is the in-process implementation used by the session and the CLI.

use crate::document::{Document, HostSchema, Node};
use crate::errors::StepError;
use crate::history::{HistoryEntry, UndoStack};
use crate::locator::SelectionContext;
use crate::transaction::{apply_steps, Step, Transaction};
use richnode_schema::NodeInstance;
use tracing::{debug, warn};

/// Document owner the core runs against
pub trait HostEditor {
    fn selection(&self) -> SelectionContext;

    fn set_selection(&mut self, selection: SelectionContext);

    /// Whether transactions can currently be committed
    fn is_editable(&self) -> bool;

    fn document_size(&self) -> usize;

    /// Element starting exactly at `pos`
    fn query_node_at(&self, pos: usize) -> Option<NodeInstance>;

    /// Containers enclosing `pos`, innermost first
    fn query_ancestors_at(&self, pos: usize) -> Vec<NodeInstance>;

    /// Elements intersecting `from..to` in document order
    fn query_nodes_in_range(&self, from: usize, to: usize) -> Vec<NodeInstance>;

    /// Commit all steps as one undoable edit, or none of them
    fn apply_transaction(&mut self, tx: Transaction) -> bool;

    /// Insert a node for `instance` at the cursor, if the schema allows it there
    fn insert_at_cursor(&mut self, instance: &NodeInstance) -> bool;

    /// Text of the innermost text block around `pos`, from its start up to
    /// `pos`. Inline nodes read as U+FFFC, so each char is one position.
    fn text_before(&self, pos: usize) -> Option<String>;

    /// Swap the text `from..to` for a node of `instance` in one transaction
    fn replace_text_with_node(&mut self, from: usize, to: usize, instance: &NodeInstance) -> bool;
}

/// In-memory host with history
#[derive(Debug)]
pub struct MemoryEditor {
    doc: Document,
    selection: SelectionContext,
    schema: HostSchema,
    history: UndoStack,
    read_only: bool,

    /// Incremented on every committed change, undo and redo included
    version: u64,
}

impl MemoryEditor {
    pub fn new(doc: Document, schema: HostSchema) -> Self {
        Self {
            doc,
            selection: SelectionContext::cursor(0),
            schema,
            history: UndoStack::new(),
            read_only: false,
            version: 0,
        }
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history = UndoStack::with_max_levels(depth);
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn schema(&self) -> &HostSchema {
        &self.schema
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn undo(&mut self) -> Result<bool, StepError> {
        match self.history.undo(&self.doc)? {
            Some(doc) => {
                self.replace_document(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, StepError> {
        match self.history.redo(&self.doc)? {
            Some(doc) => {
                self.replace_document(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
        self.version += 1;
        self.selection = self.selection.clamped(self.doc.size());
    }

    fn commit(&mut self, tx: Transaction, selection_after: Option<SelectionContext>) -> bool {
        if self.read_only {
            warn!(steps = tx.len(), "Rejected transaction on read-only document");
            return false;
        }

        if tx.is_empty() {
            return true;
        }

        match tx.apply_to(&self.doc) {
            Ok(applied) => {
                self.history.push(HistoryEntry {
                    steps: tx.steps().to_vec(),
                    inverses: applied.inverses,
                    description: tx.description().map(str::to_string),
                });
                self.replace_document(applied.doc);
                if let Some(selection) = selection_after {
                    self.selection = selection.clamped(self.doc.size());
                }
                debug!(version = self.version, steps = tx.len(), "Committed transaction");
                true
            }
            Err(err) => {
                warn!(error = %err, "Transaction failed to apply");
                false
            }
        }
    }

    /// Steps needed before a block can go in at `pos`, and where it goes.
    ///
    /// A gap that accepts blocks is used as is. Inside a text block the
    /// node is lifted to the block's edge when the cursor is at its start or
    /// end, and the block is split otherwise.
    fn plan_block_insertion(&self, doc: &Document, pos: usize) -> Option<(Vec<Step>, usize)> {
        if pos > doc.size() {
            return None;
        }

        if let Some(gap) = doc.resolve_gap(pos) {
            if self.accepts_blocks_at(doc, &gap.path) {
                return Some((Vec::new(), pos));
            }
        }

        let (start, block) = doc.ancestors_at(pos).into_iter().next()?;
        if !self.schema.is_textblock(&block.type_name) {
            return None;
        }
        let outer = doc.resolve_gap(start)?;
        if !self.accepts_blocks_at(doc, &outer.path) {
            return None;
        }

        let end = start + block.size();
        if pos == start + 1 {
            Some((Vec::new(), start))
        } else if pos == end - 1 {
            Some((Vec::new(), end))
        } else {
            Some((vec![Step::SplitBlock { pos }], pos + 1))
        }
    }

    /// Like [`Self::plan_block_insertion`], but a text block left empty is
    /// replaced by the node instead of kept beside it
    fn plan_block_replacement(&self, doc: &Document, pos: usize) -> Option<(Vec<Step>, usize)> {
        if let Some((start, block)) = doc.ancestors_at(pos).into_iter().next() {
            let emptied = self.schema.is_textblock(&block.type_name)
                && block.content.as_ref().is_some_and(Vec::is_empty);
            let outer = doc.resolve_gap(start)?;
            if emptied && self.accepts_blocks_at(doc, &outer.path) {
                return Some((vec![Step::DeleteNode { pos: start }], start));
            }
        }
        self.plan_block_insertion(doc, pos)
    }

    fn accepts_blocks_at(&self, doc: &Document, path: &[usize]) -> bool {
        let parent = doc
            .element_by_path(path)
            .map(|element| element.type_name.as_str());
        self.schema.accepts_blocks(parent)
    }
}

impl HostEditor for MemoryEditor {
    fn selection(&self) -> SelectionContext {
        self.selection
    }

    fn set_selection(&mut self, selection: SelectionContext) {
        self.selection = selection.clamped(self.doc.size());
    }

    fn is_editable(&self) -> bool {
        !self.read_only
    }

    fn document_size(&self) -> usize {
        self.doc.size()
    }

    fn query_node_at(&self, pos: usize) -> Option<NodeInstance> {
        self.doc.element_at(pos).map(|element| element.to_instance(pos))
    }

    fn query_ancestors_at(&self, pos: usize) -> Vec<NodeInstance> {
        self.doc
            .ancestors_at(pos)
            .into_iter()
            .map(|(start, element)| element.to_instance(start))
            .collect()
    }

    fn query_nodes_in_range(&self, from: usize, to: usize) -> Vec<NodeInstance> {
        self.doc
            .elements_between(from, to)
            .into_iter()
            .map(|(start, element)| element.to_instance(start))
            .collect()
    }

    fn apply_transaction(&mut self, tx: Transaction) -> bool {
        self.commit(tx, None)
    }

    fn insert_at_cursor(&mut self, instance: &NodeInstance) -> bool {
        if self.read_only {
            warn!(type_name = %instance.type_name, "Rejected insertion on read-only document");
            return false;
        }

        let pos = self.selection.from();
        let Some((mut steps, at)) = self.plan_block_insertion(&self.doc, pos) else {
            debug!(type_name = %instance.type_name, pos, "No valid insertion point");
            return false;
        };

        let node = self.schema.create_node(instance);
        let after = at + node.size();
        steps.push(Step::InsertNode { pos: at, node });

        let mut tx = Transaction::new().with_description(format!("insert {}", instance.type_name));
        for step in steps {
            tx.push(step);
        }

        debug!(type_name = %instance.type_name, pos, at, "Inserting node");
        self.commit(tx, Some(SelectionContext::cursor(after)))
    }

    fn text_before(&self, pos: usize) -> Option<String> {
        let (start, block) = self.doc.ancestors_at(pos).into_iter().next()?;
        if !self.schema.is_textblock(&block.type_name) {
            return None;
        }

        let mut text: String = block
            .content
            .iter()
            .flatten()
            .map(|node| match node {
                Node::Text(chunk) => chunk.clone(),
                Node::Element(_) => "\u{fffc}".repeat(node.size()),
            })
            .collect();
        let end = text
            .char_indices()
            .nth(pos - start - 1)
            .map_or(text.len(), |(byte, _)| byte);
        text.truncate(end);
        Some(text)
    }

    fn replace_text_with_node(&mut self, from: usize, to: usize, instance: &NodeInstance) -> bool {
        if self.read_only {
            warn!(type_name = %instance.type_name, "Rejected replacement on read-only document");
            return false;
        }

        let delete = Step::DeleteText { from, to };
        let Ok(cleared) = apply_steps(&self.doc, std::slice::from_ref(&delete)) else {
            debug!(from, to, "Text to replace is not plain text");
            return false;
        };
        let Some((placement, at)) = self.plan_block_replacement(&cleared, from) else {
            debug!(type_name = %instance.type_name, from, "No valid insertion point");
            return false;
        };

        let node = self.schema.create_node(instance);
        let after = at + node.size();
        let mut tx = Transaction::new()
            .with_description(format!("replace text with {}", instance.type_name))
            .step(delete);
        for step in placement {
            tx.push(step);
        }
        tx.push(Step::InsertNode { pos: at, node });

        self.commit(tx, Some(SelectionContext::cursor(after)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, Node, PARAGRAPH};
    use richnode_schema::nodes::VimeoOptions;
    use richnode_schema::{builtin_registry, patch};

    fn editor(content: Vec<Node>) -> MemoryEditor {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        MemoryEditor::new(Document::new(content), HostSchema::new(&registry))
    }

    fn button(label: &str) -> NodeInstance {
        NodeInstance::new("customButton", patch([("id", label), ("label", label)]))
    }

    #[test]
    fn test_insert_between_blocks() {
        let mut host = editor(vec![Node::paragraph(vec![Node::text("ab")])]);
        host.set_selection(SelectionContext::cursor(4));

        assert!(host.insert_at_cursor(&button("x")));
        assert_eq!(host.document().content.len(), 2);
        assert_eq!(host.selection(), SelectionContext::cursor(5));
        assert_eq!(host.version(), 1);
    }

    #[test]
    fn test_insert_lifts_to_paragraph_edges() {
        let mut host = editor(vec![Node::paragraph(vec![Node::text("ab")])]);

        host.set_selection(SelectionContext::cursor(1));
        assert!(host.insert_at_cursor(&button("front")));
        assert_eq!(host.query_node_at(0).map(|n| n.type_name), Some("customButton".into()));

        // paragraph now spans 1..5, its content ends at 4
        host.set_selection(SelectionContext::cursor(4));
        assert!(host.insert_at_cursor(&button("back")));
        assert_eq!(host.query_node_at(5).and_then(|n| n.id().map(str::to_string)), Some("back".into()));
        assert_eq!(host.document().content.len(), 3);
    }

    #[test]
    fn test_insert_mid_paragraph_splits_and_undoes() {
        let mut host = editor(vec![Node::paragraph(vec![Node::text("abcd")])]);
        let original = host.document().clone();
        host.set_selection(SelectionContext::cursor(3));

        assert!(host.insert_at_cursor(&button("mid")));
        assert_eq!(
            host.document().content,
            vec![
                Node::paragraph(vec![Node::text("ab")]),
                Element::leaf("customButton", button("mid").attrs).into(),
                Node::paragraph(vec![Node::text("cd")]),
            ]
        );
        assert_eq!(host.history().undo_levels(), 1);

        assert!(host.undo().unwrap());
        assert_eq!(host.document(), &original);
        assert!(host.redo().unwrap());
        assert_eq!(host.document().content.len(), 3);
    }

    #[test]
    fn test_insert_refused_outside_block_context() {
        let mut host = editor(vec![Node::Element(Element::container(
            "listItem",
            Default::default(),
            vec![Node::text("x")],
        ))]);
        host.set_selection(SelectionContext::cursor(1));

        assert!(!host.insert_at_cursor(&button("nope")));
        assert_eq!(host.version(), 0);
    }

    #[test]
    fn test_read_only_rejects_everything() {
        let mut host = editor(vec![Node::paragraph(vec![])]);
        host.set_read_only(true);

        assert!(!host.is_editable());
        assert!(!host.insert_at_cursor(&button("x")));
        assert!(!host.apply_transaction(Transaction::new().step(Step::DeleteNode { pos: 0 })));
        assert_eq!(host.document().content[0].type_name(), Some(PARAGRAPH));
    }

    #[test]
    fn test_text_before_reads_inline_nodes_as_one_char() {
        let host = editor(vec![Node::paragraph(vec![
            Node::text("ab"),
            Element::leaf("customButton", button("x").attrs).into(),
            Node::text("cd"),
        ])]);

        assert_eq!(host.text_before(5).as_deref(), Some("ab\u{fffc}c"));
        assert_eq!(host.text_before(1).as_deref(), Some(""));
        assert_eq!(host.text_before(0), None);
    }

    #[test]
    fn test_replace_text_mid_paragraph() {
        let mut host = editor(vec![Node::paragraph(vec![Node::text("ab link cd")])]);
        let original = host.document().clone();

        assert!(host.replace_text_with_node(4, 8, &button("x")));

        assert_eq!(
            host.document().content,
            vec![
                Node::paragraph(vec![Node::text("ab ")]),
                Element::leaf("customButton", button("x").attrs).into(),
                Node::paragraph(vec![Node::text(" cd")]),
            ]
        );
        assert_eq!(host.history().undo_levels(), 1);
        assert_eq!(host.selection(), SelectionContext::cursor(6));

        assert!(host.undo().unwrap());
        assert_eq!(host.document(), &original);
    }

    #[test]
    fn test_replace_whole_paragraph_text_drops_the_paragraph() {
        let mut host = editor(vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::paragraph(vec![Node::text("link")]),
        ]);

        assert!(host.replace_text_with_node(4, 8, &button("x")));

        assert_eq!(
            host.document().content,
            vec![
                Node::paragraph(vec![Node::text("a")]),
                Element::leaf("customButton", button("x").attrs).into(),
            ]
        );
    }

    #[test]
    fn test_failed_transaction_keeps_document() {
        let mut host = editor(vec![Node::paragraph(vec![Node::text("ab")])]);

        assert!(!host.apply_transaction(Transaction::new().step(Step::DeleteNode { pos: 1 })));
        assert_eq!(host.version(), 0);
        assert!(!host.history().can_undo());
    }
}
