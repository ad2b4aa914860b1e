//! # Undo/Redo History
//!
//! One entry per committed transaction, so a batched update over several
//! nodes is a single undo step.
//!
//! - Each entry keeps the transaction's steps and their inverses
//! - Undo applies the inverses and moves the entry to the redo stack
//! - Redo reapplies the original steps
//! - New transactions clear the redo stack
//! - The oldest entries are dropped beyond `max_levels` (0 = unlimited)

use crate::document::Document;
use crate::errors::StepError;
use crate::transaction::{apply_steps, Step};

/// Steps of one committed transaction
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Steps in application order
    pub steps: Vec<Step>,

    /// Inverse steps in undo order
    pub inverses: Vec<Step>,

    pub description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_levels: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a committed transaction
    pub fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent entry. Returns the restored document, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self, doc: &Document) -> Result<Option<Document>, StepError> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };

        match apply_steps(doc, &entry.inverses) {
            Ok(restored) => {
                self.redo_stack.push(entry);
                Ok(Some(restored))
            }
            Err(err) => {
                self.undo_stack.push(entry);
                Err(err)
            }
        }
    }

    /// Reapply the most recently undone entry
    pub fn redo(&mut self, doc: &Document) -> Result<Option<Document>, StepError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };

        match apply_steps(doc, &entry.steps) {
            Ok(replayed) => {
                self.undo_stack.push(entry);
                Ok(Some(replayed))
            }
            Err(err) => {
                self.redo_stack.push(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
