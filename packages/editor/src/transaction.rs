//! # Transactions
//!
//! A transaction is an ordered list of steps committed as one undoable edit.
//! Each step's inverse is computed against the document as it is right
//! before that step runs, so undoing a transaction is replaying the inverses
//! in reverse order.
//!
//! Steps address nodes by position. Later steps see the positions produced
//! by earlier ones.

use crate::document::{content_size, normalize_content, Document, Element, Node};
use crate::errors::StepError;
use richnode_schema::Attrs;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace the attributes of the element starting at `pos`
    SetNodeAttrs { pos: usize, attrs: Attrs },

    /// Insert `node` into the gap at `pos`
    InsertNode { pos: usize, node: Node },

    /// Remove the element starting at `pos`
    DeleteNode { pos: usize },

    /// Split the innermost block around `pos` into two blocks of its type
    SplitBlock { pos: usize },

    /// Merge the two blocks meeting at gap `pos`
    JoinBlocks { pos: usize },

    /// Remove the text between `from` and `to`, both inside one text block
    DeleteText { from: usize, to: usize },

    /// Insert `text` at `pos` inside a text block
    InsertText { pos: usize, text: String },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::SetNodeAttrs { .. } => "setNodeAttrs",
            Step::InsertNode { .. } => "insertNode",
            Step::DeleteNode { .. } => "deleteNode",
            Step::SplitBlock { .. } => "splitBlock",
            Step::JoinBlocks { .. } => "joinBlocks",
            Step::DeleteText { .. } => "deleteText",
            Step::InsertText { .. } => "insertText",
        }
    }

    /// The step that undoes this one on `doc`
    pub fn invert(&self, doc: &Document) -> Result<Step, StepError> {
        match self {
            Step::SetNodeAttrs { pos, .. } => {
                let element = doc.element_at(*pos).ok_or(StepError::NoElementAt(*pos))?;
                Ok(Step::SetNodeAttrs {
                    pos: *pos,
                    attrs: element.attrs.clone(),
                })
            }

            Step::InsertNode { pos, .. } => {
                doc.resolve_gap(*pos).ok_or(StepError::NotAGap(*pos))?;
                Ok(Step::DeleteNode { pos: *pos })
            }

            Step::DeleteNode { pos } => {
                let element = doc.element_at(*pos).ok_or(StepError::NoElementAt(*pos))?;
                Ok(Step::InsertNode {
                    pos: *pos,
                    node: Node::Element(element.clone()),
                })
            }

            Step::SplitBlock { pos } => {
                split_target(doc, *pos)?;
                Ok(Step::JoinBlocks { pos: pos + 1 })
            }

            Step::JoinBlocks { pos } => {
                join_target(doc, *pos)?;
                Ok(Step::SplitBlock { pos: pos - 1 })
            }

            Step::DeleteText { from, to } => {
                let (_, _, text) = cut_text(doc, *from, *to)?;
                Ok(Step::InsertText { pos: *from, text })
            }

            Step::InsertText { pos, text } => {
                textblock_at(doc, *pos)?;
                Ok(Step::DeleteText {
                    from: *pos,
                    to: pos + text.chars().count(),
                })
            }
        }
    }

    pub fn apply(&self, doc: &mut Document) -> Result<(), StepError> {
        match self {
            Step::SetNodeAttrs { pos, attrs } => {
                let element = doc.element_at_mut(*pos).ok_or(StepError::NoElementAt(*pos))?;
                element.attrs = attrs.clone();
                Ok(())
            }

            Step::InsertNode { pos, node } => {
                let gap = doc.resolve_gap(*pos).ok_or(StepError::NotAGap(*pos))?;
                let content = doc
                    .content_at_mut(&gap.path)
                    .ok_or(StepError::NotAGap(*pos))?;
                content.insert(gap.index, node.clone());
                Ok(())
            }

            Step::DeleteNode { pos } => {
                let gap = doc.resolve_gap(*pos).ok_or(StepError::NoElementAt(*pos))?;
                let content = doc
                    .content_at_mut(&gap.path)
                    .ok_or(StepError::NoElementAt(*pos))?;
                match content.get(gap.index) {
                    Some(Node::Element(_)) => {
                        content.remove(gap.index);
                        Ok(())
                    }
                    _ => Err(StepError::NoElementAt(*pos)),
                }
            }

            Step::SplitBlock { pos } => {
                let (start, left, right) = split_target(doc, *pos)?;
                let gap = doc.resolve_gap(start).ok_or(StepError::NotInTextblock(*pos))?;
                let content = doc
                    .content_at_mut(&gap.path)
                    .ok_or(StepError::NotInTextblock(*pos))?;
                let Some(Node::Element(block)) = content.get_mut(gap.index) else {
                    return Err(StepError::NotInTextblock(*pos));
                };

                let tail = Element::container(block.type_name.clone(), block.attrs.clone(), right);
                block.content = Some(left);
                content.insert(gap.index + 1, tail.into());
                Ok(())
            }

            Step::JoinBlocks { pos } => {
                let index = join_target(doc, *pos)?;
                let gap = doc.resolve_gap(*pos).ok_or(StepError::NotJoinable(*pos))?;
                let content = doc
                    .content_at_mut(&gap.path)
                    .ok_or(StepError::NotJoinable(*pos))?;

                let tail = match content.remove(index) {
                    Node::Element(element) => element.content.unwrap_or_default(),
                    Node::Text(_) => return Err(StepError::NotJoinable(*pos)),
                };
                let Some(Node::Element(head)) = content.get_mut(index - 1) else {
                    return Err(StepError::NotJoinable(*pos));
                };
                let mut merged = head.content.take().unwrap_or_default();
                merged.extend(tail);
                head.content = Some(normalize_content(merged));
                Ok(())
            }

            Step::DeleteText { from, to } => {
                let (start, content, _) = cut_text(doc, *from, *to)?;
                set_block_content(doc, start, content).ok_or(StepError::NotInTextblock(*from))
            }

            Step::InsertText { pos, text } => {
                let (start, content) = textblock_at(doc, *pos)?;
                let (mut left, right) =
                    split_content(content, pos - start - 1).ok_or(StepError::NotInTextblock(*pos))?;
                left.push(Node::text(text.as_str()));
                left.extend(right);
                set_block_content(doc, start, normalize_content(left)).ok_or(StepError::NotInTextblock(*pos))
            }
        }
    }
}

/// Start and content of the innermost block holding `pos`
fn textblock_at(doc: &Document, pos: usize) -> Result<(usize, &[Node]), StepError> {
    let (start, block) = doc
        .ancestors_at(pos)
        .into_iter()
        .next()
        .ok_or(StepError::NotInTextblock(pos))?;
    let content = block.content.as_deref().ok_or(StepError::NotInTextblock(pos))?;
    Ok((start, content))
}

/// Block start, its content without `from..to`, and the text removed.
/// Fails unless the range is plain text.
fn cut_text(doc: &Document, from: usize, to: usize) -> Result<(usize, Vec<Node>, String), StepError> {
    let (start, content) = textblock_at(doc, from)?;
    if to < from || to > start + 1 + content_size(content) {
        return Err(StepError::NotInTextblock(to));
    }

    let (mut kept, rest) =
        split_content(content, from - start - 1).ok_or(StepError::NotInTextblock(from))?;
    let (removed, right) = split_content(&rest, to - from).ok_or(StepError::NotInTextblock(to))?;

    let mut text = String::new();
    for node in &removed {
        match node {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(_) => return Err(StepError::NotInTextblock(from)),
        }
    }

    kept.extend(right);
    Ok((start, normalize_content(kept), text))
}

fn set_block_content(doc: &mut Document, start: usize, content: Vec<Node>) -> Option<()> {
    let gap = doc.resolve_gap(start)?;
    let block = doc.content_at_mut(&gap.path)?.get_mut(gap.index)?.as_element_mut()?;
    block.content = Some(content);
    Some(())
}

/// Start of the block split at `pos` and its two content halves
fn split_target(doc: &Document, pos: usize) -> Result<(usize, Vec<Node>, Vec<Node>), StepError> {
    let (start, block) = doc
        .ancestors_at(pos)
        .into_iter()
        .next()
        .ok_or(StepError::NotInTextblock(pos))?;
    let content = block.content.as_deref().unwrap_or_default();
    let (left, right) =
        split_content(content, pos - start - 1).ok_or(StepError::NotInTextblock(pos))?;
    Ok((start, left, right))
}

/// Index of the second of the two blocks meeting at `pos`
fn join_target(doc: &Document, pos: usize) -> Result<usize, StepError> {
    let gap = doc.resolve_gap(pos).ok_or(StepError::NotJoinable(pos))?;
    let content = doc.content_at(&gap.path).ok_or(StepError::NotJoinable(pos))?;
    if gap.index == 0 {
        return Err(StepError::NotJoinable(pos));
    }

    match (content.get(gap.index - 1), content.get(gap.index)) {
        (Some(Node::Element(head)), Some(Node::Element(tail)))
            if !head.is_atomic()
                && !tail.is_atomic()
                && head.type_name == tail.type_name
                && head.attrs == tail.attrs =>
        {
            Ok(gap.index)
        }
        _ => Err(StepError::NotJoinable(pos)),
    }
}

/// Split block content at a content offset. Text is cut in two; an offset
/// inside any other child cannot be split.
pub fn split_content(content: &[Node], offset: usize) -> Option<(Vec<Node>, Vec<Node>)> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;

    for node in content {
        let size = node.size();
        if pos + size <= offset {
            left.push(node.clone());
        } else if pos >= offset {
            right.push(node.clone());
        } else if let Node::Text(text) = node {
            let at = text
                .char_indices()
                .nth(offset - pos)
                .map_or(text.len(), |(byte, _)| byte);
            left.push(Node::text(&text[..at]));
            right.push(Node::text(&text[at..]));
        } else {
            return None;
        }
        pos += size;
    }

    (offset <= pos).then_some((left, right))
}

/// One atomic, undoable batch of steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    steps: Vec<Step>,
    description: Option<String>,
}

/// A committed transaction: the new document and the steps that undo it
#[derive(Debug, Clone)]
pub struct Applied {
    pub doc: Document,
    pub inverses: Vec<Step>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run every step against a copy of `doc`. Nothing is applied unless
    /// all steps succeed.
    pub fn apply_to(&self, doc: &Document) -> Result<Applied, StepError> {
        let mut working = doc.clone();
        let mut inverses = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            if step_pos(step) > working.size() {
                return Err(StepError::OutOfRange(step_pos(step)));
            }
            inverses.push(step.invert(&working)?);
            step.apply(&mut working)?;
        }

        inverses.reverse();
        Ok(Applied {
            doc: working,
            inverses,
        })
    }
}

/// Apply `steps` in order to a copy of `doc`
pub fn apply_steps(doc: &Document, steps: &[Step]) -> Result<Document, StepError> {
    let mut working = doc.clone();
    for step in steps {
        step.apply(&mut working)?;
    }
    Ok(working)
}

fn step_pos(step: &Step) -> usize {
    match step {
        Step::SetNodeAttrs { pos, .. }
        | Step::InsertNode { pos, .. }
        | Step::DeleteNode { pos }
        | Step::SplitBlock { pos }
        | Step::JoinBlocks { pos }
        | Step::InsertText { pos, .. } => *pos,
        Step::DeleteText { to, .. } => *to,
    }
}
