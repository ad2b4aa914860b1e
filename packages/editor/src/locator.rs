//! # Node Locator
//!
//! Resolves which nodes of a type a command targets, from the current
//! selection. Finding nothing is a normal outcome and yields an empty list.
//!
//! - A cursor looks at the node starting exactly at its position first and
//!   then at the enclosing containers, innermost first. At most one node is
//!   returned, so a leaf at the cursor beats a container around it.
//! - A range returns every node of the type whose span intersects it, in
//!   document order.

use crate::host::HostEditor;
use richnode_schema::NodeInstance;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Cursor,
    Range,
}

/// Selection as seen by commands. `anchor` is where the selection started
/// and `head` where it ends; they may be in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SelectionRepr")]
pub struct SelectionContext {
    pub kind: SelectionKind,
    pub anchor: usize,
    pub head: usize,
}

impl SelectionContext {
    pub fn cursor(pos: usize) -> Self {
        Self {
            kind: SelectionKind::Cursor,
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self {
            kind: SelectionKind::Range,
            anchor,
            head,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_cursor(&self) -> bool {
        self.kind == SelectionKind::Cursor
    }

    /// Same selection with both ends kept within `0..=size`
    pub fn clamped(self, size: usize) -> Self {
        Self {
            anchor: self.anchor.min(size),
            head: self.head.min(size),
            ..self
        }
    }
}

// A cursor may be written with only `anchor`
#[derive(Deserialize)]
struct SelectionRepr {
    kind: SelectionKind,
    anchor: usize,
    #[serde(default)]
    head: Option<usize>,
}

impl From<SelectionRepr> for SelectionContext {
    fn from(repr: SelectionRepr) -> Self {
        let head = match repr.kind {
            SelectionKind::Cursor => repr.anchor,
            SelectionKind::Range => repr.head.unwrap_or(repr.anchor),
        };
        Self {
            kind: repr.kind,
            anchor: repr.anchor,
            head,
        }
    }
}

/// Nodes of `type_name` targeted by `selection`
pub fn locate<H: HostEditor + ?Sized>(
    host: &H,
    type_name: &str,
    selection: &SelectionContext,
) -> Vec<NodeInstance> {
    let found: Vec<NodeInstance> = match selection.kind {
        SelectionKind::Cursor => locate_at_cursor(host, type_name, selection.head)
            .into_iter()
            .collect(),
        SelectionKind::Range => host
            .query_nodes_in_range(selection.from(), selection.to())
            .into_iter()
            .filter(|node| node.type_name == type_name)
            .collect(),
    };

    debug!(
        type_name,
        kind = ?selection.kind,
        from = selection.from(),
        to = selection.to(),
        matches = found.len(),
        "Located nodes"
    );
    found
}

fn locate_at_cursor<H: HostEditor + ?Sized>(
    host: &H,
    type_name: &str,
    pos: usize,
) -> Option<NodeInstance> {
    host.query_node_at(pos)
        .filter(|node| node.type_name == type_name)
        .or_else(|| {
            host.query_ancestors_at(pos)
                .into_iter()
                .find(|node| node.type_name == type_name)
        })
}

/// Fresh lookup of a node by its instance id
pub fn find_by_id<H: HostEditor + ?Sized>(
    host: &H,
    type_name: &str,
    id: &str,
) -> Option<NodeInstance> {
    host.query_nodes_in_range(0, host.document_size())
        .into_iter()
        .find(|node| node.type_name == type_name && node.id() == Some(id))
}
