//! # Interactive view binding
//!
//! Each custom node shown in the editor gets a [`NodeViewBinding`]: a small
//! state machine driven by UI events. The binding holds the node's id, never
//! its position; every event re-resolves the node first, and a node that can
//! no longer be found moves the binding to [`ViewState::Deleted`] for good.
//!
//! ```text
//! Viewing --click--> Selected --begin_edit--> Editing { draft }
//!    ^                  |  ^                     |
//!    +--click_elsewhere-+  +----apply/cancel-----+
//! ```

use crate::commands::{delete_node, update_node};
use crate::errors::CommandError;
use crate::host::HostEditor;
use crate::locator::{find_by_id, SelectionContext};
use richnode_schema::{AttributePatch, NodeInstance, SchemaRegistry, ID_ATTRIBUTE};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Viewing,
    Selected,
    Editing { draft: AttributePatch },
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Click,
    ClickElsewhere,
    BeginEdit,
    /// Merge fields into the pending draft
    SetDraft(AttributePatch),
    Apply,
    Cancel,
    /// Style toolbar change, committed immediately
    ApplyStyle(AttributePatch),
    Delete,
    /// The document changed underneath the view
    Sync,
}

/// The instance the style toolbar acts on. Session state, not document state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveNode {
    pub type_name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeViewBinding {
    type_name: String,
    id: String,
    state: ViewState,
}

impl NodeViewBinding {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
            state: ViewState::Viewing,
        }
    }

    /// Binding for a node already in the document. Nodes without an id cannot be bound.
    pub fn for_instance(instance: &NodeInstance) -> Option<Self> {
        instance
            .id()
            .map(|id| Self::new(instance.type_name.clone(), id))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state == ViewState::Deleted
    }

    /// Current snapshot of the bound node
    pub fn resolve<H: HostEditor + ?Sized>(&self, host: &H) -> Option<NodeInstance> {
        find_by_id(host, &self.type_name, &self.id)
    }

    /// Feed one event through the state machine.
    ///
    /// Events that make no sense in the current state are ignored. A failed
    /// apply leaves the binding in `Editing` with its draft intact.
    pub fn handle<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        registry: &SchemaRegistry,
        active: &mut Option<ActiveNode>,
        event: ViewEvent,
    ) -> Result<&ViewState, CommandError> {
        if self.is_deleted() {
            return Ok(&self.state);
        }

        let Some((node, pos)) = self
            .resolve(&*host)
            .and_then(|node| node.position.map(|pos| (node, pos)))
        else {
            debug!(type_name = %self.type_name, id = %self.id, "Bound node is gone");
            self.release(active);
            self.state = ViewState::Deleted;
            return Ok(&self.state);
        };
        let at = SelectionContext::cursor(pos);

        let state = std::mem::replace(&mut self.state, ViewState::Viewing);
        self.state = match (state, event) {
            (ViewState::Viewing | ViewState::Selected, ViewEvent::Click) => {
                *active = Some(ActiveNode {
                    type_name: self.type_name.clone(),
                    id: self.id.clone(),
                });
                host.set_selection(at);
                ViewState::Selected
            }
            (_, ViewEvent::ClickElsewhere) => {
                self.release(active);
                ViewState::Viewing
            }
            (ViewState::Selected, ViewEvent::BeginEdit) if host.is_editable() => {
                ViewState::Editing {
                    draft: editable_attrs(&node),
                }
            }
            (ViewState::Editing { mut draft }, ViewEvent::SetDraft(fields)) => {
                draft.extend(fields);
                ViewState::Editing { draft }
            }
            (ViewState::Editing { draft }, ViewEvent::Apply) if !changes_node(&draft, &node) => {
                debug!(id = %self.id, "Draft unchanged, nothing to apply");
                ViewState::Selected
            }
            (ViewState::Editing { draft }, ViewEvent::Apply) => {
                if let Err(err) = update_node(host, registry, &self.type_name, &at, &draft) {
                    self.state = ViewState::Editing { draft };
                    return Err(err);
                }
                ViewState::Selected
            }
            (ViewState::Editing { .. }, ViewEvent::Cancel) => ViewState::Selected,
            (state @ (ViewState::Selected | ViewState::Editing { .. }), ViewEvent::ApplyStyle(style)) => {
                let result = update_node(host, registry, &self.type_name, &at, &style);
                self.state = state;
                result?;
                return Ok(&self.state);
            }
            (ViewState::Selected | ViewState::Editing { .. }, ViewEvent::Delete) => {
                delete_node(host, &self.type_name, &self.id)?;
                self.release(active);
                ViewState::Deleted
            }
            (state, event) => {
                debug!(id = %self.id, ?event, "Ignored view event");
                state
            }
        };

        Ok(&self.state)
    }

    fn release(&self, active: &mut Option<ActiveNode>) {
        if active.as_ref().is_some_and(|node| node.id == self.id) {
            *active = None;
        }
    }
}

/// Current attributes minus the id, the starting point of an edit form
fn editable_attrs(node: &NodeInstance) -> AttributePatch {
    node.attrs
        .iter()
        .filter(|(key, _)| key.as_str() != ID_ATTRIBUTE)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn changes_node(draft: &AttributePatch, node: &NodeInstance) -> bool {
    draft
        .iter()
        .any(|(key, value)| node.attr(key) != Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Element, HostSchema, Node};
    use crate::host::MemoryEditor;
    use richnode_schema::nodes::{VimeoOptions, CUSTOM_BUTTON};
    use richnode_schema::{builtin_registry, patch};
    use serde_json::json;

    fn setup() -> (MemoryEditor, SchemaRegistry, NodeViewBinding) {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        let button = registry
            .get(CUSTOM_BUTTON)
            .unwrap()
            .construct(&patch([("id", "btn-1"), ("label", "Save")]))
            .unwrap();
        let doc = Document::new(vec![
            Node::paragraph(vec![Node::text("Intro")]),
            Element::leaf(CUSTOM_BUTTON, button.attrs).into(),
        ]);
        let host = MemoryEditor::new(doc, HostSchema::new(&registry));
        (host, registry, NodeViewBinding::new(CUSTOM_BUTTON, "btn-1"))
    }

    #[test]
    fn test_click_selects_and_moves_cursor() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;

        let state = view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();

        assert_eq!(state, &ViewState::Selected);
        assert_eq!(active.as_ref().map(|node| node.id.as_str()), Some("btn-1"));
        assert_eq!(host.selection(), SelectionContext::cursor(7));

        view.handle(&mut host, &registry, &mut active, ViewEvent::ClickElsewhere).unwrap();
        assert_eq!(view.state(), &ViewState::Viewing);
        assert!(active.is_none());
    }

    #[test]
    fn test_edit_apply_commits_draft() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;

        for event in [
            ViewEvent::Click,
            ViewEvent::BeginEdit,
            ViewEvent::SetDraft(patch([("label", "Send")])),
            ViewEvent::SetDraft(patch([("buttonColor", "secondary")])),
        ] {
            view.handle(&mut host, &registry, &mut active, event).unwrap();
        }
        assert!(matches!(
            view.state(),
            ViewState::Editing { draft } if draft.get("label") == Some(&json!("Send"))
                && draft.get("buttonColor") == Some(&json!("secondary"))
        ));

        view.handle(&mut host, &registry, &mut active, ViewEvent::Apply).unwrap();

        let node = view.resolve(&host).unwrap();
        assert_eq!(view.state(), &ViewState::Selected);
        assert_eq!(node.attr("label"), Some(&json!("Send")));
        assert_eq!(node.attr("buttonColor"), Some(&json!("secondary")));
        assert_eq!(host.history().undo_levels(), 1);
    }

    #[test]
    fn test_begin_edit_seeds_draft_from_node() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();

        view.handle(&mut host, &registry, &mut active, ViewEvent::BeginEdit).unwrap();

        let ViewState::Editing { draft } = view.state() else {
            panic!("expected Editing, got {:?}", view.state());
        };
        assert_eq!(draft.get("label"), Some(&json!("Save")));
        assert_eq!(draft.get("buttonSize"), Some(&json!("md")));
        assert!(!draft.contains_key("id"));
    }

    #[test]
    fn test_unchanged_apply_commits_nothing() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        for event in [
            ViewEvent::Click,
            ViewEvent::BeginEdit,
            ViewEvent::SetDraft(patch([("label", "Save")])),
            ViewEvent::Apply,
        ] {
            view.handle(&mut host, &registry, &mut active, event).unwrap();
        }

        assert_eq!(view.state(), &ViewState::Selected);
        assert_eq!(host.history().undo_levels(), 0);
        assert_eq!(host.version(), 0);
    }

    #[test]
    fn test_invalid_draft_keeps_editing() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();
        view.handle(&mut host, &registry, &mut active, ViewEvent::BeginEdit).unwrap();
        view.handle(&mut host, &registry, &mut active, ViewEvent::SetDraft(patch([("buttonSize", "huge")])))
            .unwrap();

        let result = view.handle(&mut host, &registry, &mut active, ViewEvent::Apply);

        assert!(matches!(result, Err(CommandError::InvalidPatch(_))));
        assert!(matches!(view.state(), ViewState::Editing { .. }));
        assert_eq!(host.version(), 0);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();
        view.handle(&mut host, &registry, &mut active, ViewEvent::BeginEdit).unwrap();
        view.handle(&mut host, &registry, &mut active, ViewEvent::SetDraft(patch([("label", "Nope")])))
            .unwrap();

        view.handle(&mut host, &registry, &mut active, ViewEvent::Cancel).unwrap();

        assert_eq!(view.state(), &ViewState::Selected);
        assert_eq!(view.resolve(&host).unwrap().attr("label"), Some(&json!("Save")));
    }

    #[test]
    fn test_position_is_resolved_per_event() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();

        // a new block in front shifts the button
        host.set_selection(SelectionContext::cursor(0));
        assert!(host.insert_at_cursor(&NodeInstance::new(CUSTOM_BUTTON, patch([("id", "btn-0")]))));

        view.handle(&mut host, &registry, &mut active, ViewEvent::ApplyStyle(patch([("buttonAlignment", "right")])))
            .unwrap();

        let first = host.query_node_at(0).unwrap();
        let bound = view.resolve(&host).unwrap();
        assert_eq!(first.attr("buttonAlignment"), None);
        assert_eq!(bound.position, Some(8));
        assert_eq!(bound.attr("buttonAlignment"), Some(&json!("right")));
    }

    #[test]
    fn test_disappearing_node_is_terminal() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();

        assert!(delete_node(&mut host, CUSTOM_BUTTON, "btn-1").unwrap());
        view.handle(&mut host, &registry, &mut active, ViewEvent::Sync).unwrap();

        assert!(view.is_deleted());
        assert!(active.is_none());

        let version = host.version();
        view.handle(&mut host, &registry, &mut active, ViewEvent::ApplyStyle(patch([("label", "x")])))
            .unwrap();
        assert_eq!(host.version(), version);
    }

    #[test]
    fn test_delete_event() {
        let (mut host, registry, mut view) = setup();
        let mut active = None;
        view.handle(&mut host, &registry, &mut active, ViewEvent::Click).unwrap();

        view.handle(&mut host, &registry, &mut active, ViewEvent::Delete).unwrap();

        assert!(view.is_deleted());
        assert!(active.is_none());
        assert_eq!(host.document().content.len(), 1);
    }
}
