//! # Edit Session
//!
//! Everything one editing session needs, owned in one place: the host, the
//! node type registry, the id generator, options and the instance the style
//! toolbar is currently bound to. Create one when editing starts and drop it
//! when editing ends.

use crate::commands::{add_node, update_node, CommandContext, CommandTable, UpdateOutcome};
use crate::document::HostSchema;
use crate::errors::EditorError;
use crate::host::{HostEditor, MemoryEditor};
use crate::id_generator::IdGenerator;
use crate::locator::{find_by_id, SelectionContext};
use crate::markup_io::{document_from_markup, document_to_markup};
use crate::options::EditorOptions;
use crate::view::{ActiveNode, NodeViewBinding, ViewEvent, ViewState};
use richnode_schema::{builtin_registry, AttributePatch, NodeInstance, SchemaRegistry};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub struct EditSession<H: HostEditor = MemoryEditor> {
    host: H,
    registry: SchemaRegistry,
    ids: IdGenerator,
    options: EditorOptions,
    active: Option<ActiveNode>,
    commands: CommandTable,
}

impl EditSession<MemoryEditor> {
    /// Load a markup fragment into an in-memory host
    pub fn from_markup(source: &str, options: EditorOptions) -> Result<Self, EditorError> {
        let registry = builtin_registry(&options.vimeo)?;
        let doc = document_from_markup(source, &registry)?;

        let mut host = MemoryEditor::new(doc, HostSchema::new(&registry))
            .with_history_depth(options.history_depth);
        host.set_read_only(options.read_only);

        Ok(Self::with_registry(host, registry, options))
    }

    pub fn to_markup(&self) -> String {
        document_to_markup(
            self.host.document(),
            &self.registry,
            self.options.serialize_options(),
        )
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        if !self.host.is_editable() {
            return Err(EditorError::ReadOnly);
        }
        Ok(self.host.undo()?)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        if !self.host.is_editable() {
            return Err(EditorError::ReadOnly);
        }
        Ok(self.host.redo()?)
    }
}

impl<H: HostEditor> EditSession<H> {
    /// Session over an existing host with the built-in node types
    pub fn new(host: H, options: EditorOptions) -> Result<Self, EditorError> {
        let registry = builtin_registry(&options.vimeo)?;
        Ok(Self::with_registry(host, registry, options))
    }

    pub fn with_registry(host: H, registry: SchemaRegistry, options: EditorOptions) -> Self {
        let ids = match &options.id_seed {
            Some(key) => IdGenerator::new(key),
            None => IdGenerator::new(&process_session_key()),
        };
        info!(seed = ids.seed(), node_types = registry.len(), "Started edit session");

        Self {
            host,
            registry,
            ids,
            options,
            active: None,
            commands: CommandTable::builtin(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn commands_mut(&mut self) -> &mut CommandTable {
        &mut self.commands
    }

    /// Instance the style toolbar is bound to
    pub fn active(&self) -> Option<&ActiveNode> {
        self.active.as_ref()
    }

    pub fn set_selection(&mut self, selection: SelectionContext) {
        self.host.set_selection(selection);
    }

    pub fn add_node(
        &mut self,
        type_name: &str,
        overrides: &AttributePatch,
    ) -> Result<NodeInstance, EditorError> {
        Ok(add_node(
            &mut self.host,
            &self.registry,
            &mut self.ids,
            type_name,
            overrides,
        )?)
    }

    pub fn update_node(
        &mut self,
        type_name: &str,
        selection: &SelectionContext,
        patch: &AttributePatch,
    ) -> Result<UpdateOutcome, EditorError> {
        Ok(update_node(
            &mut self.host,
            &self.registry,
            type_name,
            selection,
            patch,
        )?)
    }

    /// Update against the host's current selection
    pub fn update_at_selection(
        &mut self,
        type_name: &str,
        patch: &AttributePatch,
    ) -> Result<UpdateOutcome, EditorError> {
        let selection = self.host.selection();
        self.update_node(type_name, &selection, patch)
    }

    /// Style toolbar path: update the active instance, wherever it is now
    pub fn apply_style_to_active(
        &mut self,
        patch: &AttributePatch,
    ) -> Result<UpdateOutcome, EditorError> {
        let Some(active) = self.active.clone() else {
            return Ok(UpdateOutcome { updated_count: 0 });
        };

        let Some(pos) = find_by_id(&self.host, &active.type_name, &active.id).and_then(|node| node.position)
        else {
            debug!(id = %active.id, "Active node is gone");
            self.active = None;
            return Ok(UpdateOutcome { updated_count: 0 });
        };

        self.update_node(&active.type_name, &SelectionContext::cursor(pos), patch)
    }

    pub fn bind(&self, type_name: &str, id: &str) -> NodeViewBinding {
        NodeViewBinding::new(type_name, id)
    }

    pub fn handle_view_event(
        &mut self,
        binding: &mut NodeViewBinding,
        event: ViewEvent,
    ) -> Result<ViewState, EditorError> {
        let state = binding.handle(&mut self.host, &self.registry, &mut self.active, event)?;
        Ok(state.clone())
    }

    /// Run a command from the table by name
    pub fn run_command(&mut self, name: &str, args: Value) -> Result<Value, EditorError> {
        let mut ctx = CommandContext {
            host: &mut self.host,
            registry: &self.registry,
            ids: &mut self.ids,
        };
        Ok(self.commands.dispatch(&mut ctx, name, args)?)
    }
}

fn process_session_key() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("{}-{}", std::process::id(), nanos)
}
