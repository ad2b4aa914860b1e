//! # Mutation commands
//!
//! Every attribute change to a custom node goes through [`update_node`]:
//! the targets come from the locator, the patch is merged onto each one and
//! all of them are written in a single transaction, so a range update is one
//! undo step. Zero targets is a normal outcome and commits nothing.
//!
//! [`add_node`] builds a full instance (defaults, overrides and a fresh id)
//! and hands it to the host's insertion primitive at the cursor. Ids are
//! unique across the document; a caller-supplied id already in use is
//! refused.
//!
//! Commands are also reachable by name through [`CommandTable`], which takes
//! and returns JSON.

use crate::errors::CommandError;
use crate::host::HostEditor;
use crate::id_generator::IdGenerator;
use crate::locator::{find_by_id, locate, SelectionContext};
use crate::transaction::{Step, Transaction};
use richnode_schema::nodes::{
    find_vimeo_url, vimeo_embed_src, ButtonPatch, CUSTOM_BUTTON, IMAGE_WITH_CAPTION, VIMEO_VIDEO,
};
use richnode_schema::{
    patch, AttributePatch, NodeInstance, NodeTypeDescriptor, SchemaRegistry, ID_ATTRIBUTE,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub updated_count: usize,
}

/// Arguments of [`set_image_with_caption`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Arguments of [`insert_vimeo_video`]. Missing sizes use the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoOptions {
    pub src: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

fn descriptor<'r>(
    registry: &'r SchemaRegistry,
    type_name: &str,
) -> Result<&'r NodeTypeDescriptor, CommandError> {
    registry
        .get(type_name)
        .ok_or_else(|| CommandError::UnknownNodeType(type_name.to_string()))
}

fn commit<H: HostEditor + ?Sized>(host: &mut H, tx: Transaction) -> Result<(), CommandError> {
    if !host.is_editable() {
        return Err(CommandError::TransactionRejected(
            "document is read-only".to_string(),
        ));
    }

    let description = tx.description().unwrap_or("edit").to_string();
    if host.apply_transaction(tx) {
        Ok(())
    } else {
        warn!(transaction = %description, "Host refused transaction");
        Err(CommandError::TransactionRejected(format!(
            "host refused '{}'",
            description
        )))
    }
}

/// Merge `patch` onto every node of `type_name` the selection targets
pub fn update_node<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    type_name: &str,
    selection: &SelectionContext,
    patch: &AttributePatch,
) -> Result<UpdateOutcome, CommandError> {
    descriptor(registry, type_name)?.validate_patch(patch)?;

    let steps: Vec<Step> = locate(&*host, type_name, selection)
        .iter()
        .filter_map(|target| {
            target.position.map(|pos| Step::SetNodeAttrs {
                pos,
                attrs: target.merged(patch),
            })
        })
        .collect();

    if steps.is_empty() {
        debug!(type_name, "No nodes to update");
        return Ok(UpdateOutcome { updated_count: 0 });
    }

    let updated_count = steps.len();
    let mut tx = Transaction::new().with_description(format!("update {}", type_name));
    for step in steps {
        tx.push(step);
    }
    commit(host, tx)?;

    info!(type_name, updated_count, "Updated nodes");
    Ok(UpdateOutcome { updated_count })
}

/// Full instance with a fresh id, or the caller's if nothing else uses it
fn new_instance<H: HostEditor + ?Sized>(
    host: &H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
    type_name: &str,
    overrides: &AttributePatch,
) -> Result<NodeInstance, CommandError> {
    let descriptor = descriptor(registry, type_name)?;
    let mut instance = descriptor.construct(overrides)?;

    match instance.id() {
        Some(id) if id_in_use(host, id) => return Err(CommandError::DuplicateId(id.to_string())),
        Some(_) => {}
        None => {
            let id = ids.next_id(descriptor.id_prefix());
            instance.attrs.insert(ID_ATTRIBUTE.to_string(), Value::String(id));
        }
    }

    if !host.is_editable() {
        return Err(CommandError::TransactionRejected(
            "document is read-only".to_string(),
        ));
    }
    Ok(instance)
}

fn id_in_use<H: HostEditor + ?Sized>(host: &H, id: &str) -> bool {
    host.query_nodes_in_range(0, host.document_size())
        .iter()
        .any(|node| node.id() == Some(id))
}

/// Insert a new node of `type_name` at the cursor
pub fn add_node<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
    type_name: &str,
    overrides: &AttributePatch,
) -> Result<NodeInstance, CommandError> {
    let instance = new_instance(&*host, registry, ids, type_name, overrides)?;

    let position = host.selection().from();
    if !host.insert_at_cursor(&instance) {
        return Err(CommandError::InvalidInsertionPoint {
            type_name: type_name.to_string(),
            position,
        });
    }

    let id = instance.id().unwrap_or_default().to_string();
    info!(type_name, id = %id, position, "Inserted node");
    Ok(find_by_id(&*host, type_name, &id).unwrap_or(instance))
}

/// Remove the node with instance `id`. `Ok(false)` when it is already gone.
pub fn delete_node<H: HostEditor + ?Sized>(
    host: &mut H,
    type_name: &str,
    id: &str,
) -> Result<bool, CommandError> {
    let Some(pos) = find_by_id(&*host, type_name, id).and_then(|node| node.position) else {
        debug!(type_name, id, "Node to delete not found");
        return Ok(false);
    };

    let tx = Transaction::new()
        .with_description(format!("delete {}", type_name))
        .step(Step::DeleteNode { pos });
    commit(host, tx)?;

    info!(type_name, id, "Deleted node");
    Ok(true)
}

pub fn add_custom_button<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
    button: ButtonPatch,
) -> Result<NodeInstance, CommandError> {
    add_node(host, registry, ids, CUSTOM_BUTTON, &button.into_patch())
}

pub fn update_custom_button<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    selection: &SelectionContext,
    button: ButtonPatch,
) -> Result<UpdateOutcome, CommandError> {
    update_node(host, registry, CUSTOM_BUTTON, selection, &button.into_patch())
}

/// Embed a Vimeo video from any page or player URL
pub fn insert_vimeo_video<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
    video: &VideoOptions,
) -> Result<NodeInstance, CommandError> {
    let src = vimeo_embed_src(&video.src)
        .ok_or_else(|| CommandError::InvalidEmbedUrl(video.src.clone()))?;

    let mut overrides = patch([("src", src)]);
    if let Some(width) = video.width {
        overrides.insert("width".to_string(), width.into());
    }
    if let Some(height) = video.height {
        overrides.insert("height".to_string(), height.into());
    }
    add_node(host, registry, ids, VIMEO_VIDEO, &overrides)
}

/// Replace a Vimeo link that ends at the cursor with an embed of it.
///
/// This is the typing shortcut: the link text and its surroundings are
/// swapped for the video in one transaction. `Ok(None)` when no link ends
/// right at the cursor.
pub fn embed_vimeo_link<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
) -> Result<Option<NodeInstance>, CommandError> {
    let cursor = host.selection().to();
    let Some(text) = host.text_before(cursor) else {
        return Ok(None);
    };
    let Some((range, src)) = find_vimeo_url(&text).filter(|(range, _)| range.end == text.len()) else {
        debug!(cursor, "No Vimeo link before the cursor");
        return Ok(None);
    };

    let from = cursor - text[range.start..].chars().count();
    let instance = new_instance(&*host, registry, ids, VIMEO_VIDEO, &patch([("src", src)]))?;
    if !host.replace_text_with_node(from, cursor, &instance) {
        return Err(CommandError::InvalidInsertionPoint {
            type_name: VIMEO_VIDEO.to_string(),
            position: from,
        });
    }

    let id = instance.id().unwrap_or_default().to_string();
    info!(id = %id, from, to = cursor, "Embedded Vimeo link");
    Ok(Some(find_by_id(&*host, VIMEO_VIDEO, &id).unwrap_or(instance)))
}

/// Insert an image figure. Missing alt, title and caption become empty.
pub fn set_image_with_caption<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    ids: &mut IdGenerator,
    image: &ImageOptions,
) -> Result<NodeInstance, CommandError> {
    let overrides = patch([
        ("src", image.src.clone()),
        ("alt", image.alt.clone().unwrap_or_default()),
        ("title", image.title.clone().unwrap_or_default()),
        ("caption", image.caption.clone().unwrap_or_default()),
    ]);
    add_node(host, registry, ids, IMAGE_WITH_CAPTION, &overrides)
}

pub fn update_caption<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    selection: &SelectionContext,
    caption: &str,
) -> Result<UpdateOutcome, CommandError> {
    update_node(
        host,
        registry,
        IMAGE_WITH_CAPTION,
        selection,
        &patch([("caption", caption)]),
    )
}

pub fn remove_caption<H: HostEditor + ?Sized>(
    host: &mut H,
    registry: &SchemaRegistry,
    selection: &SelectionContext,
) -> Result<UpdateOutcome, CommandError> {
    update_caption(host, registry, selection, "")
}

/// What a command runs against
pub struct CommandContext<'a> {
    pub host: &'a mut dyn HostEditor,
    pub registry: &'a SchemaRegistry,
    pub ids: &'a mut IdGenerator,
}

impl CommandContext<'_> {
    fn selection_or_current(&self, selection: Option<SelectionContext>) -> SelectionContext {
        selection.unwrap_or_else(|| self.host.selection())
    }
}

pub type CommandFn = fn(&mut CommandContext<'_>, Value) -> Result<Value, CommandError>;

/// Commands by name
#[derive(Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, CommandFn>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in command
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register("addNode", run_add_node);
        table.register("updateNode", run_update_node);
        table.register("deleteNode", run_delete_node);
        table.register("addCustomButton", run_add_custom_button);
        table.register("updateCustomButton", run_update_custom_button);
        table.register("insertVimeoVideo", run_insert_vimeo_video);
        table.register("embedVimeoLink", run_embed_vimeo_link);
        table.register("setImageWithCaption", run_set_image_with_caption);
        table.register("updateCaption", run_update_caption);
        table.register("removeCaption", run_remove_caption);
        table
    }

    /// Add or replace a command, returning the one it replaced
    pub fn register(&mut self, name: impl Into<String>, command: CommandFn) -> Option<CommandFn> {
        self.commands.insert(name.into(), command)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn dispatch(
        &self,
        ctx: &mut CommandContext<'_>,
        name: &str,
        args: Value,
    ) -> Result<Value, CommandError> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        debug!(command = name, "Dispatching command");
        command(ctx, args)
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.commands.keys()).finish()
    }
}

fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, CommandError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };

    serde_json::from_value(args).map_err(|err| CommandError::InvalidArguments {
        command: command.to_string(),
        message: err.to_string(),
    })
}

fn output<T: Serialize>(command: &str, value: T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|err| CommandError::InvalidOutput {
        command: command.to_string(),
        message: err.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddNodeArgs {
    type_name: String,
    #[serde(default)]
    attrs: AttributePatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateNodeArgs {
    type_name: String,
    #[serde(default)]
    selection: Option<SelectionContext>,
    patch: AttributePatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteNodeArgs {
    type_name: String,
    id: String,
}

#[derive(Deserialize)]
struct UpdateButtonArgs {
    #[serde(default)]
    selection: Option<SelectionContext>,
    #[serde(flatten)]
    button: ButtonPatch,
}

#[derive(Deserialize)]
struct CaptionArgs {
    #[serde(default)]
    selection: Option<SelectionContext>,
    #[serde(default)]
    caption: String,
}

fn run_add_node(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let args: AddNodeArgs = parse_args("addNode", args)?;
    let instance = add_node(&mut *ctx.host, ctx.registry, &mut *ctx.ids, &args.type_name, &args.attrs)?;
    output("addNode", instance)
}

fn run_update_node(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let args: UpdateNodeArgs = parse_args("updateNode", args)?;
    let selection = ctx.selection_or_current(args.selection);
    let outcome = update_node(&mut *ctx.host, ctx.registry, &args.type_name, &selection, &args.patch)?;
    output("updateNode", outcome)
}

fn run_delete_node(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let args: DeleteNodeArgs = parse_args("deleteNode", args)?;
    let deleted = delete_node(&mut *ctx.host, &args.type_name, &args.id)?;
    Ok(Value::Bool(deleted))
}

fn run_add_custom_button(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let button: ButtonPatch = parse_args("addCustomButton", args)?;
    let instance = add_custom_button(&mut *ctx.host, ctx.registry, &mut *ctx.ids, button)?;
    output("addCustomButton", instance)
}

fn run_update_custom_button(
    ctx: &mut CommandContext<'_>,
    args: Value,
) -> Result<Value, CommandError> {
    let args: UpdateButtonArgs = parse_args("updateCustomButton", args)?;
    let selection = ctx.selection_or_current(args.selection);
    let outcome = update_custom_button(&mut *ctx.host, ctx.registry, &selection, args.button)?;
    output("updateCustomButton", outcome)
}

fn run_insert_vimeo_video(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let video: VideoOptions = parse_args("insertVimeoVideo", args)?;
    let instance = insert_vimeo_video(&mut *ctx.host, ctx.registry, &mut *ctx.ids, &video)?;
    output("insertVimeoVideo", instance)
}

fn run_embed_vimeo_link(ctx: &mut CommandContext<'_>, _args: Value) -> Result<Value, CommandError> {
    let embedded = embed_vimeo_link(&mut *ctx.host, ctx.registry, &mut *ctx.ids)?;
    output("embedVimeoLink", embedded)
}

fn run_set_image_with_caption(
    ctx: &mut CommandContext<'_>,
    args: Value,
) -> Result<Value, CommandError> {
    let image: ImageOptions = parse_args("setImageWithCaption", args)?;
    let instance = set_image_with_caption(&mut *ctx.host, ctx.registry, &mut *ctx.ids, &image)?;
    output("setImageWithCaption", instance)
}

fn run_update_caption(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let args: CaptionArgs = parse_args("updateCaption", args)?;
    let selection = ctx.selection_or_current(args.selection);
    let outcome = update_caption(&mut *ctx.host, ctx.registry, &selection, &args.caption)?;
    output("updateCaption", outcome)
}

fn run_remove_caption(ctx: &mut CommandContext<'_>, args: Value) -> Result<Value, CommandError> {
    let args: CaptionArgs = parse_args("removeCaption", args)?;
    let selection = ctx.selection_or_current(args.selection);
    let outcome = remove_caption(&mut *ctx.host, ctx.registry, &selection)?;
    output("removeCaption", outcome)
}
