use crate::commands::{descriptor, load_session, parse_assignments, write_markup};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;
use richnode_editor::SelectionContext;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["at", "from"])))]
pub struct UpdateArgs {
    /// Markup file to edit
    pub file: PathBuf,

    /// Node type to update (e.g. customButton)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Cursor position: the node there, or the nearest enclosing one
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub at: Option<usize>,

    /// Range start: every node intersecting the range is updated
    #[arg(long, requires = "to")]
    pub from: Option<usize>,

    /// Range end
    #[arg(long, requires = "from")]
    pub to: Option<usize>,

    /// Attribute change, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
    pub set: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl UpdateArgs {
    fn selection(&self) -> Result<SelectionContext> {
        match (self.at, self.from, self.to) {
            (Some(at), _, _) => Ok(SelectionContext::cursor(at)),
            (None, Some(from), Some(to)) => Ok(SelectionContext::range(from, to)),
            _ => Err(anyhow!("Pass either --at or both --from and --to")),
        }
    }
}

pub fn update(args: UpdateArgs, config: &Config) -> Result<()> {
    let mut session = load_session(&args.file, &config.editor)?;
    let patch = parse_assignments(descriptor(session.registry(), &args.type_name)?, &args.set)?;
    let selection = args.selection()?;

    let outcome = session.update_node(&args.type_name, &selection, &patch)?;
    if outcome.updated_count == 0 {
        eprintln!("{}", format!("⚠️  No {} nodes selected", args.type_name).yellow());
    } else {
        eprintln!(
            "{} Updated {} {} node(s)",
            "✓".green(),
            outcome.updated_count,
            args.type_name.cyan()
        );
    }

    write_markup(&session.to_markup(), args.output.as_deref())
}
