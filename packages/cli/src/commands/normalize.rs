use crate::commands::{load_session, write_markup};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Markup file to rewrite
    pub file: PathBuf,

    /// One element per line (overrides config)
    #[arg(long)]
    pub pretty: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Load and re-serialize a document: custom nodes in canonical markup,
/// stray wrappers and whitespace gone
pub fn normalize(args: NormalizeArgs, config: &Config) -> Result<()> {
    let mut options = config.editor.clone();
    options.pretty |= args.pretty;

    let session = load_session(&args.file, &options)?;
    write_markup(&session.to_markup(), args.output.as_deref())
}
