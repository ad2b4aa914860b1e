use crate::commands::{descriptor, load_session, parse_assignments, write_markup};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use richnode_editor::{HostEditor, SelectionContext};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Markup file to add the node to
    pub file: PathBuf,

    /// Node type to insert (e.g. customButton)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Cursor position (defaults to the end of the document)
    #[arg(long)]
    pub at: Option<usize>,

    /// Attribute override, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn add(args: AddArgs, config: &Config) -> Result<()> {
    let mut session = load_session(&args.file, &config.editor)?;
    let overrides = parse_assignments(descriptor(session.registry(), &args.type_name)?, &args.set)?;

    let at = args.at.unwrap_or_else(|| session.host().document_size());
    session.set_selection(SelectionContext::cursor(at));

    let node = session.add_node(&args.type_name, &overrides)?;
    eprintln!(
        "{} Added {} {} at {}",
        "✓".green(),
        node.type_name.cyan(),
        node.id().unwrap_or("-"),
        node.position.unwrap_or(at)
    );

    write_markup(&session.to_markup(), args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(file: PathBuf, output: PathBuf, at: Option<usize>, set: &[&str]) -> AddArgs {
        AddArgs {
            file,
            type_name: "customButton".to_string(),
            at,
            set: set.iter().map(|s| s.to_string()).collect(),
            output: Some(output),
        }
    }

    #[test]
    fn test_add_button_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.html");
        let output = dir.path().join("out.html");
        fs::write(&input, "<p>Intro</p>").unwrap();

        add(args(input, output.clone(), None, &["label=Save", "id=btn-save"]), &Config::default()).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            concat!(
                "<p>Intro</p>",
                r#"<button data-type="custom-button" data-id="btn-save" data-label="Save" data-size="md" data-color="primary" data-align="left"></button>"#,
            )
        );
    }

    #[test]
    fn test_add_splits_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.html");
        let output = dir.path().join("out.html");
        fs::write(&input, "<p>abcd</p>").unwrap();

        add(args(input, output.clone(), Some(3), &["id=b"]), &Config::default()).unwrap();

        let written = fs::read_to_string(output).unwrap();
        assert!(written.starts_with("<p>ab</p><button"));
        assert!(written.ends_with("</button><p>cd</p>"));
    }

    #[test]
    fn test_add_rejects_bad_value() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.html");
        fs::write(&input, "<p>x</p>").unwrap();

        let result = add(
            args(input, dir.path().join("out.html"), None, &["buttonColor=plaid"]),
            &Config::default(),
        );

        assert!(result.is_err());
        assert!(!dir.path().join("out.html").exists());
    }
}
