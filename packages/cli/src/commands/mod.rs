pub mod add;
pub mod inspect;
pub mod normalize;
pub mod update;

pub use add::{add, AddArgs};
pub use inspect::{inspect, InspectArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use update::{update, UpdateArgs};

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use richnode_editor::{EditSession, EditorOptions};
use richnode_schema::{AttributePatch, NodeTypeDescriptor, SchemaRegistry};
use std::fs;
use std::path::Path;

/// Read a markup file into a fresh session
pub fn load_session(path: &Path, options: &EditorOptions) -> Result<EditSession> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let session = EditSession::from_markup(&source, options.clone())
        .with_context(|| format!("Cannot load {}", path.display()))?;
    Ok(session)
}

pub fn descriptor<'r>(registry: &'r SchemaRegistry, type_name: &str) -> Result<&'r NodeTypeDescriptor> {
    registry.get(type_name).ok_or_else(|| {
        let known: Vec<&str> = registry.iter().map(|descriptor| descriptor.name()).collect();
        anyhow!("Unknown node type '{}' (known: {})", type_name, known.join(", "))
    })
}

/// `key=value` pairs into a patch, each value coerced to the attribute's kind
pub fn parse_assignments(descriptor: &NodeTypeDescriptor, assignments: &[String]) -> Result<AttributePatch> {
    let mut patch = AttributePatch::new();
    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", assignment))?;
        let value = descriptor.coerce(key.trim(), raw)?;
        patch.insert(key.trim().to_string(), value);
    }
    Ok(patch)
}

/// Write markup to `output`, or to stdout when there is none
pub fn write_markup(markup: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, markup).with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => {
            print!("{}", markup);
            if !markup.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use richnode_schema::builtin_registry;
    use richnode_schema::nodes::{VimeoOptions, CUSTOM_BUTTON};
    use serde_json::json;

    #[test]
    fn test_parse_assignments() {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        let button = descriptor(&registry, CUSTOM_BUTTON).unwrap();

        let patch = parse_assignments(
            button,
            &["label=Pay = now".to_string(), "buttonSize=lg".to_string()],
        )
        .unwrap();

        assert_eq!(patch.get("label"), Some(&json!("Pay = now")));
        assert_eq!(patch.get("buttonSize"), Some(&json!("lg")));
    }

    #[test]
    fn test_parse_assignment_errors() {
        let registry = builtin_registry(&VimeoOptions::default()).unwrap();
        let button = descriptor(&registry, CUSTOM_BUTTON).unwrap();

        assert!(parse_assignments(button, &["label".to_string()]).is_err());
        assert!(parse_assignments(button, &["buttonSize=xl".to_string()]).is_err());
        assert!(parse_assignments(button, &["colour=red".to_string()]).is_err());
        assert!(descriptor(&registry, "callout").is_err());
    }
}
