use richnode_markup::SerializeOptions;
use richnode_schema::nodes::VimeoOptions;
use serde::{Deserialize, Serialize};

/// Settings for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Undo levels kept (0 = unlimited)
    pub history_depth: usize,

    pub read_only: bool,

    /// Key the instance id generator is seeded from. A per-process key is
    /// used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,

    pub vimeo: VimeoOptions,

    /// Write markup one element per line
    pub pretty: bool,

    pub indent: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_depth: 100,
            read_only: false,
            id_seed: None,
            vimeo: VimeoOptions::default(),
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl EditorOptions {
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            pretty: self.pretty,
            indent: self.indent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_use_defaults() {
        let options: EditorOptions =
            serde_json::from_str(r#"{"historyDepth": 5, "vimeo": {"width": 1280}}"#).unwrap();

        assert_eq!(options.history_depth, 5);
        assert_eq!(options.vimeo.width, 1280);
        assert_eq!(options.vimeo.height, 360);
        assert!(!options.read_only);
        assert_eq!(options.indent, "  ");
    }

    #[test]
    fn test_serialize_options() {
        let options = EditorOptions {
            pretty: true,
            indent: "\t".to_string(),
            ..EditorOptions::default()
        };

        let serialize = options.serialize_options();
        assert!(serialize.pretty);
        assert_eq!(serialize.indent, "\t");
    }
}
