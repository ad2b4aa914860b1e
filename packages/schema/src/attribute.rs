//! # Attribute specs
//!
//! Each attribute of a node type is a plain record: a kind used for
//! coercion and validation, a default, where to read it from when decoding
//! markup, and where to write it when encoding. Sources and targets are
//! tagged data so descriptors stay comparable and printable; `Custom`
//! variants take plain function pointers for the odd case the built-in
//! variants do not cover.

use richnode_markup::MarkupElement;
use serde_json::Value;

/// Value domain of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Integer,
    Boolean,
    OneOf(&'static [&'static str]),
}

impl AttrKind {
    /// Parse a markup string into a typed value
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            AttrKind::Text => Some(Value::String(raw.to_string())),
            AttrKind::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            AttrKind::Boolean => match raw.trim() {
                "" | "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            AttrKind::OneOf(options) => options
                .contains(&raw)
                .then(|| Value::String(raw.to_string())),
        }
    }

    /// Whether a non-null value belongs to this kind
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (AttrKind::Text, Value::String(_)) => true,
            (AttrKind::Integer, Value::Number(n)) => n.is_i64(),
            (AttrKind::Boolean, Value::Bool(_)) => true,
            (AttrKind::OneOf(options), Value::String(s)) => options.contains(&s.as_str()),
            _ => false,
        }
    }
}

/// Where a decoder reads an attribute from
#[derive(Debug, Clone)]
pub enum AttrSource {
    /// A markup attribute
    Attribute(String),
    /// One property of the `style` attribute
    Style(String),
    /// Text of the element's descendants (empty text counts as missing)
    TextContent,
    /// First source that yields a value
    FirstOf(Vec<AttrSource>),
    Custom(fn(&MarkupElement) -> Option<String>),
    /// Never decoded; always takes the default
    Ignore,
}

impl AttrSource {
    pub fn attribute(name: impl Into<String>) -> Self {
        AttrSource::Attribute(name.into())
    }

    pub fn extract(&self, element: &MarkupElement) -> Option<String> {
        match self {
            AttrSource::Attribute(name) => element.attr(name).map(str::to_string),
            AttrSource::Style(property) => element
                .attr("style")
                .and_then(|style| style_property(style, property)),
            AttrSource::TextContent => {
                let text = element.text_content();
                (!text.is_empty()).then_some(text)
            }
            AttrSource::FirstOf(sources) => sources.iter().find_map(|s| s.extract(element)),
            AttrSource::Custom(extract) => extract(element),
            AttrSource::Ignore => None,
        }
    }
}

/// Where an encoder writes an attribute to
#[derive(Debug, Clone)]
pub enum AttrTarget {
    Attribute(String),
    /// Writes the whole `style` attribute as `property: value`
    Style(String),
    Omit,
    Custom(fn(&Value) -> Vec<(String, String)>),
}

impl AttrTarget {
    pub fn attribute(name: impl Into<String>) -> Self {
        AttrTarget::Attribute(name.into())
    }

    /// Markup attribute pairs for `value`. Null renders nothing.
    pub fn render(&self, value: &Value) -> Vec<(String, String)> {
        if let AttrTarget::Custom(render) = self {
            return render(value);
        }

        let Some(text) = markup_string(value) else {
            return Vec::new();
        };

        match self {
            AttrTarget::Attribute(name) => vec![(name.clone(), text)],
            AttrTarget::Style(property) => {
                vec![("style".to_string(), format!("{}: {}", property, text))]
            }
            AttrTarget::Omit | AttrTarget::Custom(_) => Vec::new(),
        }
    }
}

/// Declaration of one attribute of a node type
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: AttrKind,
    pub default: Value,
    pub source: AttrSource,
    pub target: AttrTarget,
}

impl AttributeSpec {
    /// Attribute read from and written to `data-<kebab-name>`
    pub fn new(name: impl Into<String>, kind: AttrKind, default: impl Into<Value>) -> Self {
        let name = name.into();
        let markup_name = data_attribute_name(&name);
        Self {
            name,
            kind,
            default: default.into(),
            source: AttrSource::Attribute(markup_name.clone()),
            target: AttrTarget::Attribute(markup_name),
        }
    }

    pub fn text(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(name, AttrKind::Text, default)
    }

    /// Read and write the same markup attribute
    pub fn markup_attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.source = AttrSource::Attribute(name.clone());
        self.target = AttrTarget::Attribute(name);
        self
    }

    pub fn parse_from(mut self, source: AttrSource) -> Self {
        self.source = source;
        self
    }

    pub fn render_to(mut self, target: AttrTarget) -> Self {
        self.target = target;
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.default.is_null()
    }

    /// Whether `value` may be stored in this attribute
    pub fn accepts(&self, value: &Value) -> bool {
        (value.is_null() && self.is_nullable()) || self.kind.accepts(value)
    }
}

/// `buttonSize` -> `data-button-size`
pub fn data_attribute_name(name: &str) -> String {
    let mut out = String::from("data-");
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn markup_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        (name.trim() == property).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_by_kind() {
        assert_eq!(AttrKind::Integer.coerce(" 640 "), Some(json!(640)));
        assert_eq!(AttrKind::Integer.coerce("wide"), None);
        assert_eq!(AttrKind::Boolean.coerce(""), Some(json!(true)));
        assert_eq!(AttrKind::OneOf(&["sm", "md"]).coerce("md"), Some(json!("md")));
        assert_eq!(AttrKind::OneOf(&["sm", "md"]).coerce("xl"), None);
    }

    #[test]
    fn test_data_attribute_name() {
        assert_eq!(data_attribute_name("buttonSize"), "data-button-size");
        assert_eq!(data_attribute_name("label"), "data-label");
    }

    #[test]
    fn test_style_source_and_target() {
        let target = AttrTarget::Style("text-align".to_string());
        let pairs = target.render(&json!("center"));
        assert_eq!(pairs, vec![("style".to_string(), "text-align: center".to_string())]);

        let element = MarkupElement::new("div").with_attr("style", "color: red; text-align: center");
        let source = AttrSource::Style("text-align".to_string());
        assert_eq!(source.extract(&element), Some("center".to_string()));
    }

    #[test]
    fn test_null_renders_nothing() {
        assert!(AttrTarget::attribute("src").render(&Value::Null).is_empty());
    }

    #[test]
    fn test_first_of_falls_back() {
        let element = MarkupElement::new("button")
            .with_child(richnode_markup::MarkupNode::text("Legacy label"));
        let source = AttrSource::FirstOf(vec![
            AttrSource::attribute("data-label"),
            AttrSource::TextContent,
        ]);

        assert_eq!(source.extract(&element), Some("Legacy label".to_string()));
    }

    #[test]
    fn test_nullable_accepts_null() {
        let src = AttributeSpec::text("src", Value::Null);
        let label = AttributeSpec::text("label", "New Button");

        assert!(src.accepts(&Value::Null));
        assert!(!label.accepts(&Value::Null));
        assert!(!label.accepts(&json!(3)));
    }
}
