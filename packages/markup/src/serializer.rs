use crate::ast::{MarkupElement, MarkupNode};
use crate::entities::{escape_attribute, escape_text};

/// Options for markup output
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// One element per line, children indented
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl SerializeOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}

struct Context {
    options: SerializeOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: SerializeOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a fragment to markup
pub fn serialize(nodes: &[MarkupNode], options: SerializeOptions) -> String {
    let mut ctx = Context::new(options);
    for node in nodes {
        serialize_node(node, &mut ctx);
    }
    ctx.get_output()
}

/// Serialize a single element to compact markup
pub fn serialize_element(element: &MarkupElement) -> String {
    let mut ctx = Context::new(SerializeOptions::default());
    serialize_node_element(element, &mut ctx);
    ctx.get_output()
}

fn serialize_node(node: &MarkupNode, ctx: &mut Context) {
    match node {
        MarkupNode::Element(element) => serialize_node_element(element, ctx),
        MarkupNode::Text { content } => {
            if ctx.options.pretty {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    ctx.add_line(&escape_text(trimmed));
                }
            } else {
                ctx.add(&escape_text(content));
            }
        }
    }
}

fn serialize_node_element(element: &MarkupElement, ctx: &mut Context) {
    let open = open_tag(element);

    if element.is_void() {
        ctx.add_line(&open);
        return;
    }

    let close = format!("</{}>", element.tag);
    let inline = element
        .children
        .iter()
        .all(|child| matches!(child, MarkupNode::Text { .. }));

    if inline || !ctx.options.pretty {
        let mut line = open;
        for child in &element.children {
            if let MarkupNode::Text { content } = child {
                line.push_str(&escape_text(content));
            } else {
                // Only reachable in compact mode
                let mut nested = Context::new(ctx.options.clone());
                serialize_node(child, &mut nested);
                line.push_str(&nested.get_output());
            }
        }
        line.push_str(&close);
        ctx.add_line(&line);
        return;
    }

    ctx.add_line(&open);
    ctx.indent();
    for child in &element.children {
        serialize_node(child, ctx);
    }
    ctx.dedent();
    ctx.add_line(&close);
}

fn open_tag(element: &MarkupElement) -> String {
    let mut out = format!("<{}", element.tag);
    for (key, value) in element.attributes.iter() {
        out.push_str(&format!(" {}=\"{}\"", key, escape_attribute(value)));
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_compact_output() {
        let nodes = vec![MarkupElement::new("p")
            .with_attr("class", "lead")
            .with_child(MarkupNode::text("a < b"))
            .into()];

        assert_eq!(
            serialize(&nodes, SerializeOptions::default()),
            r#"<p class="lead">a &lt; b</p>"#
        );
    }

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let element = MarkupElement::new("img").with_attr("src", "a.png");
        assert_eq!(serialize_element(&element), r#"<img src="a.png">"#);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let element = MarkupElement::new("button").with_attr("data-label", r#"Say "hi""#);
        assert_eq!(
            serialize_element(&element),
            r#"<button data-label="Say &quot;hi&quot;"></button>"#
        );
    }

    #[test]
    fn test_pretty_output() {
        let nodes = parse("<div><p>One</p><hr><p>Two</p></div>").unwrap();
        let output = serialize(&nodes, SerializeOptions::pretty());

        assert_eq!(output, "<div>\n  <p>One</p>\n  <hr>\n  <p>Two</p>\n</div>\n");
    }

    #[test]
    fn test_compact_reparse_is_stable() {
        let source = r#"<figure data-image-with-caption="" data-caption="A &amp; B"></figure><p>x<br>y</p>"#;
        let nodes = parse(source).unwrap();
        let output = serialize(&nodes, SerializeOptions::default());

        assert_eq!(output, source);
        assert_eq!(parse(&output).unwrap(), nodes);
    }
}
