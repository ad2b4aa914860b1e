use crate::document::{Document, Element, Node};

/// Visitor for walking the host document with positions
///
/// Default implementations walk the entire tree. Override `visit_element`
/// or `visit_text` and call the matching `walk_*` function to keep
/// descending.
pub trait Visitor<'doc>: Sized {
    fn visit_element(&mut self, element: &'doc Element, pos: usize) {
        walk_element(self, element, pos);
    }

    fn visit_text(&mut self, _text: &'doc str, _pos: usize) {
        // Leaf node, no children to walk
    }
}

pub fn walk_document<'doc, V: Visitor<'doc>>(visitor: &mut V, doc: &'doc Document) {
    walk_content(visitor, &doc.content, 0);
}

/// Visit `content` whose first child starts at `base`
pub fn walk_content<'doc, V: Visitor<'doc>>(visitor: &mut V, content: &'doc [Node], base: usize) {
    let mut pos = base;
    for node in content {
        match node {
            Node::Element(element) => visitor.visit_element(element, pos),
            Node::Text(text) => visitor.visit_text(text, pos),
        }
        pos += node.size();
    }
}

pub fn walk_element<'doc, V: Visitor<'doc>>(visitor: &mut V, element: &'doc Element, pos: usize) {
    if let Some(content) = &element.content {
        walk_content(visitor, content, pos + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richnode_schema::Attrs;

    #[derive(Default)]
    struct TextPositions {
        found: Vec<(usize, String)>,
    }

    impl<'doc> Visitor<'doc> for TextPositions {
        fn visit_text(&mut self, text: &'doc str, pos: usize) {
            self.found.push((pos, text.to_string()));
        }
    }

    #[test]
    fn test_walk_reports_text_positions() {
        let doc = Document::new(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Element::leaf("customButton", Attrs::new()).into(),
            Node::blockquote(vec![Node::paragraph(vec![Node::text("c")])]),
        ]);

        let mut visitor = TextPositions::default();
        walk_document(&mut visitor, &doc);

        assert_eq!(visitor.found, vec![(1, "ab".to_string()), (7, "c".to_string())]);
    }
}
