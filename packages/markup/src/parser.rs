use crate::ast::{is_void_tag, Attributes, MarkupElement, MarkupNode};
use crate::entities::unescape;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, tokenize_tag, TagToken, Token};

/// Stack-based markup parser.
///
/// Unclosed elements are closed at end of input. An end tag that matches an
/// open ancestor closes everything above it; an end tag that matches nothing
/// is an error.
pub struct Parser<'src> {
    tokens: Vec<(Result<Token<'src>, ()>, std::ops::Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
        }
    }

    /// Parse a fragment (sequence of sibling nodes)
    pub fn parse_fragment(&mut self) -> ParseResult<Vec<MarkupNode>> {
        let mut roots: Vec<MarkupNode> = Vec::new();
        let mut open: Vec<MarkupElement> = Vec::new();

        while let Some((token, span)) = self.advance() {
            let start = span.start;
            let token = token.clone().map_err(|_| ParseError::lexer_error(start))?;

            match token {
                Token::Text(text) => {
                    push_node(&mut roots, &mut open, MarkupNode::text(unescape(text)));
                }
                Token::Declaration => {}
                Token::StartTag(raw) => {
                    let (element, self_closing) = parse_start_tag(raw, start)?;
                    if self_closing || element.is_void() {
                        push_node(&mut roots, &mut open, element.into());
                    } else {
                        open.push(element);
                    }
                }
                Token::EndTag(raw) => {
                    let tag = raw[2..raw.len() - 1].trim().to_ascii_lowercase();

                    match open.iter().rposition(|element| element.tag == tag) {
                        Some(index) => {
                            while open.len() > index {
                                close_top(&mut roots, &mut open);
                            }
                        }
                        // `</br>` and friends carry no structure
                        None if is_void_tag(&tag) => {}
                        None => return Err(ParseError::unexpected_end_tag(start, tag)),
                    }
                }
            }
        }

        while !open.is_empty() {
            close_top(&mut roots, &mut open);
        }

        Ok(roots)
    }

    fn advance(&mut self) -> Option<&(Result<Token<'src>, ()>, std::ops::Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }
}

fn push_node(roots: &mut Vec<MarkupNode>, open: &mut [MarkupElement], node: MarkupNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn close_top(roots: &mut Vec<MarkupNode>, open: &mut Vec<MarkupElement>) {
    if let Some(element) = open.pop() {
        push_node(roots, open, element.into());
    }
}

/// Parse `<tag attr="value" ...>`; returns the element and whether it was
/// written self-closing.
fn parse_start_tag(raw: &str, offset: usize) -> ParseResult<(MarkupElement, bool)> {
    let inner = &raw[1..raw.len() - 1];
    let mut tokens = Vec::new();

    for (token, span) in tokenize_tag(inner) {
        let token = token.map_err(|_| ParseError::lexer_error(offset + 1 + span.start))?;
        tokens.push((token, offset + 1 + span.start));
    }

    let mut iter = tokens.into_iter().peekable();

    let tag = match iter.next() {
        Some((TagToken::Word(name), _)) => name.to_ascii_lowercase(),
        _ => return Err(ParseError::invalid_syntax(offset, "Expected tag name")),
    };

    let mut attributes = Attributes::new();
    let mut self_closing = false;

    while let Some((token, pos)) = iter.next() {
        match token {
            TagToken::Word(name) => {
                let name = name.to_ascii_lowercase();
                let value = if matches!(iter.peek(), Some((TagToken::Equals, _))) {
                    iter.next();
                    match iter.next() {
                        Some((TagToken::DoubleQuoted(v), _))
                        | Some((TagToken::SingleQuoted(v), _))
                        | Some((TagToken::Word(v), _)) => unescape(v),
                        _ => {
                            return Err(ParseError::invalid_syntax(
                                pos,
                                format!("Expected value for attribute '{}'", name),
                            ))
                        }
                    }
                } else {
                    String::new()
                };

                // First occurrence wins, as in HTML
                if !attributes.contains(&name) {
                    attributes.set(name, value);
                }
                self_closing = false;
            }
            TagToken::Slash => {
                self_closing = true;
            }
            TagToken::Equals | TagToken::DoubleQuoted(_) | TagToken::SingleQuoted(_) => {
                return Err(ParseError::invalid_syntax(pos, "Expected attribute name"));
            }
        }
    }

    let mut element = MarkupElement::new(tag);
    element.attributes = attributes;
    Ok((element, self_closing))
}

/// Parse a markup fragment
pub fn parse(source: &str) -> ParseResult<Vec<MarkupNode>> {
    Parser::new(source).parse_fragment()
}
