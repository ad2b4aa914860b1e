use logos::Logos;
use std::fmt;

/// Top-level markup tokens. Tag interiors are lexed separately with
/// [`TagToken`] so quoted values and text never share one DFA.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Quoted attribute values may contain `>`
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"</[a-zA-Z][^>]*>", |lex| lex.slice())]
    EndTag(&'src str),

    // Comments, doctype
    #[regex(r"<![^>]*>")]
    Declaration,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartTag(s) => write!(f, "start tag {}", s),
            Token::EndTag(s) => write!(f, "end tag {}", s),
            Token::Declaration => write!(f, "declaration"),
            Token::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokens inside `<` ... `>`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TagToken<'src> {
    #[regex(r#"[^ \t\r\n"'=<>/`]+"#, |lex| lex.slice())]
    Word(&'src str),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoted(&'src str),

    #[token("/")]
    Slash,
}

/// Tokenize a markup source string. Lexer failures are kept as `Err(())`
/// so the parser can report their position.
pub fn tokenize(source: &str) -> Vec<(Result<Token<'_>, ()>, std::ops::Range<usize>)> {
    Token::lexer(source).spanned().collect()
}

/// Tokenize the interior of a start tag (without the angle brackets)
pub fn tokenize_tag(inner: &str) -> Vec<(Result<TagToken<'_>, ()>, std::ops::Range<usize>)> {
    TagToken::lexer(inner).spanned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_tokens(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .into_iter()
            .map(|(token, _)| token.unwrap())
            .collect()
    }

    #[test]
    fn test_tags_and_text() {
        let tokens = ok_tokens(r#"<p class="x">Hello</p>"#);

        assert_eq!(tokens[0], Token::StartTag(r#"<p class="x">"#));
        assert_eq!(tokens[1], Token::Text("Hello"));
        assert_eq!(tokens[2], Token::EndTag("</p>"));
    }

    #[test]
    fn test_start_tag_spans_quoted_angle() {
        let tokens = ok_tokens(r#"<b title="a > b" alt='c > d'>x</b>"#);

        assert_eq!(tokens[0], Token::StartTag(r#"<b title="a > b" alt='c > d'>"#));
        assert_eq!(tokens[1], Token::Text("x"));
    }

    #[test]
    fn test_declarations() {
        let tokens = ok_tokens("<!DOCTYPE html><!-- note --><br>");

        assert_eq!(tokens[0], Token::Declaration);
        assert_eq!(tokens[1], Token::Declaration);
        assert_eq!(tokens[2], Token::StartTag("<br>"));
    }

    #[test]
    fn test_stray_angle_is_lexer_error() {
        let tokens = tokenize("a < b");
        assert!(tokens.iter().any(|(token, _)| token.is_err()));
    }

    #[test]
    fn test_tag_interior() {
        let tokens: Vec<_> = tokenize_tag(r#"button data-type="custom-button" data-label='Save' disabled /"#)
            .into_iter()
            .map(|(token, _)| token.unwrap())
            .collect();

        assert_eq!(tokens[0], TagToken::Word("button"));
        assert_eq!(tokens[1], TagToken::Word("data-type"));
        assert_eq!(tokens[2], TagToken::Equals);
        assert_eq!(tokens[3], TagToken::DoubleQuoted("custom-button"));
        assert_eq!(tokens[4], TagToken::Word("data-label"));
        assert_eq!(tokens[5], TagToken::Equals);
        assert_eq!(tokens[6], TagToken::SingleQuoted("Save"));
        assert_eq!(tokens[7], TagToken::Word("disabled"));
        assert_eq!(tokens[8], TagToken::Slash);
    }
}
