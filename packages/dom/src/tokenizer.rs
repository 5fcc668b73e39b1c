use logos::Logos;
use std::fmt;

/// Markup tokens.
///
/// Tags are matched whole; their attributes are scanned afterwards by the
/// tree builder, which keeps the lexer free of context-dependent states.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"<!--([^-]|-[^-])*-->", |lex| lex.slice())]
    Comment(&'src str),

    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Doctype(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", |lex| lex.slice())]
    EndTag(&'src str),

    /// `>` inside quoted attribute values does not end the tag
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    StartTag(&'src str),

    /// A start tag whose last attribute value never closes; runs up to the
    /// opening quote
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*["']"#, |lex| lex.slice())]
    UnterminatedTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comment(s) => write!(f, "comment {}", s),
            Token::Doctype(s) => write!(f, "doctype {}", s),
            Token::EndTag(s) => write!(f, "end tag {}", s),
            Token::StartTag(s) => write!(f, "start tag {}", s),
            Token::UnterminatedTag(s) => write!(f, "unterminated tag {}", s),
            Token::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokenize markup.
///
/// Stray `<` characters that do not open a tag are returned as text so the
/// builder never loses content.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (token, span),
            Err(()) => (Token::Text(&source[span.clone()]), span),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_text() {
        let tokens = tokenize(r#"<p class="a">hi</p>"#);

        assert_eq!(tokens[0].0, Token::StartTag(r#"<p class="a">"#));
        assert_eq!(tokens[1].0, Token::Text("hi"));
        assert_eq!(tokens[2].0, Token::EndTag("</p>"));
    }

    #[test]
    fn test_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- note -->x");

        assert_eq!(tokens[0].0, Token::Doctype("<!DOCTYPE html>"));
        assert_eq!(tokens[1].0, Token::Comment("<!-- note -->"));
        assert_eq!(tokens[2].0, Token::Text("x"));
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokenize("a < b");
        let text: String = tokens
            .iter()
            .map(|(t, _)| match t {
                Token::Text(s) => *s,
                _ => "",
            })
            .collect();

        assert_eq!(text, "a < b");
    }

    #[test]
    fn test_quoted_angle_bracket_stays_in_tag() {
        let tokens = tokenize(r#"<p data-note="a>b" title='c>d'>x</p>"#);

        assert_eq!(
            tokens[0].0,
            Token::StartTag(r#"<p data-note="a>b" title='c>d'>"#)
        );
        assert_eq!(tokens[1].0, Token::Text("x"));
    }

    #[test]
    fn test_unclosed_quote() {
        let tokens = tokenize(r#"<a href="x>y</a>"#);

        assert_eq!(tokens[0].0, Token::UnterminatedTag(r#"<a href=""#));
    }
}
