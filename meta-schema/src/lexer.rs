//! # Lexer for the schema language

use logos::Logos;
use std::ops::Range;

/// Tokens for schema source text
///
/// Keywords (`enum`, `bitmask`, `struct`, `list`, `map`) lex as identifiers;
/// the parser gives them meaning by position.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// Identifier (keywords, type names, member and constant names)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Decimal or hexadecimal number
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse().ok())]
    #[regex(r"0x[0-9a-fA-F]+", |lex| i64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Number(i64),

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Equals,

    /// Trailing `...` in a struct body
    #[token("...")]
    Ellipsis,
}

impl Token {
    /// Short description used in syntax errors
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("'{}'", name),
            Token::Number(value) => format!("number {}", value),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LAngle => "'<'".to_string(),
            Token::RAngle => "'>'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Ellipsis => "'...'".to_string(),
        }
    }
}

/// Line and column (both 1-based) of a byte offset
pub fn location(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let column = source[line_start..offset].chars().count() + 1;
    (line, column)
}

/// Tokenize the whole source, keeping byte spans.
///
/// On failure returns the span of the first unrecognized input.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, Range<usize>> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_identifiers() {
        let mut lex = Token::lexer("struct Point list_of _x9");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("struct".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("Point".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("list_of".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("_x9".to_string()))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_numbers() {
        let mut lex = Token::lexer("42 -10 0x1A 0");
        assert_eq!(lex.next(), Some(Ok(Token::Number(42))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(-10))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(0x1A))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(0))));
    }

    #[test]
    fn test_lexer_punctuation() {
        let tokens: Vec<_> = Token::lexer("{ } [ ] < > , ; = ...")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::LAngle,
                Token::RAngle,
                Token::Comma,
                Token::Semicolon,
                Token::Equals,
                Token::Ellipsis,
            ]
        );
    }

    #[test]
    fn test_lexer_skips_comments() {
        let mut lex = Token::lexer("f32 x; // trailing comment\n// whole line\ny");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("f32".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("x".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Semicolon)));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("y".to_string()))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_tokenize_reports_bad_span() {
        assert_eq!(tokenize("struct A { @ }"), Err(11..12));
        assert_eq!(tokenize("a b").unwrap().len(), 2);
    }

    #[test]
    fn test_location() {
        let source = "enum A {\n  X,\n  Y\n}";
        assert_eq!(location(source, 0), (1, 1));
        assert_eq!(location(source, 5), (1, 6));
        assert_eq!(location(source, 11), (2, 3));
        assert_eq!(location(source, source.len()), (4, 2));
    }
}
