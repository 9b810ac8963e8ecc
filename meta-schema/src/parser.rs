//! Schema parser
//!
//! Turns the token stream into definitions. Names are not resolved here;
//! see [`crate::loader`].

use crate::error::{Result, SchemaError};
use crate::lexer::{location, tokenize, Token};
use std::ops::Range;

/// Type reference as written in a member declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
}

/// `Name` or `Name = value` inside an enum or bitmask body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDef {
    pub name: String,
    pub value: Option<i64>,
}

/// `Type name;` or `Type name[N]...;` inside a struct body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDef {
    pub type_expr: TypeExpr,
    pub name: String,
    /// Array dimensions, outermost first
    pub dims: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionKind {
    Enum(Vec<ConstantDef>),
    Bitmask(Vec<ConstantDef>),
    Struct { members: Vec<MemberDef>, partial: bool },
}

/// Top-level named definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
}

/// Parse schema source into definitions, in source order
pub fn parse(source: &str) -> Result<Vec<Definition>> {
    let tokens = tokenize(source).map_err(|span| {
        let (line, column) = location(source, span.start);
        SchemaError::SyntaxError {
            line,
            column,
            message: format!("Unexpected input '{}'", &source[span]),
        }
    })?;

    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let mut definitions = Vec::new();
    while !parser.at_end() {
        definitions.push(parser.definition()?);
    }
    Ok(definitions)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    /// Consume `expected` if it is next
    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: String) -> SchemaError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |(_, span)| span.start);
        let (line, column) = location(self.source, offset);
        SchemaError::SyntaxError {
            line,
            column,
            message,
        }
    }

    fn unexpected(&self, wanted: &str) -> SchemaError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), Token::describe);
        self.error(format!("Expected {}, found {}", wanted, found))
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(&expected.describe()))
        }
    }

    fn identifier(&mut self, wanted: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn number(&mut self, wanted: &str) -> Result<i64> {
        match self.peek() {
            Some(&Token::Number(value)) => {
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn definition(&mut self) -> Result<Definition> {
        let kind = match self.peek() {
            Some(Token::Identifier(keyword))
                if matches!(keyword.as_str(), "enum" | "bitmask" | "struct") =>
            {
                keyword.clone()
            }
            _ => return Err(self.unexpected("'enum', 'bitmask' or 'struct'")),
        };
        self.pos += 1;
        let name = self.identifier("type name")?;
        self.expect(Token::LBrace)?;

        let kind = match kind.as_str() {
            "enum" => DefinitionKind::Enum(self.constants()?),
            "bitmask" => DefinitionKind::Bitmask(self.constants()?),
            _ => self.struct_body()?,
        };
        self.expect(Token::RBrace)?;
        self.eat(&Token::Semicolon);

        Ok(Definition { name, kind })
    }

    fn constants(&mut self) -> Result<Vec<ConstantDef>> {
        let mut constants = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let name = self.identifier("constant name")?;
            let value = if self.eat(&Token::Equals) {
                Some(self.number("constant value")?)
            } else {
                None
            };
            constants.push(ConstantDef { name, value });

            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(constants)
    }

    fn struct_body(&mut self) -> Result<DefinitionKind> {
        let mut members = Vec::new();
        let mut partial = false;
        while self.peek() != Some(&Token::RBrace) {
            if self.eat(&Token::Ellipsis) {
                self.eat(&Token::Semicolon);
                partial = true;
                break;
            }
            members.push(self.member()?);
        }
        Ok(DefinitionKind::Struct { members, partial })
    }

    fn member(&mut self) -> Result<MemberDef> {
        let type_expr = self.type_expr()?;
        let name = self.identifier("member name")?;
        let mut dims = Vec::new();
        while self.eat(&Token::LBracket) {
            dims.push(self.number("array length")?);
            self.expect(Token::RBracket)?;
        }
        self.expect(Token::Semicolon)?;
        Ok(MemberDef {
            type_expr,
            name,
            dims,
        })
    }

    fn type_expr(&mut self) -> Result<TypeExpr> {
        let name = self.identifier("type")?;
        match name.as_str() {
            "list" if self.peek() == Some(&Token::LAngle) => {
                self.pos += 1;
                let element = self.type_expr()?;
                self.expect(Token::RAngle)?;
                Ok(TypeExpr::List(Box::new(element)))
            }
            "map" if self.peek() == Some(&Token::LAngle) => {
                self.pos += 1;
                let key = self.type_expr()?;
                self.expect(Token::Comma)?;
                let value = self.type_expr()?;
                self.expect(Token::RAngle)?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            _ => Ok(TypeExpr::Named(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum() {
        let defs = parse("enum Color { Red, Green = 4, Blue, }").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "Color");
        let DefinitionKind::Enum(constants) = &defs[0].kind else {
            panic!("expected enum");
        };
        assert_eq!(constants.len(), 3);
        assert_eq!(constants[1].value, Some(4));
        assert_eq!(constants[2].value, None);
    }

    #[test]
    fn test_parse_struct_members() {
        let defs = parse(
            "struct Shape {
                f32 corners[4][2];
                list<Point> path;
                map<i32, list<string>> labels;
                ...
            };",
        )
        .unwrap();

        let DefinitionKind::Struct { members, partial } = &defs[0].kind else {
            panic!("expected struct");
        };
        assert!(*partial);
        assert_eq!(members[0].dims, vec![4, 2]);
        assert_eq!(
            members[1].type_expr,
            TypeExpr::List(Box::new(TypeExpr::Named("Point".to_string())))
        );
        assert_eq!(
            members[2].type_expr,
            TypeExpr::Map(
                Box::new(TypeExpr::Named("i32".to_string())),
                Box::new(TypeExpr::List(Box::new(TypeExpr::Named(
                    "string".to_string()
                ))))
            )
        );
    }

    #[test]
    fn test_keywords_usable_as_member_names() {
        let defs = parse("struct S { i32 list; list map; }").unwrap();
        let DefinitionKind::Struct { members, .. } = &defs[0].kind else {
            panic!("expected struct");
        };
        assert_eq!(members[0].name, "list");
        assert_eq!(members[1].type_expr, TypeExpr::Named("list".to_string()));
        assert_eq!(members[1].name, "map");
    }

    #[test]
    fn test_missing_semicolon_position() {
        let err = parse("struct P {\n    f32 x\n}").unwrap_err();
        match err {
            SchemaError::SyntaxError {
                line,
                column,
                message,
            } => {
                assert_eq!((line, column), (3, 1));
                assert_eq!(message, "Expected ';', found '}'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_keyword() {
        let err = parse("union U { }").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::SyntaxError { line: 1, column: 1, .. }
        ));
    }

    #[test]
    fn test_unexpected_end() {
        let err = parse("enum E { A").unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }
}
