//! Structural parser: tokens into bodies, attributes and blocks
//!
//! Only structure is recognized. An attribute's expression is the run of
//! tokens after `=` up to the end of its line, where line breaks inside
//! brackets do not count.

use std::mem;

use crate::body::{Attribute, Block, Body, BodyItem};
use crate::document::{BlockId, Document};
use crate::error::{Error, Result};
use crate::lexer::{Lexeme, lex};
use crate::token::{Token, TokenKind};

pub(crate) fn parse(source: &str, name: &str) -> Result<Document> {
    let lexemes = lex(source, name)?;
    let mut parser = Parser {
        source,
        name,
        lexemes,
        pos: 0,
        arena: Vec::new(),
    };
    let body = parser.body(false)?;
    let eof = parser.bump();
    debug_assert_eq!(eof.kind, TokenKind::Eof);
    tracing::trace!(name, blocks = parser.arena.len(), "parsed document");
    Ok(Document::from_parts(name, parser.arena, body, eof))
}

struct Parser<'a> {
    source: &'a str,
    name: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
    arena: Vec<Block>,
}

impl Parser<'_> {
    fn peek(&self) -> TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> TokenKind {
        self.lexemes
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |l| l.token.kind)
    }

    /// Take the current token. At end of input this keeps returning `Eof`.
    fn bump(&mut self) -> Token {
        let token = self.lexemes[self.pos].token.clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn bump_if(&mut self, kind: TokenKind) -> Option<Token> {
        (self.peek() == kind).then(|| self.bump())
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let offset = self.lexemes[self.pos].offset;
        Error::syntax(self.name, self.source, offset, message)
    }

    fn describe(&self) -> String {
        match self.peek() {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Newline => "newline".to_string(),
            _ => format!("{:?}", self.lexemes[self.pos].token.text),
        }
    }

    /// Parse body items until `}` (when `nested`) or end of input.
    fn body(&mut self, nested: bool) -> Result<Body> {
        let mut items = Vec::new();
        let mut trivia: Vec<Token> = Vec::new();
        // Comment lines directly above the next item; they travel with it.
        let mut lead: Vec<Token> = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Newline => {
                    trivia.append(&mut lead);
                    trivia.push(self.bump());
                }
                TokenKind::LineComment | TokenKind::BlockComment => {
                    lead.push(self.bump());
                    if let Some(newline) = self.bump_if(TokenKind::Newline) {
                        lead.push(newline);
                    }
                }
                TokenKind::Ident => {
                    if !trivia.is_empty() {
                        items.push(BodyItem::Trivia(mem::take(&mut trivia)));
                    }
                    let lead = mem::take(&mut lead);
                    let item = if self.peek_at(1) == TokenKind::Equal {
                        BodyItem::Attribute(self.attribute(lead)?)
                    } else {
                        BodyItem::Block(self.block(lead)?)
                    };
                    items.push(item);
                }
                TokenKind::CBrace if nested => break,
                TokenKind::Eof if !nested => break,
                TokenKind::Eof => return Err(self.error("unclosed block, expected '}'")),
                _ => {
                    return Err(self.error(format!(
                        "expected an attribute or block, found {}",
                        self.describe()
                    )));
                }
            }
        }

        trivia.append(&mut lead);
        if !trivia.is_empty() {
            items.push(BodyItem::Trivia(trivia));
        }
        Ok(Body { items })
    }

    fn attribute(&mut self, lead: Vec<Token>) -> Result<Attribute> {
        let name = self.bump();
        let equal = self.bump();

        let mut expr = Vec::new();
        let mut depth = 0usize;
        loop {
            let kind = self.peek();
            let at_line_end = depth == 0
                && matches!(
                    kind,
                    TokenKind::Newline | TokenKind::LineComment | TokenKind::CBrace
                );
            if at_line_end || kind == TokenKind::Eof {
                break;
            }
            if kind.is_opening() {
                depth += 1;
            } else if kind.is_closing() {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    self.error(format!("unbalanced {}", self.describe()))
                })?;
            }
            expr.push(self.bump());
        }
        if depth > 0 {
            return Err(self.error("unclosed bracket in expression"));
        }
        if expr.is_empty() {
            return Err(self.error(format!(
                "expected an expression for {:?}",
                name.text
            )));
        }

        let line_comment = self.bump_if(TokenKind::LineComment);
        let newline = self.bump_if(TokenKind::Newline);
        Ok(Attribute {
            lead,
            name,
            equal,
            expr,
            line_comment,
            newline,
        })
    }

    fn block(&mut self, lead: Vec<Token>) -> Result<BlockId> {
        let type_name = self.bump();
        let mut labels = Vec::new();
        while matches!(self.peek(), TokenKind::Template | TokenKind::Ident) {
            labels.push(self.bump());
        }
        let Some(open_brace) = self.bump_if(TokenKind::OBrace) else {
            return Err(self.error(format!(
                "expected a block label or '{{' after {:?}, found {}",
                type_name.text,
                self.describe()
            )));
        };
        let open_newline = self.bump_if(TokenKind::Newline);
        let body = self.body(true)?;
        let close_brace = self.bump();

        let line_comment = self.bump_if(TokenKind::LineComment);
        let newline = self.bump_if(TokenKind::Newline);
        if newline.is_none() && !matches!(self.peek(), TokenKind::Eof | TokenKind::CBrace) {
            return Err(self.error(format!(
                "expected a newline after block {:?}",
                type_name.text
            )));
        }

        let block = Block {
            lead,
            type_name,
            labels,
            open_brace,
            open_newline,
            body,
            close_brace,
            line_comment,
            newline,
        };
        Ok(Document::alloc(&mut self.arena, block))
    }
}
