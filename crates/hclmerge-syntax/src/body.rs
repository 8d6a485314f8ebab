//! Bodies, attributes and blocks
//!
//! Nested blocks are not owned by their parent body; a body only holds
//! [`BlockId`]s into the owning [`Document`](crate::Document)'s arena.

use crate::document::BlockId;
use crate::token::{Token, TokenKind, render};

/// One entry of a body, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    Attribute(Attribute),
    Block(BlockId),
    /// Blank lines and comments not attached to any attribute or block.
    Trivia(Vec<Token>),
}

/// Ordered content of a block or of the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub(crate) items: Vec<BodyItem>,
}

impl Body {
    pub fn items(&self) -> &[BodyItem] {
        &self.items
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Attribute(attr) => Some(attr),
            _ => None,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.name() == name)
    }

    pub(crate) fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.items.iter_mut().find_map(|item| match item {
            BodyItem::Attribute(attr) if attr.name() == name => Some(attr),
            _ => None,
        })
    }

    /// Ids of the nested blocks in declaration order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Block(id) => Some(*id),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index just past the last attribute, or 0 when there is none.
    pub(crate) fn attribute_insert_index(&self) -> usize {
        self.items
            .iter()
            .rposition(|item| matches!(item, BodyItem::Attribute(_)))
            .map_or(0, |idx| idx + 1)
    }

    /// Remove the item referencing `id`. Returns whether it was present.
    pub(crate) fn remove_block(&mut self, id: BlockId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| *item != BodyItem::Block(id));
        self.items.len() != before
    }
}

/// `name = expression`, with the comments and line break that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) lead: Vec<Token>,
    pub(crate) name: Token,
    pub(crate) equal: Token,
    pub(crate) expr: Vec<Token>,
    pub(crate) line_comment: Option<Token>,
    pub(crate) newline: Option<Token>,
}

impl Attribute {
    /// A fresh attribute on its own line.
    pub fn new(name: &str, expr: Vec<Token>, indent: impl Into<String>) -> Self {
        Self {
            lead: Vec::new(),
            name: Token::ident(name, indent),
            equal: Token::equal(),
            expr,
            line_comment: None,
            newline: Some(Token::newline()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// The value expression, exactly as written.
    pub fn expr(&self) -> &[Token] {
        &self.expr
    }

    /// The value expression as text, without surrounding whitespace.
    pub fn value_text(&self) -> String {
        render(&self.expr).trim().to_string()
    }

    pub(crate) fn set_expr(&mut self, expr: Vec<Token>) {
        self.expr = expr;
    }

    pub(crate) fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.lead
            .iter()
            .chain(std::iter::once(&self.name))
            .chain(std::iter::once(&self.equal))
            .chain(self.expr.iter())
            .chain(self.line_comment.iter())
            .chain(self.newline.iter())
    }
}

/// `type "label" ... { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub(crate) lead: Vec<Token>,
    pub(crate) type_name: Token,
    pub(crate) labels: Vec<Token>,
    pub(crate) open_brace: Token,
    pub(crate) open_newline: Option<Token>,
    pub(crate) body: Body,
    pub(crate) close_brace: Token,
    pub(crate) line_comment: Option<Token>,
    pub(crate) newline: Option<Token>,
}

impl Block {
    pub fn block_type(&self) -> &str {
        &self.type_name.text
    }

    /// Label values, with quoted labels unescaped.
    pub fn labels(&self) -> Vec<String> {
        self.labels.iter().map(label_value).collect()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Indentation used for a new line inside this block.
    pub(crate) fn inner_indent(&self) -> String {
        let existing = self.body.attributes().last().map(|attr| &attr.name.leading);
        match existing {
            Some(indent) => indent.clone(),
            None => format!("{}  ", self.type_name.leading),
        }
    }
}

/// Value of a block label: quoted labels lose their quotes and escapes,
/// bare identifiers are taken as is.
fn label_value(token: &Token) -> String {
    if token.kind != TokenKind::Template {
        return token.text.clone();
    }
    let inner = token
        .text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(&token.text);
    unescape(inner)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(u @ ('u' | 'U')) => {
                    let width = if u == 'u' { 4 } else { 8 };
                    let hex: String = chars.by_ref().take(width).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(decoded) => out.push(decoded),
                        None => {
                            out.push('\\');
                            out.push(u);
                            out.push_str(&hex);
                        }
                    }
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '$' | '%' if chars.peek() == Some(&c) => {
                // `$${` and `%%{` are literal `${` and `%{`
                let mut ahead = chars.clone();
                ahead.next();
                if ahead.peek() == Some(&'{') {
                    chars.next();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
