//! Arena-backed HCL document

use std::fmt;

use crate::body::{Attribute, Block, Body, BodyItem};
use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// Stable index of a block in a [`Document`]'s arena.
///
/// Ids stay valid for the lifetime of the document, even after the block is
/// detached from its parent body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

/// A parsed configuration file.
///
/// Top-level blocks and every nested block live in one arena; bodies refer to
/// them by [`BlockId`]. Serializing a freshly parsed document gives back the
/// input bytes unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    arena: Vec<Block>,
    pub(crate) body: Body,
    pub(crate) eof: Token,
}

impl Document {
    /// Parse raw bytes. `name` identifies the source in error messages.
    ///
    /// # Example
    /// ```
    /// use hclmerge_syntax::Document;
    ///
    /// let doc = Document::parse(b"resource \"aws_instance\" \"web\" {\n  ami = \"ami-1\"\n}\n", "main.hcl").unwrap();
    /// let web = doc.blocks().next().unwrap();
    /// assert_eq!(doc.block(web).labels(), ["aws_instance", "web"]);
    /// assert_eq!(doc.block(web).body().attribute("ami").unwrap().value_text(), "\"ami-1\"");
    /// ```
    pub fn parse(content: &[u8], name: &str) -> Result<Self> {
        let source = std::str::from_utf8(content).map_err(|e| Error::InvalidUtf8 {
            name: name.to_string(),
            offset: e.valid_up_to(),
        })?;
        crate::parser::parse(source, name)
    }

    pub(crate) fn from_parts(name: &str, arena: Vec<Block>, body: Body, eof: Token) -> Self {
        Self {
            name: name.to_string(),
            arena,
            body,
            eof,
        }
    }

    /// The name this document was parsed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Top-level blocks in declaration order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.body.blocks()
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by another document.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.arena[id.0]
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.arena[id.0]
    }

    /// Nested blocks of `parent` in declaration order.
    pub fn nested_blocks(&self, parent: BlockId) -> Vec<BlockId> {
        self.block(parent).body.blocks().collect()
    }

    pub(crate) fn alloc(arena: &mut Vec<Block>, block: Block) -> BlockId {
        arena.push(block);
        BlockId(arena.len() - 1)
    }

    /// Set `name` in `block`'s body to the given expression tokens.
    ///
    /// An existing attribute keeps its position and comments and only has
    /// its expression replaced. A new attribute is placed after the last
    /// existing attribute, or first in the body when there is none.
    pub fn set_attribute_raw(&mut self, block: BlockId, name: &str, expr: &[Token]) {
        if let Some(attr) = self.block_mut(block).body_mut().attribute_mut(name) {
            attr.set_expr(expr.to_vec());
            return;
        }

        let reflow = self.closes_on_same_line(block);
        let target = self.block_mut(block);
        let indent = target.inner_indent();
        let index = target.body.attribute_insert_index();
        if let Some(BodyItem::Attribute(prev)) = index
            .checked_sub(1)
            .and_then(|prev| target.body.items.get_mut(prev))
        {
            prev.newline.get_or_insert_with(Token::newline);
        }
        let mut expr = expr.to_vec();
        if let Some(first) = expr.first_mut().filter(|t| t.leading.is_empty()) {
            first.leading = " ".to_string();
        }
        target
            .body
            .items
            .insert(index, BodyItem::Attribute(Attribute::new(name, expr, indent)));
        self.finish_body_edit(block, reflow);
    }

    /// Detach `child` from `parent`'s body. Returns whether it was attached.
    pub fn remove_nested_block(&mut self, parent: BlockId, child: BlockId) -> bool {
        self.block_mut(parent).body_mut().remove_block(child)
    }

    /// Attach `child` as the last item of `parent`'s body.
    pub fn append_nested_block(&mut self, parent: BlockId, child: BlockId) {
        let reflow = self.closes_on_same_line(parent);
        self.terminate_last_item(Some(parent));
        self.block_mut(parent).body.items.push(BodyItem::Block(child));
        self.finish_body_edit(parent, reflow);
    }

    /// Attach `block` as the last top-level item.
    pub fn append_block(&mut self, block: BlockId) {
        self.body.items.push(BodyItem::Block(block));
    }

    /// Append a bare line break at the end of the root body.
    pub fn append_newline(&mut self) {
        match self.body.items.last_mut() {
            Some(BodyItem::Trivia(tokens)) => tokens.push(Token::newline()),
            _ => self.body.items.push(BodyItem::Trivia(vec![Token::newline()])),
        }
    }

    /// Whether the serialized document currently ends with a line break.
    pub fn ends_with_newline(&self) -> bool {
        let mut last = None;
        self.walk(&mut |token| last = Some(token.kind));
        last == Some(TokenKind::Newline)
    }

    /// Copy `id` from `source`, including its whole subtree, into this
    /// document's arena. The copy is not attached anywhere yet.
    pub fn import_block(&mut self, source: &Document, id: BlockId) -> BlockId {
        let mut block = source.block(id).clone();
        for item in &mut block.body.items {
            if let BodyItem::Block(child) = item {
                *child = self.import_block(source, *child);
            }
        }
        Self::alloc(&mut self.arena, block)
    }

    /// Exact serialization.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// All tokens in output order, ending with the end-of-input token.
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.walk(&mut |token| out.push(token.clone()));
        out.push(self.eof.clone());
        out
    }

    /// Serialized text of one block, including its lead comments.
    pub fn block_text(&self, id: BlockId) -> String {
        let mut out = String::new();
        self.walk_block(id, &mut |token| {
            out.push_str(&token.leading);
            out.push_str(&token.text);
        });
        out
    }

    /// Visit every token except the end-of-input token.
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Token)) {
        self.walk_body(&self.body, visit);
    }

    fn walk_body<'a>(&'a self, body: &'a Body, visit: &mut dyn FnMut(&'a Token)) {
        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => attr.tokens().for_each(&mut *visit),
                BodyItem::Block(id) => self.walk_block(*id, visit),
                BodyItem::Trivia(tokens) => tokens.iter().for_each(&mut *visit),
            }
        }
    }

    fn walk_block<'a>(&'a self, id: BlockId, visit: &mut dyn FnMut(&'a Token)) {
        let block = self.block(id);
        block.lead.iter().for_each(&mut *visit);
        visit(&block.type_name);
        block.labels.iter().for_each(&mut *visit);
        visit(&block.open_brace);
        block.open_newline.iter().for_each(&mut *visit);
        self.walk_body(&block.body, visit);
        visit(&block.close_brace);
        block.line_comment.iter().for_each(&mut *visit);
        block.newline.iter().for_each(&mut *visit);
    }

    /// Make sure whatever ends `parent`'s body is followed by a line break,
    /// so the next item starts on a fresh line.
    fn terminate_last_item(&mut self, parent: Option<BlockId>) {
        let last = match parent {
            Some(id) => self.block(id).body.items.last().cloned(),
            None => self.body.items.last().cloned(),
        };
        match last {
            Some(BodyItem::Attribute(_)) => {
                let body = self.body_of_mut(parent);
                if let Some(BodyItem::Attribute(attr)) = body.items.last_mut() {
                    attr.newline.get_or_insert_with(Token::newline);
                }
            }
            Some(BodyItem::Block(child)) => {
                self.block_mut(child).newline.get_or_insert_with(Token::newline);
            }
            Some(BodyItem::Trivia(tokens)) => {
                if tokens.last().map(|t| t.kind) != Some(TokenKind::Newline) {
                    self.body_of_mut(parent).items.push(BodyItem::Trivia(vec![Token::newline()]));
                }
            }
            None => {
                if let Some(id) = parent {
                    self.block_mut(id).open_newline.get_or_insert_with(Token::newline);
                }
            }
        }
    }

    /// Whether `block`'s closing brace shares a line with the preceding content.
    fn closes_on_same_line(&self, block: BlockId) -> bool {
        let target = self.block(block);
        match target.body.items.last() {
            None => target.open_newline.is_none(),
            Some(BodyItem::Attribute(attr)) => attr.newline.is_none(),
            Some(BodyItem::Block(child)) => self.block(*child).newline.is_none(),
            Some(BodyItem::Trivia(tokens)) => {
                tokens.last().map(|t| t.kind) != Some(TokenKind::Newline)
            }
        }
    }

    /// After a body gained a line, every item must end its line and the
    /// closing brace must sit on a line of its own.
    fn finish_body_edit(&mut self, block: BlockId, reflow: bool) {
        self.terminate_last_item(Some(block));
        if reflow {
            let target = self.block_mut(block);
            target.open_newline.get_or_insert_with(Token::newline);
            target.close_brace.leading = target.type_name.leading.clone();
        }
    }

    fn body_of_mut(&mut self, parent: Option<BlockId>) -> &mut Body {
        match parent {
            Some(id) => &mut self.block_mut(id).body,
            None => &mut self.body,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.walk(&mut |token| {
            out.push_str(&token.leading);
            out.push_str(&token.text);
        });
        out.push_str(&self.eof.leading);
        f.write_str(&out)
    }
}
