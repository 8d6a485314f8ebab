//! Canonical layout for serialized documents
//!
//! Only horizontal whitespace is touched: each line is re-indented two spaces
//! per enclosing bracketed line, block headers get single spaces between
//! their parts, and the `=` of consecutive single-line attributes at the same
//! depth are aligned.
//! Token text, comments, blank lines and heredoc bodies are kept verbatim.

use crate::document::Document;
use crate::token::{Token, TokenKind, render};

const INDENT: &str = "  ";

/// Serialize `doc` in canonical layout.
///
/// # Example
/// ```
/// use hclmerge_syntax::{Document, format};
///
/// let doc = Document::parse(b"a {\nami = 1\n    instance_type=2\n}\n", "main.hcl").unwrap();
/// assert_eq!(format(&doc), "a {\n  ami           = 1\n  instance_type = 2\n}\n");
/// ```
pub fn format(doc: &Document) -> String {
    let mut lines = split_lines(doc.tokens());
    let mut levels = Vec::with_capacity(lines.len());
    let mut balanced = Vec::with_capacity(lines.len());

    let mut nesting = Nesting::default();
    for line in &mut lines {
        let level = nesting.enter_line(line);
        levels.push(level);
        balanced.push(nesting.net == 0);
        layout_line(line, level);
    }

    align_equals(&mut lines, &levels, &balanced);
    render(lines.iter().flatten())
}

/// Bracket nesting across lines. A line that leaves brackets open indents
/// the following lines by one level, however many brackets it opened.
#[derive(Default)]
struct Nesting {
    /// Unclosed bracket count per indenting line.
    open: Vec<usize>,
    /// Opens minus closes on the last line seen.
    net: isize,
}

impl Nesting {
    /// Account for `line` and return its indent level.
    fn enter_line(&mut self, line: &[Token]) -> usize {
        let leading_closers = line.iter().take_while(|t| t.kind.is_closing()).count();
        for _ in 0..leading_closers {
            self.close();
        }
        let level = self.open.len();

        let mut pending = 0usize;
        for token in &line[leading_closers..] {
            if token.kind.is_opening() {
                pending += 1;
            } else if token.kind.is_closing() {
                match pending.checked_sub(1) {
                    Some(left) => pending = left,
                    None => self.close(),
                }
            }
        }
        if pending > 0 {
            self.open.push(pending);
        }

        let opens = line.iter().filter(|t| t.kind.is_opening()).count();
        let closes = line.iter().filter(|t| t.kind.is_closing()).count();
        self.net = opens as isize - closes as isize;
        level
    }

    fn close(&mut self) {
        if let Some(top) = self.open.last_mut() {
            *top -= 1;
            if *top == 0 {
                self.open.pop();
            }
        }
    }
}

/// Split after each newline token. Every line has at least one token.
fn split_lines(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        let ends_line = token.kind == TokenKind::Newline;
        current.push(token);
        if ends_line {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn layout_line(line: &mut [Token], level: usize) {
    line[0].leading = match line[0].kind {
        TokenKind::Newline | TokenKind::Eof => String::new(),
        _ => INDENT.repeat(level),
    };
    if let Some(last) = line
        .last_mut()
        .filter(|t| matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
    {
        last.leading.clear();
    }

    if let Some(brace) = block_header_len(line) {
        for token in &mut line[1..=brace] {
            token.leading = " ".to_string();
        }
    }
}

/// Index of the `{` when the line opens a block: `type label* {`.
fn block_header_len(line: &[Token]) -> Option<usize> {
    if line[0].kind != TokenKind::Ident {
        return None;
    }
    let labels = line[1..]
        .iter()
        .take_while(|t| matches!(t.kind, TokenKind::Ident | TokenKind::Template))
        .count();
    let brace = 1 + labels;
    (line.get(brace)?.kind == TokenKind::OBrace).then_some(brace)
}

fn is_attribute_line(line: &[Token]) -> bool {
    line.len() > 2 && line[0].kind == TokenKind::Ident && line[1].kind == TokenKind::Equal
}

/// Attribute lines whose value spills onto following lines are left out of
/// alignment and end the current run.
fn align_equals(lines: &mut [Vec<Token>], levels: &[usize], balanced: &[bool]) {
    let mut run: Vec<usize> = Vec::new();
    for idx in 0..lines.len() {
        let eligible = balanced[idx] && is_attribute_line(&lines[idx]);
        let continues = eligible
            && run.last().is_some_and(|&prev| prev + 1 == idx && levels[prev] == levels[idx]);
        if !continues {
            align_run(lines, &run);
            run.clear();
        }
        if eligible {
            run.push(idx);
        }
    }
    align_run(lines, &run);
}

fn align_run(lines: &mut [Vec<Token>], run: &[usize]) {
    let width = run
        .iter()
        .map(|&idx| lines[idx][0].text.chars().count())
        .max()
        .unwrap_or(0);
    for &idx in run {
        let line = &mut lines[idx];
        let pad = width - line[0].text.chars().count() + 1;
        line[1].leading = " ".repeat(pad);
        if !matches!(
            line[2].kind,
            TokenKind::Newline | TokenKind::Eof | TokenKind::LineComment
        ) {
            line[2].leading = " ".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(source: &str) -> String {
        format(&Document::parse(source.as_bytes(), "test.hcl").unwrap())
    }

    #[test]
    fn test_reindents_nested_blocks() {
        let source = "resource \"a\" \"b\" {\nebs {\nvolume_size = 10\n}\n}\n";
        insta::assert_snapshot!(fmt(source), @r#"
        resource "a" "b" {
          ebs {
            volume_size = 10
          }
        }
        "#);
    }

    #[test]
    fn test_alignment_breaks_on_blank_line() {
        let source = "a {\n  x = 1\n  long_name = 2\n\n  y = 3\n}\n";
        assert_eq!(
            fmt(source),
            "a {\n  x         = 1\n  long_name = 2\n\n  y = 3\n}\n"
        );
    }

    #[test]
    fn test_object_values_align_inside() {
        let source = "a {\n  tags = {\n    Name = \"web\"\n    Environment = \"prod\"\n  }\n}\n";
        insta::assert_snapshot!(fmt(source), @r#"
        a {
          tags = {
            Name        = "web"
            Environment = "prod"
          }
        }
        "#);
    }

    #[test]
    fn test_multiple_brackets_on_one_line_indent_once() {
        let source = "locals {\ntags = merge(var.tags, {\nTeam = \"infra\"\n})\nnext = 1\n}\n";
        insta::assert_snapshot!(fmt(source), @r#"
        locals {
          tags = merge(var.tags, {
            Team = "infra"
          })
          next = 1
        }
        "#);
    }

    #[test]
    fn test_comments_and_heredocs_preserved() {
        let source = "a {\n    # note\n  script = <<EOF\n    keep   this\nEOF\n}\n";
        assert_eq!(
            fmt(source),
            "a {\n  # note\n  script = <<EOF\n    keep   this\nEOF\n}\n"
        );
    }

    #[test]
    fn test_block_header_spacing() {
        assert_eq!(fmt("resource   \"a\"\t\"b\"{\n}\n"), "resource \"a\" \"b\" {\n}\n");
    }

    #[test]
    fn test_strips_trailing_whitespace() {
        assert_eq!(fmt("a {   \n  b = 1   \n}  \n   "), "a {\n  b = 1\n}\n");
        assert_eq!(fmt("a {\n}  "), "a {\n}");
    }

    #[test]
    fn test_idempotent() {
        let source = "x {\n      a=1 # c\n bb   =  [\n1,\n  2]\n  inner \"l\" { q = 1 }\n}\n";
        let once = fmt(source);
        assert_eq!(fmt(&once), once);
    }
}
