//! Tokenizer for HCL native syntax
//!
//! The lexer is lossless: concatenating every token's `leading` and `text`
//! yields the input exactly.

use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// A token together with the byte offset its text starts at.
#[derive(Debug, Clone)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub offset: usize,
}

/// Split `source` into tokens. The last token is always [`TokenKind::Eof`].
///
/// # Example
/// ```
/// use hclmerge_syntax::lexer::tokenize;
/// use hclmerge_syntax::TokenKind;
///
/// let tokens = tokenize("ami = \"ami-123\"\n", "main.hcl").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Ident, TokenKind::Equal, TokenKind::Template, TokenKind::Newline, TokenKind::Eof]
/// );
/// ```
pub fn tokenize(source: &str, name: &str) -> Result<Vec<Token>> {
    Ok(lex(source, name)?.into_iter().map(|l| l.token).collect())
}

pub(crate) fn lex(source: &str, name: &str) -> Result<Vec<Lexeme>> {
    Lexer {
        src: source,
        name,
        pos: 0,
        out: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    name: &'a str,
    pos: usize,
    out: Vec<Lexeme>,
}

const TWO_CHAR_OPERATORS: [&str; 6] = ["&&", "||", "!=", "<=", ">=", "=>"];
const ONE_CHAR_OPERATORS: &str = "+-*/%!<>?:,.";

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Lexeme>> {
        loop {
            let ws_start = self.pos;
            while let Some(c) = self.peek() {
                let lone_cr = c == '\r' && !self.rest().starts_with("\r\n");
                if c == ' ' || c == '\t' || lone_cr {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            }
            let leading = &self.src[ws_start..self.pos];
            let start = self.pos;

            let Some(c) = self.peek() else {
                self.push(TokenKind::Eof, start, leading);
                return Ok(self.out);
            };

            let kind = match c {
                '\n' => {
                    self.pos += 1;
                    TokenKind::Newline
                }
                '\r' => {
                    self.pos += 2;
                    TokenKind::Newline
                }
                '#' => {
                    self.skip_to_line_end();
                    TokenKind::LineComment
                }
                '/' if self.rest().starts_with("//") => {
                    self.skip_to_line_end();
                    TokenKind::LineComment
                }
                '/' if self.rest().starts_with("/*") => {
                    self.block_comment(start)?;
                    TokenKind::BlockComment
                }
                '"' => {
                    self.template(start)?;
                    TokenKind::Template
                }
                '<' if self.at_heredoc() => {
                    self.heredoc(start)?;
                    TokenKind::Heredoc
                }
                '{' => self.single(TokenKind::OBrace),
                '}' => self.single(TokenKind::CBrace),
                '[' => self.single(TokenKind::OBrack),
                ']' => self.single(TokenKind::CBrack),
                '(' => self.single(TokenKind::OParen),
                ')' => self.single(TokenKind::CParen),
                '.' if self.rest().starts_with("...") => {
                    self.pos += 3;
                    TokenKind::Punct
                }
                c if c.is_ascii_digit() => {
                    self.number();
                    TokenKind::Number
                }
                c if is_ident_start(c) => {
                    self.ident();
                    TokenKind::Ident
                }
                _ => {
                    if TWO_CHAR_OPERATORS.iter().any(|op| self.rest().starts_with(op))
                        || self.rest().starts_with("==")
                    {
                        self.pos += 2;
                        TokenKind::Punct
                    } else if c == '=' {
                        self.single(TokenKind::Equal)
                    } else if ONE_CHAR_OPERATORS.contains(c) {
                        self.single(TokenKind::Punct)
                    } else {
                        return Err(self.error(start, format!("unexpected character {c:?}")));
                    }
                }
            };
            self.push(kind, start, leading);
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, leading: &str) {
        self.out.push(Lexeme {
            token: Token::new(kind, &self.src[start..self.pos], leading),
            offset: start,
        });
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::syntax(self.name, self.src, offset, message)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Advance up to, not including, the next line break.
    fn skip_to_line_end(&mut self) {
        match self.rest().find('\n') {
            Some(idx) => {
                self.pos += idx;
                if self.src[..self.pos].ends_with('\r') {
                    self.pos -= 1;
                }
            }
            None => self.pos = self.src.len(),
        }
    }

    fn block_comment(&mut self, start: usize) -> Result<()> {
        match self.src[start + 2..].find("*/") {
            Some(idx) => {
                self.pos = start + 2 + idx + 2;
                Ok(())
            }
            None => Err(self.error(start, "unterminated block comment")),
        }
    }

    /// Consume a quoted template starting at the opening quote.
    fn template(&mut self, start: usize) -> Result<()> {
        self.pos = start + 1;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(start, "unterminated string"));
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(());
                }
                '\n' => return Err(self.error(start, "unterminated string")),
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        self.pos += escaped.len_utf8();
                    }
                }
                '$' | '%' => {
                    let rest = self.rest();
                    if rest.starts_with("$${") || rest.starts_with("%%{") {
                        self.pos += 3;
                    } else if rest.starts_with("${") || rest.starts_with("%{") {
                        self.pos += 2;
                        self.interpolation()?;
                    } else {
                        self.pos += 1;
                    }
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    /// Consume the inside of `${ ... }` up to and including its closing brace.
    fn interpolation(&mut self) -> Result<()> {
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(start, "unterminated template interpolation"));
            };
            match c {
                '"' => self.template(self.pos)?,
                '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                '}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    fn at_heredoc(&self) -> bool {
        let Some(after) = self.rest().strip_prefix("<<") else {
            return false;
        };
        let after = after.strip_prefix('-').unwrap_or(after);
        after.chars().next().is_some_and(is_ident_start)
    }

    fn heredoc(&mut self, start: usize) -> Result<()> {
        self.pos = start + 2;
        if self.rest().starts_with('-') {
            self.pos += 1;
        }
        let src = self.src;
        let marker_start = self.pos;
        self.ident();
        let marker = &src[marker_start..self.pos];

        if self.rest().starts_with("\r\n") {
            self.pos += 2;
        } else if self.rest().starts_with('\n') {
            self.pos += 1;
        } else {
            return Err(self.error(self.pos, "heredoc marker must be followed by a newline"));
        }

        while self.pos < src.len() {
            let line_start = self.pos;
            let line_end = self.rest().find('\n').map_or(src.len(), |i| line_start + i);
            let line = src[line_start..line_end].trim_end_matches('\r');
            if line.trim() == marker {
                let indent = line.len() - line.trim_start().len();
                self.pos = line_start + indent + marker.len();
                return Ok(());
            }
            self.pos = (line_end + 1).min(src.len());
        }
        Err(self.error(start, format!("unterminated heredoc, expected closing {marker}")))
    }

    fn number(&mut self) {
        self.digits();
        let rest = self.rest().as_bytes();
        if rest.len() > 1 && rest[0] == b'.' && rest[1].is_ascii_digit() {
            self.pos += 1;
            self.digits();
        }
        let rest = self.rest().as_bytes();
        if !rest.is_empty() && (rest[0] == b'e' || rest[0] == b'E') {
            let sign = usize::from(rest.len() > 1 && (rest[1] == b'+' || rest[1] == b'-'));
            if rest.get(1 + sign).is_some_and(u8::is_ascii_digit) {
                self.pos += 1 + sign;
                self.digits();
            }
        }
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::render;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, "test.hcl")
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_attribute_line() {
        use TokenKind::*;
        assert_eq!(
            kinds("count = 3 # three\n"),
            [Ident, Equal, Number, LineComment, Newline, Eof]
        );
    }

    #[test]
    fn test_whitespace_is_leading() {
        let tokens = tokenize("  a  =\t1", "t").unwrap();
        assert_eq!(tokens[0].leading, "  ");
        assert_eq!(tokens[1].leading, "  ");
        assert_eq!(tokens[2].leading, "\t");
    }

    #[test]
    fn test_template_with_nested_interpolation() {
        let src = r#"name = "${var.prefix}-${lookup(m, "k", "}")}""#;
        let tokens = tokenize(src, "t").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Template);
        assert_eq!(tokens[2].text, r#""${var.prefix}-${lookup(m, "k", "}")}""#);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_escaped_quote_and_literal_dollar() {
        let tokens = tokenize(r#"a = "say \"hi\" $${raw}""#, "t").unwrap();
        assert_eq!(tokens[2].text, r#""say \"hi\" $${raw}""#);
    }

    #[test]
    fn test_heredoc_is_one_token() {
        let src = "policy = <<-EOT\n  {\n    \"a\": 1\n  }\n  EOT\nnext = 1\n";
        let tokens = tokenize(src, "t").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Heredoc);
        assert!(tokens[2].text.ends_with("EOT"));
        assert_eq!(tokens[3].kind, TokenKind::Newline);
        assert_eq!(tokens[4].text, "next");
    }

    #[test]
    fn test_crlf_newlines() {
        use TokenKind::*;
        assert_eq!(kinds("a = 1 // c\r\n"), [Ident, Equal, Number, LineComment, Newline, Eof]);
        let tokens = tokenize("a = 1 // c\r\n", "t").unwrap();
        assert_eq!(tokens[3].text, "// c");
        assert_eq!(tokens[4].text, "\r\n");
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = a == b ? [1, 2] : {}"),
            [
                Ident, Equal, Ident, Punct, Ident, Punct, OBrack, Number, Punct, Number, CBrack,
                Punct, OBrace, CBrace, Eof
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("a = 1.5e-3", "t").unwrap();
        assert_eq!(tokens[2].text, "1.5e-3");
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let err = tokenize("a = 1\nb = \"open\n", "main.hcl").unwrap_err();
        assert_eq!(
            err,
            Error::Syntax {
                name: "main.hcl".into(),
                line: 2,
                column: 5,
                message: "unterminated string".into(),
            }
        );
    }

    #[test]
    fn test_unterminated_heredoc() {
        assert!(tokenize("a = <<EOF\nbody\n", "t").is_err());
    }

    #[test]
    fn test_unexpected_character() {
        assert!(tokenize("a = @", "t").is_err());
    }

    #[test]
    fn test_lossless() {
        let src = "/* head */\nresource \"a\" \"b\" {\n\tx = [1,\n  2]   # c\n}\n  ";
        let tokens = tokenize(src, "t").unwrap();
        assert_eq!(render(&tokens), src);
    }
}
