//! Lexical tokens

use std::fmt;

/// Classification of a lexical token.
///
/// Quoted templates and heredocs are single tokens: their interpolations are
/// part of the value expression and never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// `"..."`, including any `${ }` / `%{ }` sequences.
    Template,
    /// `<<EOF ... EOF`, up to and including the closing marker.
    Heredoc,
    /// `# ...` or `// ...`, without the line break.
    LineComment,
    /// `/* ... */`
    BlockComment,
    Newline,
    OBrace,
    CBrace,
    OBrack,
    CBrack,
    OParen,
    CParen,
    Equal,
    /// Any other operator or punctuation.
    Punct,
    /// End of input; its leading whitespace is whatever trailed the last line.
    Eof,
}

impl TokenKind {
    pub fn is_opening(self) -> bool {
        matches!(self, Self::OBrace | Self::OBrack | Self::OParen)
    }

    pub fn is_closing(self) -> bool {
        matches!(self, Self::CBrace | Self::CBrack | Self::CParen)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }
}

/// A token with its exact source text and the horizontal whitespace before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub leading: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, leading: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: leading.into(),
        }
    }

    pub fn ident(name: &str, leading: impl Into<String>) -> Self {
        Self::new(TokenKind::Ident, name, leading)
    }

    pub fn newline() -> Self {
        Self::new(TokenKind::Newline, "\n", "")
    }

    pub fn equal() -> Self {
        Self::new(TokenKind::Equal, "=", " ")
    }

    /// Byte length once written out.
    pub fn len(&self) -> usize {
        self.leading.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.leading, self.text)
    }
}

/// Concatenate tokens back into source text.
pub fn render<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.leading);
        out.push_str(&token.text);
    }
    out
}
