//! Format-preserving HCL document model for hclmerge
//!
//! Parses HCL native syntax into an arena-backed tree of blocks and
//! attributes. Every token keeps its exact text and the whitespace before
//! it, so serializing an untouched document reproduces the input bytes.
//! Attribute values are never interpreted; they stay opaque token runs.

pub mod body;
pub mod document;
pub mod error;
pub mod format;
pub mod lexer;
mod parser;
pub mod token;

pub use body::{Attribute, Block, Body, BodyItem};
pub use document::{BlockId, Document};
pub use error::{Error, Result};
pub use format::format;
pub use token::{Token, TokenKind};
