//! Identity of top-level blocks

use hclmerge_syntax::{BlockId, Document};

const SEPARATOR: &str = ".";

/// Address of a block: its type followed by its label values, joined by `.`.
///
/// Two top-level blocks are the same block exactly when their addresses are
/// equal.
///
/// # Example
/// ```
/// use hclmerge_core::address;
/// use hclmerge_syntax::Document;
///
/// let doc = Document::parse(b"resource \"aws_instance\" \"web\" {\n}\n", "main.hcl").unwrap();
/// let web = doc.blocks().next().unwrap();
/// assert_eq!(address(&doc, web), "resource.aws_instance.web");
/// ```
pub fn address(doc: &Document, block: BlockId) -> String {
    let block = doc.block(block);
    std::iter::once(block.block_type().to_string())
        .chain(block.labels())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
