//! Merge policy: attributes, nested blocks, blocks and whole documents

use std::collections::{HashMap, HashSet};

use hclmerge_syntax::{BlockId, Document};
use tracing::debug;

use crate::address::address;

/// What [`merge_documents`] did with the source's top-level blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Source blocks merged into an existing destination block.
    pub merged: usize,
    /// Source blocks appended as new top-level blocks.
    pub appended: usize,
}

/// Copy every attribute of `src_block` onto `dest_block`.
///
/// Attributes with the same name are overwritten with the source expression
/// verbatim; destination-only attributes are left alone; source-only
/// attributes are added after the destination's existing ones.
pub fn merge_attributes(
    dest: &mut Document,
    dest_block: BlockId,
    src: &Document,
    src_block: BlockId,
) {
    for attr in src.block(src_block).body().attributes() {
        dest.set_attribute_raw(dest_block, attr.name(), attr.expr());
    }
}

/// Replace nested blocks of `dest_block` type by type.
///
/// Every destination nested block whose type appears among the source's
/// nested blocks is dropped, whatever its labels. Then all source nested
/// blocks are appended in source order as opaque copies; their own children
/// are not reconciled with anything.
pub fn merge_nested_blocks(
    dest: &mut Document,
    dest_block: BlockId,
    src: &Document,
    src_block: BlockId,
) {
    let incoming = src.nested_blocks(src_block);
    let replaced: HashSet<&str> = incoming
        .iter()
        .map(|&id| src.block(id).block_type())
        .collect();

    for existing in dest.nested_blocks(dest_block) {
        if replaced.contains(dest.block(existing).block_type()) {
            dest.remove_nested_block(dest_block, existing);
        }
    }
    for id in incoming {
        let copy = dest.import_block(src, id);
        dest.append_nested_block(dest_block, copy);
    }
}

/// Reconcile one matched pair of blocks, one level deep.
pub fn merge_block(dest: &mut Document, dest_block: BlockId, src: &Document, src_block: BlockId) {
    merge_attributes(dest, dest_block, src, src_block);
    merge_nested_blocks(dest, dest_block, src, src_block);
}

/// Layer `src` over `dest`, mutating `dest` in place.
///
/// Source top-level blocks are matched against the destination's by
/// [`address`]. If the destination holds several blocks with one address,
/// the last of them is the match target. Unmatched source blocks are
/// appended; when the destination does not end with a line break, one is
/// added plus a blank separator line first.
///
/// Top-level attributes of `src` are not carried over.
pub fn merge_documents(dest: &mut Document, src: &Document) -> MergeReport {
    let mut targets: HashMap<String, BlockId> = HashMap::new();
    for id in dest.blocks() {
        let key = address(dest, id);
        if targets.insert(key.clone(), id).is_some() {
            debug!(address = %key, document = dest.name(), "duplicate address, last block wins");
        }
    }

    let mut report = MergeReport::default();
    for src_block in src.blocks() {
        let key = address(src, src_block);
        match targets.get(&key) {
            Some(&dest_block) => {
                debug!(address = %key, "merging block");
                merge_block(dest, dest_block, src, src_block);
                report.merged += 1;
            }
            None => {
                debug!(address = %key, "appending block");
                if !dest.body().is_empty() && !dest.ends_with_newline() {
                    dest.append_newline();
                    dest.append_newline();
                }
                let copy = dest.import_block(src, src_block);
                dest.append_block(copy);
                report.appended += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Document {
        Document::parse(source.as_bytes(), "test.hcl").unwrap()
    }

    fn first(doc: &Document) -> BlockId {
        doc.blocks().next().unwrap()
    }

    #[test]
    fn test_merge_attributes_overwrites_and_adds() {
        let mut dest = parse("a {\n  x = 1\n  y = 2\n}\n");
        let src = parse("a {\n  y = 20\n  z = 30\n}\n");
        let (d, s) = (first(&dest), first(&src));

        merge_attributes(&mut dest, d, &src, s);

        assert_eq!(dest.to_string(), "a {\n  x = 1\n  y = 20\n  z = 30\n}\n");
    }

    #[test]
    fn test_merge_attributes_twice_is_noop() {
        let mut dest = parse("a {\n  x = 1\n}\n");
        let src = parse("a {\n  x = 2\n  w = 3\n}\n");
        let (d, s) = (first(&dest), first(&src));

        merge_attributes(&mut dest, d, &src, s);
        let once = dest.to_string();
        merge_attributes(&mut dest, d, &src, s);

        assert_eq!(dest.to_string(), once);
    }

    #[test]
    fn test_nested_type_replace_ignores_labels() {
        let mut dest = parse(
            "a {\n  setting \"one\" {\n    v = 1\n  }\n  keep {\n  }\n  setting \"two\" {\n    v = 2\n  }\n}\n",
        );
        let src = parse("a {\n  setting \"three\" {\n    v = 3\n  }\n}\n");
        let (d, s) = (first(&dest), first(&src));

        merge_nested_blocks(&mut dest, d, &src, s);

        assert_eq!(
            dest.to_string(),
            "a {\n  keep {\n  }\n  setting \"three\" {\n    v = 3\n  }\n}\n"
        );
    }

    #[test]
    fn test_nested_children_are_not_merged_recursively() {
        let mut dest = parse("a {\n  outer {\n    inner {\n      x = 1\n    }\n  }\n}\n");
        let src = parse("a {\n  outer {\n    other = true\n  }\n}\n");
        let (d, s) = (first(&dest), first(&src));

        merge_block(&mut dest, d, &src, s);

        let outer = dest.nested_blocks(d)[0];
        assert!(dest.nested_blocks(outer).is_empty());
        assert_eq!(dest.block(outer).body().attribute("other").unwrap().value_text(), "true");
    }

    #[test]
    fn test_duplicate_destination_address_last_wins() {
        let mut dest = parse("a {\n  x = 1\n}\na {\n  x = 2\n}\n");
        let src = parse("a {\n  y = 3\n}\n");

        let report = merge_documents(&mut dest, &src);

        assert_eq!(report, MergeReport { merged: 1, appended: 0 });
        assert_eq!(dest.to_string(), "a {\n  x = 1\n}\na {\n  x = 2\n  y = 3\n}\n");
    }

    #[test]
    fn test_append_to_document_without_trailing_newline() {
        let mut dest = parse("a {\n}");
        let src = parse("b {\n}\n");

        merge_documents(&mut dest, &src);

        assert_eq!(dest.to_string(), "a {\n}\n\nb {\n}\n");
    }

    #[test]
    fn test_append_to_empty_document() {
        let mut dest = parse("");
        let src = parse("# about b\nb {\n}\n");

        let report = merge_documents(&mut dest, &src);

        assert_eq!(report.appended, 1);
        assert_eq!(dest.to_string(), "# about b\nb {\n}\n");
    }

    #[test]
    fn test_source_top_level_attributes_are_ignored() {
        let mut dest = parse("a {\n}\n");
        let src = parse("loose = 1\na {\n  x = 1\n}\n");

        merge_documents(&mut dest, &src);

        assert!(dest.body().attribute("loose").is_none());
    }
}
