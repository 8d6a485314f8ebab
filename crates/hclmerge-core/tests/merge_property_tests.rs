//! Merge policy properties over generated blocks.

use std::collections::BTreeMap;

use hclmerge_core::merge_block;
use hclmerge_syntax::{BlockId, Document};
use proptest::prelude::*;

const TYPES: [&str; 3] = ["alpha", "beta", "gamma"];

/// A `resource "a" "b"` block with the given attributes and one nested block
/// per entry of `nested`. Nested blocks record where they came from.
fn render_block(attrs: &BTreeMap<String, u32>, nested: &[usize], origin: &str) -> String {
    let mut out = String::from("resource \"a\" \"b\" {\n");
    for (name, value) in attrs {
        out.push_str(&format!("  {name} = {value}\n"));
    }
    for (idx, ty) in nested.iter().enumerate() {
        out.push_str(&format!(
            "  {} {{\n    origin = \"{origin}-{idx}\"\n  }}\n",
            TYPES[*ty]
        ));
    }
    out.push_str("}\n");
    out
}

fn origins_of_type(doc: &Document, block: BlockId, ty: &str) -> Vec<String> {
    doc.nested_blocks(block)
        .into_iter()
        .filter(|&id| doc.block(id).block_type() == ty)
        .filter_map(|id| doc.block(id).body().attribute("origin").map(|a| a.value_text()))
        .collect()
}

fn expected_origins(nested: &[usize], ty: usize, origin: &str) -> Vec<String> {
    nested
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t == ty)
        .map(|(idx, _)| format!("\"{origin}-{idx}\""))
        .collect()
}

proptest! {
    #[test]
    fn merge_block_attribute_and_nested_policy(
        dest_attrs in prop::collection::btree_map("[a-f]{1,3}", 0u32..1000, 0..5),
        src_attrs in prop::collection::btree_map("[a-f]{1,3}", 0u32..1000, 0..5),
        dest_nested in prop::collection::vec(0usize..TYPES.len(), 0..4),
        src_nested in prop::collection::vec(0usize..TYPES.len(), 0..4),
    ) {
        let dest_text = render_block(&dest_attrs, &dest_nested, "dest");
        let src_text = render_block(&src_attrs, &src_nested, "src");
        let mut dest = Document::parse(dest_text.as_bytes(), "dest.hcl").unwrap();
        let src = Document::parse(src_text.as_bytes(), "src.hcl").unwrap();
        let d = dest.blocks().next().unwrap();
        let s = src.blocks().next().unwrap();

        merge_block(&mut dest, d, &src, s);

        let body = dest.block(d).body();
        for (name, value) in &src_attrs {
            let merged = body.attribute(name).map(|a| a.value_text());
            prop_assert_eq!(merged, Some(value.to_string()));
        }
        for (name, value) in dest_attrs.iter().filter(|(name, _)| !src_attrs.contains_key(*name)) {
            let merged = body.attribute(name).map(|a| a.value_text());
            prop_assert_eq!(merged, Some(value.to_string()));
        }
        let union = dest_attrs.keys().chain(src_attrs.keys()).collect::<std::collections::BTreeSet<_>>();
        prop_assert_eq!(body.attributes().count(), union.len());

        for (ty, name) in TYPES.iter().enumerate() {
            let merged = origins_of_type(&dest, d, name);
            if src_nested.contains(&ty) {
                prop_assert_eq!(merged, expected_origins(&src_nested, ty, "src"));
            } else {
                prop_assert_eq!(merged, expected_origins(&dest_nested, ty, "dest"));
            }
        }

        prop_assert!(Document::parse(dest.to_bytes().as_slice(), "merged.hcl").is_ok());
    }
}
