//! Block-level merge of HCL configuration documents
//!
//! Layers one document (the source) over another (the destination):
//!
//! - top-level blocks are matched by address (`type.label1.label2`);
//! - on a match, source attributes overwrite or extend the destination's,
//!   and each nested block type present in the source replaces that whole
//!   type group in the destination;
//! - unmatched source blocks are appended to the destination.
//!
//! Merging never fails. Only reading, parsing and writing files can, see
//! [`merge_file`].

pub mod address;
pub mod error;
pub mod merge;
pub mod orchestrator;

pub use address::address;
pub use error::{Error, Result};
pub use merge::{MergeReport, merge_attributes, merge_block, merge_documents, merge_nested_blocks};
pub use orchestrator::merge_file;
