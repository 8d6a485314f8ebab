//! File-level merge: read, parse, merge, serialize, write

use std::io::Write;
use std::path::Path;

use hclmerge_fs::{FileSystem, NormalizedPath};
use hclmerge_syntax::{Document, format};
use tracing::info;

use crate::error::{Error, Result};
use crate::merge::{MergeReport, merge_documents};

/// Merge `file1` into `file2` and store the result at `dest`.
///
/// `file2` is the base: its blocks are kept and `file1`'s blocks are layered
/// on top. The merged document is written in canonical layout (see
/// [`hclmerge_syntax::format`]). An empty `dest` sends the output to `out`
/// instead of the file system.
///
/// Both inputs are read before anything is parsed, so a missing input never
/// leaves a partial result behind.
pub fn merge_file(
    fs: &dyn FileSystem,
    file1: &Path,
    file2: &Path,
    dest: &Path,
    out: &mut dyn Write,
) -> Result<MergeReport> {
    let src_bytes = fs
        .read(&NormalizedPath::new(file1))
        .map_err(|source| Error::ReadSource {
            path: file1.to_path_buf(),
            source,
        })?;
    let dest_bytes = fs
        .read(&NormalizedPath::new(file2))
        .map_err(|source| Error::ReadDestination {
            path: file2.to_path_buf(),
            source,
        })?;

    let src_doc = parse(&src_bytes, file1)?;
    let mut merged = parse(&dest_bytes, file2)?;

    let report = merge_documents(&mut merged, &src_doc);
    info!(
        source = %file1.display(),
        base = %file2.display(),
        merged = report.merged,
        appended = report.appended,
        "merged documents"
    );

    let rendered = format(&merged);
    if dest.as_os_str().is_empty() {
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
    } else {
        fs.write(&NormalizedPath::new(dest), rendered.as_bytes())
            .map_err(|source| Error::Write {
                path: dest.to_path_buf(),
                source,
            })?;
        info!(dest = %dest.display(), bytes = rendered.len(), "wrote merged document");
    }
    Ok(report)
}

fn parse(content: &[u8], path: &Path) -> Result<Document> {
    Document::parse(content, &path.display().to_string()).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
