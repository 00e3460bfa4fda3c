//! Maps entries to their compiled bundles.

use crate::bundler::BundleGraph;
use crate::entry::Entry;
use crate::error::{AssetgenError, AssetgenResult};
use std::path::PathBuf;

/// An entry together with the compiled HTML bundle produced for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry<'a> {
    pub entry: &'a Entry,
    pub bundle_path: PathBuf,
}

/// Finds the compiled bundle named `<name>.html` for every entry.
///
/// Fails on the first entry without a bundle; entries are never skipped.
pub fn resolve_bundles<'a>(
    graph: &BundleGraph,
    entries: &'a [Entry],
) -> AssetgenResult<Vec<ResolvedEntry<'a>>> {
    entries
        .iter()
        .map(|entry| {
            let bundle = graph
                .find(&entry.bundle_name())
                .ok_or_else(|| AssetgenError::MissingBundle(entry.name().to_string()))?;
            Ok(ResolvedEntry {
                entry,
                bundle_path: bundle.file_path.clone(),
            })
        })
        .collect()
}
