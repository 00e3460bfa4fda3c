//! Entry points requested by the caller.

use crate::error::{AssetgenError, AssetgenResult};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory, relative to the project root, that shell documents are written to.
pub const ENTRY_DIR: &str = ".entry-cache";

/// Prefix of every generated constant.
const IDENTIFIER_PREFIX: &str = "ASSETS_";

lazy_static! {
    static ref ENTRY_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// One requested unit of frontend functionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    shell_path: PathBuf,
}

impl Entry {
    /// Creates an entry rooted at `root`, validating its name.
    pub fn new(name: &str, root: &Path) -> AssetgenResult<Self> {
        if !ENTRY_NAME_RE.is_match(name) {
            return Err(AssetgenError::InvalidEntryName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            shell_path: root.join(ENTRY_DIR).join(format!("{name}.html")),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the synthesized HTML shell.
    pub fn shell_path(&self) -> &Path {
        &self.shell_path
    }

    /// Path of the shell relative to the project root, as handed to the bundler.
    pub fn relative_shell_path(&self) -> PathBuf {
        Path::new(ENTRY_DIR).join(self.bundle_name())
    }

    /// Name of the compiled bundle the bundler produces for this entry.
    pub fn bundle_name(&self) -> String {
        format!("{}.html", self.name)
    }

    /// Name of the generated constant, e.g. `ASSETS_ADMIN_PANEL` for `admin-panel`.
    pub fn identifier(&self) -> String {
        let mut ident = String::with_capacity(IDENTIFIER_PREFIX.len() + self.name.len());
        ident.push_str(IDENTIFIER_PREFIX);
        for c in self.name.chars() {
            match c {
                '-' => ident.push('_'),
                c => ident.push(c.to_ascii_uppercase()),
            }
        }
        ident
    }
}

/// Builds the ordered entry list, rejecting empty input, invalid names and
/// names that would collide in the generated source.
pub fn entries_from_names<S: AsRef<str>>(names: &[S], root: &Path) -> AssetgenResult<Vec<Entry>> {
    if names.is_empty() {
        return Err(AssetgenError::NoEntries);
    }

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let entry = Entry::new(name.as_ref(), root)?;
        let identifier = entry.identifier();
        if let Some(existing) = seen.get(&identifier) {
            return Err(AssetgenError::DuplicateEntry {
                name: entry.name().to_string(),
                existing: existing.clone(),
                identifier,
            });
        }
        seen.insert(identifier, entry.name().to_string());
        entries.push(entry);
    }
    Ok(entries)
}
