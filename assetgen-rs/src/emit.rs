//! Generates the Rust source that embeds the extracted markup.

use crate::entry::Entry;
use crate::error::{AssetgenError, AssetgenResult};
use crate::extract::ExtractedAsset;
use itertools::Itertools;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Default name of the generated module.
pub const DEFAULT_MODULE: &str = "static_assets";

/// Default source file the generated file is named after.
pub const DEFAULT_SOURCE_FILE: &str = "assets.rs";

lazy_static! {
    static ref MODULE_NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Where and how the generated source is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Name of the `pub mod` wrapping the generated constants.
    pub module_name: String,
    /// Destination file, relative to the project root unless absolute.
    pub dest_file: PathBuf,
    /// Run `rustfmt` over the written file.
    pub rustfmt: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE.to_string(),
            dest_file: PathBuf::from(dist_file_name(DEFAULT_SOURCE_FILE)),
            rustfmt: false,
        }
    }
}

/// Name of the generated file belonging to `source_file`: `assets.rs` becomes
/// `assets_dist.rs`.
pub fn dist_file_name(source_file: &str) -> String {
    let base = source_file.strip_suffix(".rs").unwrap_or(source_file);
    format!("{base}_dist.rs")
}

/// Checks that `module_name` can be used as the generated module's name.
pub fn validate_module_name(module_name: &str) -> AssetgenResult<()> {
    if MODULE_NAME_RE.is_match(module_name) {
        Ok(())
    } else {
        Err(AssetgenError::InvalidModuleName(module_name.to_string()))
    }
}

/// Wraps `text` in the shortest raw string literal that can hold it.
pub fn raw_string_literal(text: &str) -> String {
    // A run of n hashes after a quote needs a fence of n + 1.
    let mut fence = 0;
    for (i, _) in text.match_indices('"') {
        let run = text[i + 1..].bytes().take_while(|&b| b == b'#').count();
        fence = fence.max(run + 1);
    }
    let hashes = "#".repeat(fence);
    format!("r{hashes}\"{text}\"{hashes}")
}

fn render_declaration(entry: &Entry, asset: &ExtractedAsset) -> String {
    format!(
        r#"    /// Assets for the `{name}` entry point.
    pub const {ident}: Assets = Assets {{
        scripts: {scripts},
        styles: {styles},
    }};
"#,
        name = entry.name(),
        ident = entry.identifier(),
        scripts = raw_string_literal(&asset.scripts),
        styles = raw_string_literal(&asset.styles),
    )
}

/// Renders the generated source, one constant per entry in `entries` order.
pub fn render(
    entries: &[Entry],
    assets: &HashMap<String, ExtractedAsset>,
    module_name: &str,
) -> AssetgenResult<String> {
    validate_module_name(module_name)?;

    let declarations = entries
        .iter()
        .map(|entry| {
            assets
                .get(entry.name())
                .map(|asset| render_declaration(entry, asset))
                .ok_or_else(|| AssetgenError::MissingBundle(entry.name().to_string()))
        })
        .collect::<AssetgenResult<Vec<_>>>()?;

    let mut source = format!(
        r#"// This file was automatically generated by assetgen. Do not edit.
// cspell:disable

#[allow(dead_code)]
pub mod {module_name} {{
    /// Pre-built markup for one bundled entry point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Assets {{
        /// `<script>` tags, in document order.
        pub scripts: &'static str,
        /// `<link>` tags, in document order.
        pub styles: &'static str,
    }}
"#
    );
    if !declarations.is_empty() {
        source.push('\n');
        source.push_str(&declarations.iter().join("\n"));
    }
    source.push_str("}\n");
    Ok(source)
}

/// Writes `source` to `path`, replacing any existing file, and optionally
/// formats it.
pub async fn write_source(path: &Path, source: &str, rustfmt: bool) -> AssetgenResult<()> {
    tokio::fs::write(path, source)
        .await
        .map_err(|source| AssetgenError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;

    if rustfmt {
        let output = Command::new("rustfmt")
            .arg("--edition")
            .arg("2021")
            .arg(path)
            .output()
            .await
            .map_err(|err| AssetgenError::Format {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(AssetgenError::Format {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
    }
    Ok(())
}
