//! Bundler integration for assetgen.
//!
//! The bundling engine is a black box. The pipeline drives it through the
//! [`Bundler`] trait, hands it a fixed [`BundleOptions`] contract, and only
//! reads back a flat [`BundleGraph`] of compiled files.
//!
//! # Architecture
//!
//! - `graph`: the bundle graph and its name lookup
//! - `parcel`: drives the Parcel CLI

mod graph;
mod parcel;

use crate::error::{AssetgenError, AssetgenResult};
use std::future::Future;
use std::path::{Path, PathBuf};

pub use graph::{BundleGraph, CompiledBundle};
pub use parcel::ParcelBundler;

/// Directory, relative to the project root, that compiled output goes to.
pub const DIST_DIR: &str = "dist";

/// URL prefix the server mounts the distribution directory under.
pub const PUBLIC_URL: &str = "/assets/";

/// Options for the bundling engine.
///
/// The defaults are the pipeline's fixed contract: a clean, optimized,
/// content-hashed build without source maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Whether the engine may reuse a build cache.
    pub cache: bool,
    /// Whether output filenames embed a content hash.
    pub content_hash: bool,
    /// Whether to minify and optimize output.
    pub optimize: bool,
    /// Whether to enable scope hoisting.
    pub scope_hoist: bool,
    /// Whether to emit source maps.
    pub source_maps: bool,
    /// Output directory, relative to the project root.
    pub dist_dir: PathBuf,
    /// Prefix for URLs in the compiled output. Must match the server's static mount.
    pub public_url: String,
    /// Browserslist query for the compile targets.
    pub browsers: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            cache: false,
            content_hash: true,
            optimize: true,
            scope_hoist: true,
            source_maps: false,
            dist_dir: PathBuf::from(DIST_DIR),
            public_url: PUBLIC_URL.to_string(),
            browsers: "defaults".to_string(),
        }
    }
}

impl BundleOptions {
    /// Rejects options the pipeline cannot work with.
    pub fn validate(&self) -> AssetgenResult<()> {
        if self.public_url.is_empty() {
            return Err(AssetgenError::EmptyPublicUrl);
        }
        Ok(())
    }
}

/// A bundling engine.
///
/// Implementations compile all `shells` in one invocation, run from `root`,
/// and report every compiled file. Any failure must be returned as an error;
/// partially bundled output is never acceptable.
pub trait Bundler {
    fn bundle(
        &self,
        root: &Path,
        shells: &[PathBuf],
        options: &BundleOptions,
    ) -> impl Future<Output = AssetgenResult<BundleGraph>>;
}
